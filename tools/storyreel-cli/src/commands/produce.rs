//! Render a timeline and merge audio into the final video.

use std::path::PathBuf;

use storyreel_common::config::AppConfig;
use storyreel_render_engine::engine::Engine;
use storyreel_render_engine::merge::merge_media;
use storyreel_render_engine::probe::FfprobeProbe;
use storyreel_render_engine::slideshow::render_slideshow;
use storyreel_timeline_model::timeline::Timeline;

use crate::AudioArgs;

pub async fn run(
    config: &AppConfig,
    timeline_path: PathBuf,
    assets: PathBuf,
    output: PathBuf,
    audio: AudioArgs,
) -> anyhow::Result<()> {
    let timeline = Timeline::load(&timeline_path)?;
    let engine = Engine::from_config(&config.engine);
    let probe = FfprobeProbe::from_config(&config.engine);

    // Removed when `scratch` drops, on success or failure.
    let scratch = tempfile::Builder::new().prefix("storyreel-").tempdir()?;
    let slideshow = scratch.path().join("slideshow.mp4");
    let request = super::merge_request(config, slideshow.clone(), &audio);
    request.validate()?;

    println!("Producing: {}", timeline_path.display());
    println!("  Clips: {}  Policy: {:?}", timeline.clips.len(), request.policy());

    let out = output.clone();
    let plan = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let rendered = render_slideshow(
            &engine,
            &timeline,
            &assets,
            &slideshow,
            Some(super::progress_printer()),
        )?;
        tracing::info!(
            secs = rendered.total_duration_secs,
            scratch = %scratch.path().display(),
            "Slideshow rendered"
        );
        println!();
        let merged = merge_media(&engine, &probe, &request, &out)?;
        drop(scratch);
        Ok(merged)
    })
    .await??;

    super::merge::print_plan(&plan);
    println!("Production complete: {}", output.display());
    Ok(())
}
