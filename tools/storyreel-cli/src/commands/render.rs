//! Render a timeline to a slideshow video.

use std::path::PathBuf;

use storyreel_common::config::AppConfig;
use storyreel_render_engine::engine::Engine;
use storyreel_render_engine::slideshow::{compile_slideshow, render_slideshow};
use storyreel_timeline_model::assets::resolve_clip_sources;
use storyreel_timeline_model::timeline::Timeline;

pub async fn run(
    config: &AppConfig,
    timeline_path: PathBuf,
    assets: PathBuf,
    output: PathBuf,
    dry_run: bool,
) -> anyhow::Result<()> {
    let timeline = Timeline::load(&timeline_path)?;
    let engine = Engine::from_config(&config.engine);

    println!("Rendering timeline: {}", timeline_path.display());
    println!(
        "  Clips: {}  Resolution: {}  FPS: {}",
        timeline.clips.len(),
        timeline.settings.resolution(),
        timeline.settings.fps
    );
    println!("  Expected length: {:.2}s", timeline.expected_length_secs());

    if dry_run {
        let sources = resolve_clip_sources(&timeline, &assets)?;
        let plan = compile_slideshow(&timeline, &sources, &output)?;
        println!("{}", plan.invocation.to_command_line(engine.binary()));
        return Ok(());
    }

    let out = output.clone();
    let plan = tokio::task::spawn_blocking(move || {
        render_slideshow(
            &engine,
            &timeline,
            &assets,
            &out,
            Some(super::progress_printer()),
        )
    })
    .await??;

    println!(
        "\nRender complete: {} ({:.2}s)",
        output.display(),
        plan.total_duration_secs
    );
    Ok(())
}
