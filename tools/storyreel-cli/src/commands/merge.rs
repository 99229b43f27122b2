//! Merge narration and background music into a rendered video.

use std::path::PathBuf;

use storyreel_common::config::AppConfig;
use storyreel_render_engine::engine::Engine;
use storyreel_render_engine::merge::{merge_media, plan_merge, probe_inputs, MergePlan};
use storyreel_render_engine::probe::FfprobeProbe;

use crate::AudioArgs;

pub async fn run(
    config: &AppConfig,
    video: PathBuf,
    output: PathBuf,
    audio: AudioArgs,
    dry_run: bool,
) -> anyhow::Result<()> {
    let request = super::merge_request(config, video, &audio);
    request.validate()?;

    let engine = Engine::from_config(&config.engine);
    let probe = FfprobeProbe::from_config(&config.engine);

    println!("Merging: {}", request.video.display());
    println!("  Policy: {:?}", request.policy());

    if dry_run {
        let durations = probe_inputs(&probe, &request)?;
        let plan = plan_merge(&request, &durations, &output)?;
        print_plan(&plan);
        println!("{}", plan.invocation.to_command_line(engine.binary()));
        return Ok(());
    }

    let out = output.clone();
    let plan =
        tokio::task::spawn_blocking(move || merge_media(&engine, &probe, &request, &out)).await??;

    print_plan(&plan);
    println!("Merge complete: {}", output.display());
    Ok(())
}

pub fn print_plan(plan: &MergePlan) {
    match plan.output_duration_secs {
        Some(secs) => println!("  Output length: {secs:.2}s"),
        None => println!("  Output length: unchanged (stream copy)"),
    }
    if let Some(start) = plan.fade_start_secs {
        println!("  Fade out from: {start:.2}s");
    }
    if plan.hold_secs > 0.0 {
        println!("  Last frame held for: {:.2}s", plan.hold_secs);
    }
}
