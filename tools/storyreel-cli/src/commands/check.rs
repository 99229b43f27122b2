//! Check engine availability and integration settings.

use storyreel_common::config::{config_file_path, AppConfig};
use storyreel_render_engine::engine::Engine;
use storyreel_render_engine::probe::FfprobeProbe;

pub fn run(config: &AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("Storyreel System Check");
    println!("{}", "=".repeat(50));

    let engine = Engine::from_config(&config.engine);
    let engine_ok = engine.is_available();
    if engine_ok {
        println!("[OK] Engine: {}", engine.binary().display());
    } else {
        println!(
            "[FAIL] Engine not found: {} (set STORYREEL_FFMPEG)",
            engine.binary().display()
        );
    }

    let probe_ok = FfprobeProbe::from_config(&config.engine).is_available();
    if probe_ok {
        println!("[OK] Probe: {}", config.engine.ffprobe.display());
    } else {
        println!(
            "[FAIL] Probe not found: {} (set STORYREEL_FFPROBE)",
            config.engine.ffprobe.display()
        );
    }

    // Never print the token itself.
    let integrations = &config.integrations;
    if integrations.music_configured() {
        println!("[OK] Music API token: configured");
    } else {
        println!("[WARN] Music API token: not set (MUSIC_API_TOKEN)");
    }
    println!("     Music model: {}", integrations.music_model_version);
    println!("     Transcription model: {}", integrations.transcription_model);

    println!();
    println!(
        "Merge defaults: narration {} / background {} / fade {}s",
        config.merge.narration_volume,
        config.merge.background_volume,
        config.merge.fade_duration_secs
    );

    let path = config_file_path();
    if write_config {
        config.save()?;
        println!("Config written to {}", path.display());
    } else {
        println!("Config file: {}", path.display());
    }

    println!();
    if engine_ok && probe_ok {
        println!("All required tools are available. Storyreel is ready.");
    } else {
        println!("Some required tools are missing. See above for fixes.");
    }

    Ok(())
}
