//! Show media information.

use std::path::PathBuf;

use storyreel_common::config::AppConfig;
use storyreel_render_engine::probe::{FfprobeProbe, MediaProbe};

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let probe = FfprobeProbe::from_config(&config.engine);
    let info = probe.probe(&path)?;

    let display = info
        .display_dimensions()
        .map(|(w, h)| serde_json::json!({ "width": w, "height": h }));

    let report = serde_json::json!({
        "path": path.display().to_string(),
        "info": info,
        "display": display,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
