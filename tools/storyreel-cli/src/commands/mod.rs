pub mod captions;
pub mod check;
pub mod merge;
pub mod probe;
pub mod produce;
pub mod render;
pub mod validate;

use storyreel_common::config::AppConfig;
use storyreel_render_engine::merge::MergeRequest;

use crate::AudioArgs;

/// Merge request from CLI flags, falling back to configured defaults.
pub fn merge_request(config: &AppConfig, video: std::path::PathBuf, audio: &AudioArgs) -> MergeRequest {
    let mut request = MergeRequest::with_defaults(video, &config.merge);
    request.narration = audio.narration.clone();
    request.background = audio.background.clone();
    if let Some(volume) = audio.narration_volume {
        request.narration_volume = volume;
    }
    if let Some(volume) = audio.background_volume {
        request.background_volume = volume;
    }
    if let Some(fade) = audio.fade {
        request.fade_duration_secs = fade;
    }
    request
}

/// Progress line printer for engine runs.
pub fn progress_printer() -> storyreel_render_engine::engine::ProgressCallback {
    Box::new(|p| {
        print!(
            "\r  Progress: {:.1}% ({:.1}s, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.out_time_secs,
            p.eta_secs,
        );
    })
}
