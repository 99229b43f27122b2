//! Burning caption files into a rendered video.

use std::path::Path;

use storyreel_captions::style::CaptionStyle;
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::engine::{Engine, EngineInvocation};
use crate::graph::escape_filter_path;
use crate::probe::MediaProbe;

/// Invocation that re-encodes `video` with `captions` burned in, leaving
/// the audio untouched.
pub fn burn_invocation(
    video: &Path,
    captions: &Path,
    style: &CaptionStyle,
    frame_height: u32,
    output: &Path,
) -> StoryreelResult<EngineInvocation> {
    style.validate()?;
    let filter = format!(
        "subtitles={}:force_style='{}'",
        escape_filter_path(&captions.display().to_string()),
        style.force_style(frame_height),
    );

    Ok(EngineInvocation::new(output)
        .input(video, Vec::<String>::new())
        .output_args(["-vf".to_string(), filter, "-c:a".to_string(), "copy".to_string()]))
}

/// Probe the video's displayed height and burn `captions` into it.
pub fn burn_captions(
    engine: &Engine,
    probe: &dyn MediaProbe,
    video: &Path,
    captions: &Path,
    style: &CaptionStyle,
    output: &Path,
) -> StoryreelResult<EngineInvocation> {
    if !video.is_file() {
        let searched = video.parent().map(Path::to_path_buf).unwrap_or_default();
        return Err(StoryreelError::missing_asset(
            video.display().to_string(),
            searched,
        ));
    }
    if !captions.is_file() {
        return Err(StoryreelError::asset(captions, "caption file does not exist"));
    }

    let info = probe.probe(video)?;
    let (_, height) = info
        .display_dimensions()
        .ok_or_else(|| StoryreelError::asset(video, "no video stream"))?;

    let invocation = burn_invocation(video, captions, style, height, output)?;
    tracing::info!(
        video = %video.display(),
        rotation = info.rotation,
        height,
        "Burning captions"
    );
    engine.execute_with_progress(&invocation, info.duration_secs, None)?;
    Ok(invocation)
}
