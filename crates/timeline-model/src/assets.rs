//! Read-only resolution of clip sources inside a caller-supplied asset
//! directory.

use std::path::{Component, Path, PathBuf};

use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::timeline::{Clip, ClipSource, Timeline};

/// Image extensions tried, in priority order, after the bare identifier.
pub const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// Resolve one clip to an existing file.
///
/// Order: explicit `image_file`; otherwise the identifier verbatim, then the
/// identifier with each of [`IMAGE_EXTENSIONS`]. An explicit file that does
/// not exist fails immediately instead of falling back to the identifier.
/// References that would leave `asset_dir` are a config error.
pub fn resolve_clip_source(clip: &Clip, asset_dir: &Path) -> StoryreelResult<PathBuf> {
    match &clip.source {
        ClipSource::File(name) => {
            let path = asset_dir.join(relative_reference(name)?);
            if path.is_file() {
                Ok(path)
            } else {
                Err(StoryreelError::missing_asset(name.as_str(), asset_dir))
            }
        }
        ClipSource::Identifier(id) => candidate_paths(relative_reference(id)?, asset_dir)
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| StoryreelError::missing_asset(id.as_str(), asset_dir)),
    }
}

/// Resolve every clip of a timeline, in playback order.
pub fn resolve_clip_sources(timeline: &Timeline, asset_dir: &Path) -> StoryreelResult<Vec<PathBuf>> {
    let sources = timeline
        .clips
        .iter()
        .map(|clip| resolve_clip_source(clip, asset_dir))
        .collect::<StoryreelResult<Vec<_>>>()?;

    tracing::debug!(
        asset_dir = %asset_dir.display(),
        clips = sources.len(),
        "Clip sources resolved"
    );

    Ok(sources)
}

/// Only plain relative paths stay inside the asset directory.
fn relative_reference(reference: &str) -> StoryreelResult<&str> {
    let escapes = Path::new(reference)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(StoryreelError::config(format!(
            "asset reference '{reference}' must be a relative path inside the asset directory"
        )));
    }
    Ok(reference)
}

fn candidate_paths(id: &str, asset_dir: &Path) -> Vec<PathBuf> {
    std::iter::once(asset_dir.join(id))
        .chain(
            IMAGE_EXTENSIONS
                .iter()
                .map(|ext| asset_dir.join(format!("{id}{ext}"))),
        )
        .collect()
}
