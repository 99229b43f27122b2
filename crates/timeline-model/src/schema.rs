//! Raw declarative config as it arrives on the wire.
//!
//! These types mirror the JSON one-to-one and carry no validation. The
//! [`crate::timeline`] module turns them into typed clips.

use std::path::Path;

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

/// Top-level config document (`{video, timeline}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default)]
    pub video: VideoSection,

    #[serde(default)]
    pub timeline: Option<TimelineSection>,
}

/// `video` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoSection {
    /// `"WxH"`.
    #[serde(default)]
    pub resolution: Option<String>,

    #[serde(default)]
    pub fps: Option<i64>,
}

/// `timeline` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineSection {
    #[serde(default)]
    pub images: Option<Vec<ImageEntry>>,
}

/// One entry of `timeline.images`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageEntry {
    #[serde(default)]
    pub id: Option<String>,

    /// Explicit file name inside the asset directory.
    #[serde(default)]
    pub image_file: Option<String>,

    #[serde(default)]
    pub order: Option<i64>,

    #[serde(default)]
    pub duration_seconds: Option<f64>,

    #[serde(default)]
    pub effect: Option<RawEffect>,

    #[serde(default)]
    pub transition_to_next: Option<RawTransition>,
}

/// Effect block. Only the parameters relevant to `type` are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEffect {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub zoom_start: Option<f64>,
    #[serde(default)]
    pub zoom_end: Option<f64>,
    #[serde(default)]
    pub zoom_step: Option<f64>,

    #[serde(default)]
    pub fade_in: Option<RawFadeWindow>,
    #[serde(default)]
    pub fade_out: Option<RawFadeWindow>,

    #[serde(default)]
    pub direction: Option<String>,

    /// Oversampled height for vertical slides.
    #[serde(default)]
    pub source_scale_height: Option<u32>,
}

/// `fade_in` / `fade_out` window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFadeWindow {
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// `transition_to_next` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransition {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Engine transition algorithm name.
    #[serde(default)]
    pub transition: Option<String>,

    #[serde(default)]
    pub duration: Option<f64>,
}

impl TimelineConfig {
    /// Parse a config document from JSON text.
    pub fn from_json(json: &str) -> StoryreelResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StoryreelError::config(format!("malformed timeline config: {e}")))
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> StoryreelResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            StoryreelError::config(format!("failed to read config {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let config = TimelineConfig::from_json(
            r#"{"timeline": {"images": [{"id": "img01", "duration_seconds": 3}]}}"#,
        )
        .unwrap();
        assert!(config.video.resolution.is_none());
        let images = config.timeline.unwrap().images.unwrap();
        assert_eq!(images[0].id.as_deref(), Some("img01"));
        assert_eq!(images[0].duration_seconds, Some(3.0));
    }

    #[test]
    fn test_null_effect_and_transition_are_accepted() {
        let config = TimelineConfig::from_json(
            r#"{"timeline": {"images": [{"id": "a", "effect": null, "transition_to_next": null}]}}"#,
        )
        .unwrap();
        let image = &config.timeline.unwrap().images.unwrap()[0];
        assert!(image.effect.is_none());
        assert!(image.transition_to_next.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config = TimelineConfig::from_json(
            r#"{"video": {"fps": 24, "codec": "h264"},
                "timeline": {"images": [{"id": "a", "effect": {"type": "spin", "speed": 3}}]}}"#,
        )
        .unwrap();
        assert_eq!(config.video.fps, Some(24));
        let effect = config.timeline.unwrap().images.unwrap()[0]
            .effect
            .clone()
            .unwrap();
        assert_eq!(effect.kind.as_deref(), Some("spin"));
    }

    #[test]
    fn test_wrong_types_are_config_errors() {
        let err = TimelineConfig::from_json(r#"{"video": {"fps": "fast"}}"#).unwrap_err();
        assert!(err.is_config());
    }
}
