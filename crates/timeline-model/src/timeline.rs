//! Validated, ordered timeline.

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::effect::Effect;
use crate::schema::{ImageEntry, TimelineConfig};
use crate::settings::{VideoSettings, DEFAULT_FPS, DEFAULT_RESOLUTION};
use crate::transition::Transition;

pub const DEFAULT_CLIP_SECS: f64 = 5.0;
pub const DEFAULT_ORDER: i64 = 9999;

/// Where a clip's image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ClipSource {
    /// Explicit `image_file` inside the asset directory.
    File(String),
    /// Derived from the clip identifier (verbatim, then with an extension).
    Identifier(String),
}

/// A single still image on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Clip identifier (falls back to the explicit file name).
    pub id: String,

    pub source: ClipSource,

    /// Display length in seconds, always positive.
    pub duration_secs: f64,

    pub effect: Effect,

    /// Join into the following clip. Ignored on the last clip.
    pub transition_to_next: Transition,

    /// Sort key. Ties keep their config order.
    pub order: i64,
}

/// Parsed timeline: output settings plus clips in playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub settings: VideoSettings,
    pub clips: Vec<Clip>,
}

impl Clip {
    fn from_entry(position: usize, entry: &ImageEntry) -> StoryreelResult<Self> {
        let id = entry.id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let image_file = entry
            .image_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let (id, source) = match (id, image_file) {
            (id, Some(file)) => (
                id.unwrap_or(file).to_string(),
                ClipSource::File(file.to_string()),
            ),
            (Some(id), None) => (id.to_string(), ClipSource::Identifier(id.to_string())),
            (None, None) => {
                return Err(StoryreelError::config(format!(
                    "timeline.images[{position}] has neither 'id' nor 'image_file'"
                )));
            }
        };

        let duration_secs = entry.duration_seconds.unwrap_or(DEFAULT_CLIP_SECS);
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(StoryreelError::config(format!(
                "clip '{id}' must have a positive duration_seconds, got {duration_secs}"
            )));
        }

        let effect = Effect::from_raw(entry.effect.as_ref(), duration_secs)?;
        let transition_to_next = Transition::from_raw(entry.transition_to_next.as_ref())
            .map_err(|e| StoryreelError::config(format!("clip '{id}': {e}")))?;

        Ok(Self {
            id,
            source,
            duration_secs,
            effect,
            transition_to_next,
            order: entry.order.unwrap_or(DEFAULT_ORDER),
        })
    }
}

impl Timeline {
    /// Validate a raw config into a timeline.
    ///
    /// Pure: touches no filesystem. Asset lookup is a separate step, see
    /// [`crate::assets::resolve_clip_sources`].
    pub fn parse(config: &TimelineConfig) -> StoryreelResult<Self> {
        let settings = VideoSettings::from_parts(
            config
                .video
                .resolution
                .as_deref()
                .unwrap_or(DEFAULT_RESOLUTION),
            config.video.fps.unwrap_or(DEFAULT_FPS),
        )?;

        let images = config
            .timeline
            .as_ref()
            .and_then(|t| t.images.as_ref())
            .filter(|images| !images.is_empty())
            .ok_or_else(|| StoryreelError::config("no timeline: timeline.images is missing or empty"))?;

        let mut clips = images
            .iter()
            .enumerate()
            .map(|(position, entry)| Clip::from_entry(position, entry))
            .collect::<StoryreelResult<Vec<_>>>()?;

        // Stable: equal orders keep their config position.
        clips.sort_by_key(|clip| clip.order);

        tracing::debug!(
            clips = clips.len(),
            width = settings.width,
            height = settings.height,
            fps = settings.fps,
            "Timeline parsed"
        );

        Ok(Self { settings, clips })
    }

    /// Parse from JSON text.
    pub fn from_json(json: &str) -> StoryreelResult<Self> {
        Self::parse(&TimelineConfig::from_json(json)?)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<std::path::Path>) -> StoryreelResult<Self> {
        Self::parse(&TimelineConfig::load(path)?)
    }

    /// Per-clip durations in playback order.
    pub fn durations(&self) -> Vec<f64> {
        self.clips.iter().map(|clip| clip.duration_secs).collect()
    }

    /// Joins between consecutive clips (one fewer than the clips).
    pub fn transitions(&self) -> Vec<Transition> {
        let joins = self.clips.len().saturating_sub(1);
        self.clips
            .iter()
            .take(joins)
            .map(|clip| clip.transition_to_next.clone())
            .collect()
    }

    /// Expected rendered length: clip durations minus transition overlaps.
    /// The running length is floored at zero after each join.
    pub fn expected_length_secs(&self) -> f64 {
        let mut clips = self.clips.iter();
        let Some(first) = clips.next() else {
            return 0.0;
        };
        self.transitions()
            .iter()
            .zip(clips)
            .fold(first.duration_secs, |len, (transition, clip)| {
                (len + clip.duration_secs - transition.duration_secs).max(0.0)
            })
    }
}
