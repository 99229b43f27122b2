//! Joins between consecutive clips.

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::schema::RawTransition;

pub const DEFAULT_TRANSITION_STYLE: &str = "fade";
pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Blend the tail of the outgoing clip into the head of the next.
    Crossfade,
    /// Hard cut, emitted as a zero-length crossfade.
    Cut,
}

/// A join between clip `i` and clip `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,

    /// Engine transition algorithm (free-form, e.g. "fade", "wipeleft").
    pub style: String,

    /// Overlap length in seconds. Always 0 for [`TransitionKind::Cut`].
    pub duration_secs: f64,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Crossfade,
            style: DEFAULT_TRANSITION_STYLE.to_string(),
            duration_secs: DEFAULT_TRANSITION_SECS,
        }
    }
}

/// Engine transition names are plain identifiers (`fade`, `slideleft`,
/// `hl_slice`); anything else would splice syntax into the filter graph.
pub fn is_valid_style(style: &str) -> bool {
    !style.is_empty() && style.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Transition {
    pub fn cut() -> Self {
        Self {
            kind: TransitionKind::Cut,
            style: DEFAULT_TRANSITION_STYLE.to_string(),
            duration_secs: 0.0,
        }
    }

    pub fn crossfade(style: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            kind: TransitionKind::Crossfade,
            style: style.into(),
            duration_secs,
        }
    }

    /// Build a transition from its raw config block. A missing block is a
    /// default half-second crossfade.
    pub fn from_raw(raw: Option<&RawTransition>) -> StoryreelResult<Self> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };

        match raw.kind.as_deref().unwrap_or("xfade") {
            "none" => return Ok(Self::cut()),
            "xfade" => {}
            other => {
                tracing::warn!(transition_type = other, "Unknown transition type, using xfade");
            }
        }

        let duration_secs = raw.duration.unwrap_or(DEFAULT_TRANSITION_SECS);
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(StoryreelError::config(format!(
                "transition duration must be a non-negative number, got {duration_secs}"
            )));
        }

        let style = raw
            .transition
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TRANSITION_STYLE);
        if !is_valid_style(style) {
            return Err(StoryreelError::config(format!(
                "transition '{style}' is not a valid engine transition name"
            )));
        }

        Ok(Self::crossfade(style, duration_secs))
    }
}
