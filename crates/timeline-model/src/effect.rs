//! Per-clip visual effects.

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::schema::{RawEffect, RawFadeWindow};

pub const DEFAULT_ZOOM_START: f64 = 1.0;
pub const DEFAULT_ZOOM_END: f64 = 1.15;
pub const DEFAULT_ZOOM_STEP: f64 = 0.0015;
pub const DEFAULT_FADE_SECS: f64 = 0.5;

/// Visual treatment applied to a single clip.
///
/// Any tag outside the known set becomes [`Effect::Unrecognized`], which
/// compiles exactly like [`Effect::None`] (cover-scale and center-crop, no
/// motion). Unknown tags are never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    None,
    Zoom(ZoomEffect),
    Fade(FadeEffect),
    SlideHorizontal { direction: HorizontalSlide },
    SlideVertical(VerticalSlideEffect),
    Unrecognized { tag: String },
}

/// Linear scale ramp anchored at the image center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomEffect {
    pub start_scale: f64,
    pub end_scale: f64,
    /// Scale increment per output frame.
    pub step: f64,
}

/// Independent fade-in and fade-out windows. Overlapping windows are passed
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeEffect {
    pub fade_in: FadeWindow,
    pub fade_out: FadeWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeWindow {
    pub start_secs: f64,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalSlide {
    LeftToCenter,
    RightToCenter,
    RightToLeft,
    LeftToRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalSlide {
    BottomToTop,
    TopToBottom,
    BottomToCenter,
    TopToCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalSlideEffect {
    pub direction: VerticalSlide,
    /// Height the source is oversampled to before cropping. `None` means
    /// 1.25x the target height.
    pub source_height: Option<u32>,
}

impl HorizontalSlide {
    /// Direction used when the config does not name one.
    pub const DEFAULT: Self = Self::LeftToCenter;

    /// Map a config tag. Unknown tags slide left to right.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            None => Self::DEFAULT,
            Some("left_to_center") => Self::LeftToCenter,
            Some("right_to_center") => Self::RightToCenter,
            Some("right_to_left") => Self::RightToLeft,
            Some("left_to_right") => Self::LeftToRight,
            Some(other) => {
                tracing::warn!(direction = other, "Unknown horizontal slide direction");
                Self::LeftToRight
            }
        }
    }
}

impl VerticalSlide {
    pub const DEFAULT: Self = Self::BottomToTop;

    /// Map a config tag. Unknown tags use [`VerticalSlide::DEFAULT`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            None => Self::DEFAULT,
            Some("bottom_to_top") => Self::BottomToTop,
            Some("top_to_bottom") => Self::TopToBottom,
            Some("bottom_to_center") => Self::BottomToCenter,
            Some("top_to_center") => Self::TopToCenter,
            Some(other) => {
                tracing::warn!(direction = other, "Unknown vertical slide direction");
                Self::DEFAULT
            }
        }
    }
}

impl Default for ZoomEffect {
    fn default() -> Self {
        Self {
            start_scale: DEFAULT_ZOOM_START,
            end_scale: DEFAULT_ZOOM_END,
            step: DEFAULT_ZOOM_STEP,
        }
    }
}

impl FadeEffect {
    /// Default windows for a clip: fade in over the first half second, fade
    /// out over the last half second.
    pub fn for_duration(clip_secs: f64) -> Self {
        Self {
            fade_in: FadeWindow {
                start_secs: 0.0,
                duration_secs: DEFAULT_FADE_SECS,
            },
            fade_out: FadeWindow {
                start_secs: (clip_secs - DEFAULT_FADE_SECS).max(0.0),
                duration_secs: DEFAULT_FADE_SECS,
            },
        }
    }
}

impl Effect {
    /// Build the effect for a clip of `clip_secs` from its raw config block.
    pub fn from_raw(raw: Option<&RawEffect>, clip_secs: f64) -> StoryreelResult<Self> {
        let Some(raw) = raw else {
            return Ok(Self::None);
        };

        let effect = match raw.kind.as_deref().unwrap_or("none") {
            "none" => Self::None,
            "zoom" | "zoom_slow" => {
                let defaults = ZoomEffect::default();
                Self::Zoom(ZoomEffect {
                    start_scale: finite("zoom_start", raw.zoom_start, defaults.start_scale)?,
                    end_scale: finite("zoom_end", raw.zoom_end, defaults.end_scale)?,
                    step: finite("zoom_step", raw.zoom_step, defaults.step)?,
                })
            }
            "fade" => {
                let defaults = FadeEffect::for_duration(clip_secs);
                Self::Fade(FadeEffect {
                    fade_in: fade_window("fade_in", raw.fade_in.as_ref(), defaults.fade_in)?,
                    fade_out: fade_window("fade_out", raw.fade_out.as_ref(), defaults.fade_out)?,
                })
            }
            "slide_horizontal" => Self::SlideHorizontal {
                direction: HorizontalSlide::from_tag(raw.direction.as_deref()),
            },
            "slide_vertical" => Self::SlideVertical(VerticalSlideEffect {
                direction: VerticalSlide::from_tag(raw.direction.as_deref()),
                source_height: raw.source_scale_height,
            }),
            other => {
                tracing::warn!(effect = other, "Unknown effect type, using base transform");
                Self::Unrecognized {
                    tag: other.to_string(),
                }
            }
        };

        Ok(effect)
    }

    /// Short name used in logs and summaries.
    pub fn name(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Zoom(_) => "zoom",
            Self::Fade(_) => "fade",
            Self::SlideHorizontal { .. } => "slide_horizontal",
            Self::SlideVertical(_) => "slide_vertical",
            Self::Unrecognized { tag } => tag.as_str(),
        }
    }
}

fn finite(field: &str, value: Option<f64>, default: f64) -> StoryreelResult<f64> {
    let value = value.unwrap_or(default);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StoryreelError::config(format!("{field} must be a finite number")))
    }
}

fn fade_window(
    field: &str,
    raw: Option<&RawFadeWindow>,
    default: FadeWindow,
) -> StoryreelResult<FadeWindow> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    Ok(FadeWindow {
        start_secs: finite(field, raw.start_time, default.start_secs)?,
        duration_secs: finite(field, raw.duration, default.duration_secs)?,
    })
}
