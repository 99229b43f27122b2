//! Output video settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

pub const DEFAULT_RESOLUTION: &str = "1080x1920";
pub const DEFAULT_FPS: i64 = 30;

/// Target frame geometry and rate. Always positive once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Output resolution parsed from a `"WxH"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Resolution {
    type Err = StoryreelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            StoryreelError::config(format!(
                "invalid resolution: {raw} (expected e.g. '{DEFAULT_RESOLUTION}')"
            ))
        };

        let lowered = raw.trim().to_ascii_lowercase();
        let (w, h) = lowered.split_once('x').ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl VideoSettings {
    /// Build settings from the raw `video` section values.
    pub fn from_parts(resolution: &str, fps: i64) -> StoryreelResult<Self> {
        let Resolution { width, height } = resolution.parse()?;
        let fps = u32::try_from(fps)
            .ok()
            .filter(|fps| *fps > 0)
            .ok_or_else(|| StoryreelError::config(format!("invalid fps: {fps}")))?;

        Ok(Self { width, height, fps })
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: DEFAULT_FPS as u32,
        }
    }
}
