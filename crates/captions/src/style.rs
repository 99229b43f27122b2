//! Burned-in caption styling (ASS `force_style`).

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

/// Caption look when burned into a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub font_name: String,
    pub font_size: u32,
    /// ASS colour, `&HAABBGGRR`.
    pub primary_colour: String,
    pub outline_colour: String,
    pub outline: u32,
    /// Pixels relative to the vertical centre; negative moves captions down.
    pub vertical_position: i64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 24,
            primary_colour: "&H00FFFFFF".to_string(),
            outline_colour: "&H00000000".to_string(),
            outline: 2,
            vertical_position: 0,
        }
    }
}

impl CaptionStyle {
    /// Bottom margin for a frame `height` pixels tall.
    ///
    /// `trunc(height / 2 + vertical_position)`, clamped into `[0, height]`.
    pub fn margin_v(&self, height: u32) -> u32 {
        let raw = (height as f64 / 2.0 + self.vertical_position as f64).trunc() as i64;
        let clamped = raw.clamp(0, i64::from(height));
        if clamped != raw {
            tracing::warn!(
                raw,
                height,
                vertical_position = self.vertical_position,
                "Caption margin outside the frame, clamping"
            );
        }
        clamped as u32
    }

    /// Reject text fields that would break out of the quoted `force_style`
    /// value or add overrides of their own.
    pub fn validate(&self) -> StoryreelResult<()> {
        for (field, value) in [
            ("font_name", &self.font_name),
            ("primary_colour", &self.primary_colour),
            ("outline_colour", &self.outline_colour),
        ] {
            if value.trim().is_empty() {
                return Err(StoryreelError::config(format!("caption {field} is empty")));
            }
            if let Some(bad) = value
                .chars()
                .find(|&c| matches!(c, '\'' | ',' | ';' | '=' | '\\' | '[' | ']') || c.is_control())
            {
                return Err(StoryreelError::config(format!(
                    "caption {field} '{value}' contains '{}'",
                    bad.escape_default()
                )));
            }
        }
        Ok(())
    }

    /// ASS `force_style` value for a frame `height` pixels tall.
    pub fn force_style(&self, height: u32) -> String {
        format!(
            "FontName={},FontSize={},PrimaryColour={},OutlineColour={},BorderStyle=1,Outline={},Alignment=2,MarginV={}",
            self.font_name,
            self.font_size,
            self.primary_colour,
            self.outline_colour,
            self.outline,
            self.margin_v(height),
        )
    }
}
