//! Word-timed transcripts and grouping into caption cues.
//!
//! The transcript comes from an external speech-to-text step; this module
//! only consumes its word timings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

pub const DEFAULT_WORDS_PER_LINE: usize = 3;

/// A single recognised word with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,

    /// Start time in seconds.
    pub start: f64,

    /// End time in seconds.
    pub end: f64,
}

/// Full transcription result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    /// Detected language (ISO 639-1).
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub words: Vec<WordTiming>,
}

impl Transcript {
    pub fn from_json(json: &str) -> StoryreelResult<Self> {
        let transcript: Self = serde_json::from_str(json)
            .map_err(|e| StoryreelError::config(format!("invalid transcript: {e}")))?;
        transcript.validate()?;
        Ok(transcript)
    }

    pub fn load(path: &Path) -> StoryreelResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoryreelError::asset(path, e.to_string()))?;
        Self::from_json(&json)
    }

    /// Every word must have finite, ordered timings.
    pub fn validate(&self) -> StoryreelResult<()> {
        for (i, word) in self.words.iter().enumerate() {
            if !word.start.is_finite() || !word.end.is_finite() || word.end < word.start {
                return Err(StoryreelError::config(format!(
                    "word {i} ('{}') has invalid timing {}..{}",
                    word.word, word.start, word.end
                )));
            }
        }
        Ok(())
    }

    /// Time of the last word's end.
    pub fn duration_secs(&self) -> f64 {
        self.words.iter().map(|w| w.end).fold(0.0, f64::max)
    }
}

/// One caption cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Group consecutive words into cues of at most `words_per_line` words.
///
/// Words that are empty after trimming are skipped. A `words_per_line` of
/// zero is treated as one.
pub fn group_words(words: &[WordTiming], words_per_line: usize) -> Vec<CaptionCue> {
    let per_line = words_per_line.max(1);
    let kept: Vec<&WordTiming> = words
        .iter()
        .filter(|w| !w.word.trim().is_empty())
        .collect();

    kept.chunks(per_line)
        .filter_map(|chunk| {
            let (first, last) = (chunk.first()?, chunk.last()?);
            Some(CaptionCue {
                start_secs: first.start,
                end_secs: last.end,
                text: chunk
                    .iter()
                    .map(|w| w.word.trim())
                    .collect::<Vec<_>>()
                    .join(" "),
            })
        })
        .collect()
}
