//! Storyreel Captions
//!
//! Turns word-timed transcripts into captions:
//! - **Transcript:** Word timings from an external speech-to-text step
//! - **Subtitles:** Cue grouping and SRT/VTT output
//! - **Style:** ASS styling for burning captions into video

pub mod style;
pub mod subtitles;
pub mod transcript;

pub use style::*;
pub use subtitles::*;
pub use transcript::*;
