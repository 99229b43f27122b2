//! Caption files in SRT and VTT formats.

use std::path::Path;

use storyreel_common::error::StoryreelResult;

use crate::transcript::CaptionCue;

/// Caption file format, picked from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    Srt,
    Vtt,
}

impl CaptionFormat {
    /// `.vtt` selects WebVTT; anything else is SRT.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("vtt") => Self::Vtt,
            _ => Self::Srt,
        }
    }
}

/// Generate SRT content from cues.
pub fn generate_srt(cues: &[CaptionCue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT content from cues.
pub fn generate_vtt(cues: &[CaptionCue]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for cue in cues {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(cue.start_secs),
            format_vtt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

fn split_millis(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// HH:MM:SS,mmm
fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// HH:MM:SS.mmm
fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Write cues to `path` in the format implied by its extension.
pub fn save_captions(cues: &[CaptionCue], path: &Path) -> StoryreelResult<CaptionFormat> {
    let format = CaptionFormat::from_path(path);
    let content = match format {
        CaptionFormat::Vtt => generate_vtt(cues),
        CaptionFormat::Srt => generate_srt(cues),
    };
    std::fs::write(path, content)?;
    tracing::debug!(path = %path.display(), cues = cues.len(), ?format, "Captions written");
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start_secs: f64, end_secs: f64, text: &str) -> CaptionCue {
        CaptionCue {
            start_secs,
            end_secs,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_srt_generation() {
        let cues = vec![cue(0.0, 2.5, "Hello world"), cue(3.0, 5.0, "This is a test")];

        let srt = generate_srt(&cues);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:05,000\nThis is a test"));
    }

    #[test]
    fn test_vtt_generation() {
        let vtt = generate_vtt(&[cue(61.5, 63.0, "One minute in")]);
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:01:01.500 --> 00:01:03.000"));
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3661.5), "01:01:01,500");
        assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
        // float noise must not drop a millisecond
        assert_eq!(format_srt_time(0.29), "00:00:00,290");
    }

    #[test]
    fn test_save_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cues = [cue(0.0, 1.0, "hi")];

        let vtt = dir.path().join("captions.VTT");
        assert_eq!(save_captions(&cues, &vtt).unwrap(), CaptionFormat::Vtt);
        assert!(std::fs::read_to_string(&vtt).unwrap().starts_with("WEBVTT"));

        let srt = dir.path().join("captions.txt");
        assert_eq!(save_captions(&cues, &srt).unwrap(), CaptionFormat::Srt);
        assert!(std::fs::read_to_string(&srt).unwrap().starts_with("1\n"));
    }
}
