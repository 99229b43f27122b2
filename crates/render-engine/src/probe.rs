//! Media probing via ffprobe.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use storyreel_common::config::EngineConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};

/// Probed facts about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Container duration, when the file reports one.
    pub duration_secs: Option<f64>,
    /// Coded width of the first video stream.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Display rotation in degrees, normalised into `[0, 360)`.
    pub rotation: u32,
}

impl MediaInfo {
    /// Dimensions as displayed, after applying rotation.
    pub fn display_dimensions(&self) -> Option<(u32, u32)> {
        let (w, h) = (self.width?, self.height?);
        if self.rotation == 90 || self.rotation == 270 {
            Some((h, w))
        } else {
            Some((w, h))
        }
    }

    /// Duration that must exist and be positive.
    pub fn positive_duration(&self, path: &Path) -> StoryreelResult<f64> {
        match self.duration_secs {
            Some(d) if d.is_finite() && d > 0.0 => Ok(d),
            Some(d) => Err(StoryreelError::asset(
                path,
                format!("non-positive duration {d}"),
            )),
            None => Err(StoryreelError::asset(path, "no duration reported")),
        }
    }
}

/// Source of media facts. Swappable so planning can run without ffprobe.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> StoryreelResult<MediaInfo>;

    /// Probe name.
    fn name(&self) -> &str;
}

/// [`MediaProbe`] backed by the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: PathBuf,
}

impl FfprobeProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ffprobe.clone())
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration:stream=codec_type,width,height:stream_tags=rotate:stream_side_data_list=rotation"
                .to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.display().to_string(),
        ]
    }
}

impl MediaProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> StoryreelResult<MediaInfo> {
        if !path.is_file() {
            return Err(StoryreelError::asset(path, "file does not exist"));
        }

        let output = Command::new(&self.binary)
            .args(Self::args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                StoryreelError::asset(path, format!("failed to run {}: {e}", self.binary.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoryreelError::asset(path, stderr.trim()));
        }

        let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| StoryreelError::asset(path, e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            duration = ?info.duration_secs,
            rotation = info.rotation,
            "Probed media"
        );
        Ok(info)
    }

    fn name(&self) -> &str {
        "ffprobe"
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    tags: ProbeTags,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<serde_json::Value>,
}

/// Parse ffprobe's JSON output.
///
/// Rotation prefers a non-zero `rotate` tag on the first video stream and
/// falls back to its display-matrix side data.
pub fn parse_probe_output(json: &str) -> StoryreelResult<MediaInfo> {
    let probe: ProbeOutput = serde_json::from_str(json)?;

    let duration_secs = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok());

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    let rotation = video.map(stream_rotation).unwrap_or(0);

    Ok(MediaInfo {
        duration_secs,
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        rotation,
    })
}

fn stream_rotation(stream: &ProbeStream) -> u32 {
    let from_tag = stream
        .tags
        .rotate
        .as_deref()
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|degrees| *degrees != 0.0);

    let from_side_data = || {
        stream
            .side_data_list
            .iter()
            .filter_map(|sd| sd.rotation.as_ref())
            .find_map(|value| match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
    };

    from_tag
        .or_else(from_side_data)
        .map(normalize_rotation)
        .unwrap_or(0)
}

/// Normalise degrees into `[0, 360)`.
pub fn normalize_rotation(degrees: f64) -> u32 {
    (degrees.round() as i64).rem_euclid(360) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_landscape_without_rotation() {
        let info = parse_probe_output(
            r#"{
                "streams": [{"codec_type": "video", "width": 1920, "height": 1080}],
                "format": {"duration": "12.500000"}
            }"#,
        )
        .unwrap();
        assert_eq!(info.duration_secs, Some(12.5));
        assert_eq!(info.rotation, 0);
        assert_eq!(info.display_dimensions(), Some((1920, 1080)));
    }

    #[test]
    fn test_rotate_tag_swaps_display_dimensions() {
        let info = parse_probe_output(
            r#"{
                "streams": [
                    {"codec_type": "audio"},
                    {"codec_type": "video", "width": 1920, "height": 1080, "tags": {"rotate": "90"}}
                ],
                "format": {"duration": "3.0"}
            }"#,
        )
        .unwrap();
        assert_eq!(info.rotation, 90);
        assert_eq!(info.display_dimensions(), Some((1080, 1920)));
    }

    #[test]
    fn test_side_data_rotation_is_normalised() {
        let info = parse_probe_output(
            r#"{
                "streams": [{
                    "codec_type": "video", "width": 1280, "height": 720,
                    "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]
                }],
                "format": {}
            }"#,
        )
        .unwrap();
        assert_eq!(info.rotation, 270);
        assert_eq!(info.duration_secs, None);
        assert_eq!(info.display_dimensions(), Some((720, 1280)));
    }

    #[test]
    fn test_audio_only_file() {
        let info = parse_probe_output(
            r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "4.2"}}"#,
        )
        .unwrap();
        assert_eq!(info.duration_secs, Some(4.2));
        assert_eq!(info.display_dimensions(), None);
    }

    #[test]
    fn test_positive_duration() {
        let path = Path::new("narration.mp3");
        let mut info = MediaInfo {
            duration_secs: Some(3.0),
            width: None,
            height: None,
            rotation: 0,
        };
        assert_eq!(info.positive_duration(path).unwrap(), 3.0);

        info.duration_secs = Some(0.0);
        assert!(matches!(
            info.positive_duration(path),
            Err(StoryreelError::Asset { .. })
        ));
        info.duration_secs = None;
        assert!(info.positive_duration(path).is_err());
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(-90.0), 270);
        assert_eq!(normalize_rotation(450.0), 90);
        assert_eq!(normalize_rotation(180.0), 180);
        assert_eq!(normalize_rotation(-360.0), 0);
    }

    #[test]
    fn test_garbage_output_is_error() {
        assert!(parse_probe_output("not json").is_err());
    }

    #[test]
    fn test_probe_missing_file_is_asset_error() {
        let probe = FfprobeProbe::new("ffprobe");
        let err = probe.probe(Path::new("/nonexistent/narration.mp3")).unwrap_err();
        assert!(matches!(err, StoryreelError::Asset { .. }));
    }
}
