//! Audio/video merge planner.
//!
//! Selects one of three duration policies from which audio inputs are
//! present, then builds the mix/fade graph and the final invocation.
//! Planning is pure over probed durations; [`merge_media`] does the probing
//! and runs the engine.

use std::path::{Path, PathBuf};

use serde::Serialize;
use storyreel_common::config::MergeDefaults;
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::effects::PIXEL_FORMAT;
use crate::engine::{Engine, EngineInvocation};
use crate::graph::{format_number, CompiledGraph, FilterNode};
use crate::probe::MediaProbe;

pub const VIDEO_CODEC: &str = "libx264";
pub const AUDIO_CODEC: &str = "aac";

/// What to merge, with linear volume gains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeRequest {
    pub video: PathBuf,
    pub narration: Option<PathBuf>,
    pub background: Option<PathBuf>,
    pub narration_volume: f64,
    pub background_volume: f64,
    pub fade_duration_secs: f64,
}

impl MergeRequest {
    /// Request with the built-in defaults and no audio.
    pub fn new(video: impl Into<PathBuf>) -> Self {
        Self::with_defaults(video, &MergeDefaults::default())
    }

    pub fn with_defaults(video: impl Into<PathBuf>, defaults: &MergeDefaults) -> Self {
        Self {
            video: video.into(),
            narration: None,
            background: None,
            narration_volume: defaults.narration_volume,
            background_volume: defaults.background_volume,
            fade_duration_secs: defaults.fade_duration_secs,
        }
    }

    pub fn narration(mut self, path: impl Into<PathBuf>) -> Self {
        self.narration = Some(path.into());
        self
    }

    pub fn background(mut self, path: impl Into<PathBuf>) -> Self {
        self.background = Some(path.into());
        self
    }

    /// Reject gains and fades the engine cannot honour.
    pub fn validate(&self) -> StoryreelResult<()> {
        for (name, value) in [
            ("narration volume", self.narration_volume),
            ("background volume", self.background_volume),
            ("fade duration", self.fade_duration_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StoryreelError::config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn policy(&self) -> MergePolicy {
        match (&self.narration, &self.background) {
            (None, None) => MergePolicy::Passthrough,
            (Some(_), background) => MergePolicy::NarrationLed {
                with_background: background.is_some(),
            },
            (None, Some(_)) => MergePolicy::BackgroundOnly,
        }
    }
}

/// Output-duration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Stream copy of the video, no audio graph.
    Passthrough,
    /// Output length follows the narration plus the fade tail.
    NarrationLed { with_background: bool },
    /// Output length follows the video; background loops underneath.
    BackgroundOnly,
}

/// Probed input durations, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MediaDurations {
    pub video_secs: Option<f64>,
    pub narration_secs: Option<f64>,
}

/// A fully planned merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergePlan {
    pub policy: MergePolicy,
    pub graph: Option<CompiledGraph>,
    pub invocation: EngineInvocation,
    /// Enforced output length; `None` for passthrough.
    pub output_duration_secs: Option<f64>,
    pub fade_start_secs: Option<f64>,
    /// Seconds of frozen last frame appended to the video.
    pub hold_secs: f64,
}

/// Plan a merge from already-probed durations.
pub fn plan_merge(
    request: &MergeRequest,
    durations: &MediaDurations,
    output: &Path,
) -> StoryreelResult<MergePlan> {
    request.validate()?;

    let policy = request.policy();
    let plan = match policy {
        MergePolicy::Passthrough => MergePlan {
            policy,
            graph: None,
            invocation: EngineInvocation::new(output)
                .input(&request.video, Vec::<String>::new())
                .output_args(["-c", "copy"]),
            output_duration_secs: None,
            fade_start_secs: None,
            hold_secs: 0.0,
        },
        MergePolicy::NarrationLed { with_background } => {
            let narration_secs = required(durations.narration_secs, request.narration.as_deref())?;
            let video_secs = required(durations.video_secs, Some(request.video.as_path()))?;
            plan_narration_led(request, narration_secs, video_secs, with_background, output)
        }
        MergePolicy::BackgroundOnly => {
            let video_secs = required(durations.video_secs, Some(request.video.as_path()))?;
            plan_background_only(request, video_secs, output)
        }
    };

    tracing::debug!(
        policy = ?plan.policy,
        output_secs = ?plan.output_duration_secs,
        fade_start = ?plan.fade_start_secs,
        hold_secs = plan.hold_secs,
        "Merge planned"
    );
    Ok(plan)
}

fn required(duration: Option<f64>, path: Option<&Path>) -> StoryreelResult<f64> {
    let path = path.unwrap_or_else(|| Path::new("<unknown>"));
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => Ok(d),
        Some(d) => Err(StoryreelError::asset(path, format!("non-positive duration {d}"))),
        None => Err(StoryreelError::asset(path, "duration was not probed")),
    }
}

fn plan_narration_led(
    request: &MergeRequest,
    narration_secs: f64,
    video_secs: f64,
    with_background: bool,
    output: &Path,
) -> MergePlan {
    let fade = request.fade_duration_secs;
    let total = narration_secs + fade;
    let hold = (total - video_secs).max(0.0);
    let fade_out = format!(
        "t=out:st={}:d={}",
        format_number(narration_secs),
        format_number(fade)
    );

    let mut graph = CompiledGraph::new();

    let mut video_filters = String::new();
    if hold > 0.0 {
        video_filters.push_str(&format!(
            "tpad=stop_mode=clone:stop_duration={},",
            format_number(hold)
        ));
    }
    video_filters.push_str(&format!("fade={fade_out}"));
    let vout = graph.push(FilterNode::new(["0:v"], video_filters, "vout"));

    let narration_volume = format!("volume={}", format_number(request.narration_volume));
    let aout = if with_background {
        let narr = graph.push(FilterNode::new(["1:a"], narration_volume, "narr"));
        let bg = graph.push(FilterNode::new(
            ["2:a"],
            format!("volume={}", format_number(request.background_volume)),
            "bg",
        ));
        graph.push(FilterNode::new(
            [narr, bg],
            format!("amix=inputs=2:duration=longest:dropout_transition=0,afade={fade_out}"),
            "aout",
        ))
    } else {
        graph.push(FilterNode::new(
            ["1:a"],
            format!("{narration_volume},afade={fade_out}"),
            "aout",
        ))
    };
    graph.add_output(vout);
    graph.add_output(aout);

    let mut invocation = EngineInvocation::new(output)
        .input(&request.video, Vec::<String>::new())
        .input(
            request.narration.as_deref().unwrap_or(Path::new("")),
            Vec::<String>::new(),
        );
    if let Some(background) = &request.background {
        invocation = invocation.input(background, ["-stream_loop", "-1"]);
    }

    MergePlan {
        policy: MergePolicy::NarrationLed { with_background },
        invocation: invocation
            .graph(&graph)
            .output_args(encode_args(total)),
        graph: Some(graph),
        output_duration_secs: Some(total),
        fade_start_secs: Some(narration_secs),
        hold_secs: hold,
    }
}

fn plan_background_only(request: &MergeRequest, video_secs: f64, output: &Path) -> MergePlan {
    let total = video_secs;
    let start = (video_secs - request.fade_duration_secs).max(0.0);
    let window = format!(
        "t=out:st={}:d={}",
        format_number(start),
        format_number(total - start)
    );

    let mut graph = CompiledGraph::new();
    let vout = graph.push(FilterNode::new(["0:v"], format!("fade={window}"), "vout"));
    let aout = graph.push(FilterNode::new(
        ["1:a"],
        format!(
            "volume={},afade={window}",
            format_number(request.background_volume)
        ),
        "aout",
    ));
    graph.add_output(vout);
    graph.add_output(aout);

    let background = request.background.as_deref().unwrap_or(Path::new(""));
    let invocation = EngineInvocation::new(output)
        .input(&request.video, Vec::<String>::new())
        .input(background, ["-stream_loop", "-1"])
        .graph(&graph)
        .output_args(encode_args(total));

    MergePlan {
        policy: MergePolicy::BackgroundOnly,
        graph: Some(graph),
        invocation,
        output_duration_secs: Some(total),
        fade_start_secs: Some(start),
        hold_secs: 0.0,
    }
}

fn encode_args(total_secs: f64) -> Vec<String> {
    vec![
        "-t".to_string(),
        format_number(total_secs),
        "-c:v".to_string(),
        VIDEO_CODEC.to_string(),
        "-pix_fmt".to_string(),
        PIXEL_FORMAT.to_string(),
        "-c:a".to_string(),
        AUDIO_CODEC.to_string(),
    ]
}

/// Check that every input exists and probe the durations the policy needs.
pub fn probe_inputs(probe: &dyn MediaProbe, request: &MergeRequest) -> StoryreelResult<MediaDurations> {
    if !request.video.is_file() {
        let searched = request
            .video
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        return Err(StoryreelError::missing_asset(
            request.video.display().to_string(),
            searched,
        ));
    }
    for audio in [&request.narration, &request.background].into_iter().flatten() {
        if !audio.is_file() {
            return Err(StoryreelError::asset(audio, "audio file does not exist"));
        }
    }

    let mut durations = MediaDurations::default();
    if let Some(narration) = &request.narration {
        durations.narration_secs = Some(probe.probe(narration)?.positive_duration(narration)?);
    }
    if let Some(background) = &request.background {
        // Looped, so only readability matters.
        probe.probe(background)?;
    }
    if request.policy() != MergePolicy::Passthrough {
        durations.video_secs = Some(probe.probe(&request.video)?.positive_duration(&request.video)?);
    }
    Ok(durations)
}

/// Probe the inputs, plan, and run the merge.
pub fn merge_media(
    engine: &Engine,
    probe: &dyn MediaProbe,
    request: &MergeRequest,
    output: &Path,
) -> StoryreelResult<MergePlan> {
    request.validate()?;
    let durations = probe_inputs(probe, request)?;
    let plan = plan_merge(request, &durations, output)?;

    tracing::info!(
        policy = ?plan.policy,
        probe = probe.name(),
        output = %output.display(),
        "Merging media"
    );
    engine.execute_with_progress(&plan.invocation, plan.output_duration_secs, None)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::probe::MediaInfo;

    fn durations(video: f64, narration: Option<f64>) -> MediaDurations {
        MediaDurations {
            video_secs: Some(video),
            narration_secs: narration,
        }
    }

    #[test]
    fn test_policy_table_is_exhaustive() {
        let base = MergeRequest::new("video.mp4");
        assert_eq!(base.policy(), MergePolicy::Passthrough);
        assert_eq!(
            base.clone().narration("n.mp3").policy(),
            MergePolicy::NarrationLed {
                with_background: false
            }
        );
        assert_eq!(
            base.clone().narration("n.mp3").background("b.mp3").policy(),
            MergePolicy::NarrationLed {
                with_background: true
            }
        );
        assert_eq!(
            base.background("b.mp3").policy(),
            MergePolicy::BackgroundOnly
        );
    }

    #[test]
    fn test_passthrough_copies_streams() {
        let plan = plan_merge(
            &MergeRequest::new("video.mp4"),
            &MediaDurations::default(),
            Path::new("final.mp4"),
        )
        .unwrap();
        assert!(plan.graph.is_none());
        assert_eq!(plan.output_duration_secs, None);
        assert_eq!(
            plan.invocation.to_args(),
            ["-y", "-i", "video.mp4", "-c", "copy", "final.mp4"]
        );
    }

    #[test]
    fn test_narration_only_holds_last_frame() {
        let mut request = MergeRequest::new("video.mp4").narration("narration.mp3");
        request.narration_volume = 1.0;
        request.fade_duration_secs = 0.5;

        let plan = plan_merge(&request, &durations(2.0, Some(3.0)), Path::new("final.mp4")).unwrap();
        assert_eq!(plan.output_duration_secs, Some(3.5));
        assert_eq!(plan.fade_start_secs, Some(3.0));
        assert_eq!(plan.hold_secs, 1.5);

        let graph = plan.graph.as_ref().unwrap().to_filter_complex();
        assert_eq!(
            graph,
            "[0:v]tpad=stop_mode=clone:stop_duration=1.5,fade=t=out:st=3.0:d=0.5[vout];\
             [1:a]volume=1.0,afade=t=out:st=3.0:d=0.5[aout]"
        );

        let args = plan.invocation.to_args();
        assert_eq!(
            &args[..5],
            ["-y", "-i", "video.mp4", "-i", "narration.mp3"]
        );
        assert_eq!(
            &args[args.len() - 13..],
            [
                "-map",
                "[vout]",
                "-map",
                "[aout]",
                "-t",
                "3.5",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-c:a",
                "aac",
                "final.mp4"
            ]
        );
    }

    #[test]
    fn test_narration_with_background_mixes_then_fades() {
        let mut request = MergeRequest::new("video.mp4")
            .narration("narration.mp3")
            .background("music.mp3");
        request.narration_volume = 1.0;
        request.background_volume = 0.2;
        request.fade_duration_secs = 0.5;

        let plan = plan_merge(&request, &durations(10.0, Some(3.0)), Path::new("final.mp4")).unwrap();
        assert_eq!(plan.output_duration_secs, Some(3.5));
        assert_eq!(plan.hold_secs, 0.0);

        let graph = plan.graph.as_ref().unwrap().to_filter_complex();
        assert_eq!(
            graph,
            "[0:v]fade=t=out:st=3.0:d=0.5[vout];\
             [1:a]volume=1.0[narr];\
             [2:a]volume=0.2[bg];\
             [narr][bg]amix=inputs=2:duration=longest:dropout_transition=0,afade=t=out:st=3.0:d=0.5[aout]"
        );

        let args = plan.invocation.to_args();
        assert_eq!(
            &args[..9],
            [
                "-y",
                "-i",
                "video.mp4",
                "-i",
                "narration.mp3",
                "-stream_loop",
                "-1",
                "-i",
                "music.mp3"
            ]
        );
    }

    #[test]
    fn test_background_only_follows_video_length() {
        let mut request = MergeRequest::new("video.mp4").background("music.mp3");
        request.background_volume = 0.2;
        request.fade_duration_secs = 1.0;

        let plan = plan_merge(&request, &durations(4.0, None), Path::new("final.mp4")).unwrap();
        assert_eq!(plan.output_duration_secs, Some(4.0));
        assert_eq!(plan.fade_start_secs, Some(3.0));
        assert_eq!(
            plan.graph.as_ref().unwrap().to_filter_complex(),
            "[0:v]fade=t=out:st=3.0:d=1.0[vout];[1:a]volume=0.2,afade=t=out:st=3.0:d=1.0[aout]"
        );

        let args = plan.invocation.to_args();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "4.0");
    }

    #[test]
    fn test_background_fade_longer_than_video_starts_at_zero() {
        let mut request = MergeRequest::new("video.mp4").background("music.mp3");
        request.fade_duration_secs = 5.0;
        let plan = plan_merge(&request, &durations(2.0, None), Path::new("final.mp4")).unwrap();
        assert_eq!(plan.fade_start_secs, Some(0.0));
        assert!(plan
            .graph
            .unwrap()
            .to_filter_complex()
            .starts_with("[0:v]fade=t=out:st=0.0:d=2.0[vout]"));
    }

    #[test]
    fn test_invalid_gains_are_config_errors() {
        let mut request = MergeRequest::new("video.mp4").narration("n.mp3");
        request.narration_volume = -1.0;
        assert!(plan_merge(&request, &durations(1.0, Some(1.0)), Path::new("o.mp4"))
            .unwrap_err()
            .is_config());

        request.narration_volume = 1.0;
        request.fade_duration_secs = f64::NAN;
        assert!(request.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_non_positive_narration_is_asset_error() {
        let request = MergeRequest::new("video.mp4").narration("n.mp3");
        let err = plan_merge(&request, &durations(1.0, Some(0.0)), Path::new("o.mp4")).unwrap_err();
        assert!(matches!(err, StoryreelError::Asset { .. }));
    }

    struct FixedProbe(HashMap<PathBuf, f64>);

    impl MediaProbe for FixedProbe {
        fn probe(&self, path: &Path) -> StoryreelResult<MediaInfo> {
            let duration = self
                .0
                .get(path)
                .copied()
                .ok_or_else(|| StoryreelError::asset(path, "unprobeable"))?;
            Ok(MediaInfo {
                duration_secs: Some(duration),
                width: None,
                height: None,
                rotation: 0,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_missing_video_is_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_media(
            &Engine::new("true"),
            &FixedProbe(HashMap::new()),
            &MergeRequest::new(dir.path().join("video.mp4")),
            &dir.path().join("final.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, StoryreelError::MissingAsset { .. }));
    }

    #[test]
    fn test_missing_or_unprobeable_audio_is_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video.mp4");
        let narration = dir.path().join("narration.mp3");
        std::fs::write(&video, b"video").unwrap();

        let request = MergeRequest::new(&video).narration(&narration);
        let probe = FixedProbe(HashMap::from([(video.clone(), 2.0)]));
        let err = merge_media(&Engine::new("true"), &probe, &request, &dir.path().join("o.mp4"))
            .unwrap_err();
        assert!(matches!(err, StoryreelError::Asset { .. }));

        std::fs::write(&narration, b"audio").unwrap();
        let err = merge_media(&Engine::new("true"), &probe, &request, &dir.path().join("o.mp4"))
            .unwrap_err();
        assert!(matches!(err, StoryreelError::Asset { ref message, .. } if message == "unprobeable"));
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_that_writes_nothing_is_output_missing() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video.mp4");
        std::fs::write(&video, b"video").unwrap();

        let err = merge_media(
            &Engine::new("true"),
            &FixedProbe(HashMap::new()),
            &MergeRequest::new(&video),
            &dir.path().join("final.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, StoryreelError::OutputMissing { .. }));
    }
}
