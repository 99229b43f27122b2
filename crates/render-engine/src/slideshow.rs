//! Timeline to slideshow video.

use std::path::{Path, PathBuf};

use serde::Serialize;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_timeline_model::assets::resolve_clip_sources;
use storyreel_timeline_model::timeline::Timeline;

use crate::chain::{chain_transitions, JoinPlan};
use crate::effects::{clip_node, PIXEL_FORMAT};
use crate::engine::{Engine, EngineInvocation, ProgressCallback};
use crate::graph::{format_number, CompiledGraph};

/// A compiled, ready-to-run slideshow render.
#[derive(Debug, Clone, Serialize)]
pub struct SlideshowPlan {
    pub graph: CompiledGraph,
    pub invocation: EngineInvocation,
    /// Authoritative length of the rendered video.
    pub total_duration_secs: f64,
    pub joins: Vec<JoinPlan>,
}

/// Compile a timeline against already-resolved clip sources.
///
/// Pure: `sources[i]` must be the file for `timeline.clips[i]`.
pub fn compile_slideshow(
    timeline: &Timeline,
    sources: &[PathBuf],
    output: &Path,
) -> StoryreelResult<SlideshowPlan> {
    if timeline.clips.is_empty() {
        return Err(StoryreelError::config("no timeline: no clips to render"));
    }
    if sources.len() != timeline.clips.len() {
        return Err(StoryreelError::config(format!(
            "{} sources resolved for {} clips",
            sources.len(),
            timeline.clips.len()
        )));
    }

    let settings = &timeline.settings;
    let fps = settings.fps.to_string();
    let mut graph = CompiledGraph::new();
    let mut invocation = EngineInvocation::new(output);
    let mut labels = Vec::with_capacity(timeline.clips.len());

    for (index, (clip, source)) in timeline.clips.iter().zip(sources).enumerate() {
        invocation = invocation.input(
            source,
            [
                "-loop".to_string(),
                "1".to_string(),
                "-framerate".to_string(),
                fps.clone(),
                "-t".to_string(),
                format_number(clip.duration_secs),
            ],
        );
        labels.push(graph.push(clip_node(
            index,
            &clip.effect,
            settings,
            clip.duration_secs,
        )));
    }

    let outcome = chain_transitions(
        &mut graph,
        &labels,
        &timeline.transitions(),
        &timeline.durations(),
    )?;
    graph.add_output(outcome.output.as_str());

    let invocation = invocation
        .graph(&graph)
        .output_args(["-r".to_string(), fps, "-pix_fmt".to_string(), PIXEL_FORMAT.to_string()]);

    tracing::debug!(
        clips = timeline.clips.len(),
        joins = outcome.joins.len(),
        total_secs = outcome.total_length_secs,
        "Slideshow compiled"
    );

    Ok(SlideshowPlan {
        graph,
        invocation,
        total_duration_secs: outcome.total_length_secs,
        joins: outcome.joins,
    })
}

/// Resolve assets, compile and render a timeline to `output`.
///
/// Returns the plan that was executed.
pub fn render_slideshow(
    engine: &Engine,
    timeline: &Timeline,
    asset_dir: &Path,
    output: &Path,
    progress: Option<ProgressCallback>,
) -> StoryreelResult<SlideshowPlan> {
    let sources = resolve_clip_sources(timeline, asset_dir)?;
    let plan = compile_slideshow(timeline, &sources, output)?;

    tracing::info!(
        output = %output.display(),
        clips = timeline.clips.len(),
        total_secs = plan.total_duration_secs,
        "Rendering slideshow"
    );

    engine.execute_with_progress(&plan.invocation, Some(plan.total_duration_secs), progress)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clip_timeline() -> Timeline {
        Timeline::from_json(
            r#"{
                "video": {"resolution": "720x1280", "fps": 24},
                "timeline": {"images": [
                    {"id": "b", "order": 2, "duration_seconds": 3.0},
                    {"id": "a", "order": 1, "duration_seconds": 2.0,
                     "effect": {"type": "zoom"},
                     "transition_to_next": {"type": "xfade", "transition": "wipeleft", "duration": 1.0}}
                ]}
            }"#,
        )
        .unwrap()
    }

    fn sources() -> Vec<PathBuf> {
        vec![PathBuf::from("/assets/a.png"), PathBuf::from("/assets/b.jpg")]
    }

    #[test]
    fn test_invocation_layout() {
        let plan =
            compile_slideshow(&two_clip_timeline(), &sources(), Path::new("/out/slides.mp4"))
                .unwrap();
        let args = plan.invocation.to_args();

        assert_eq!(
            &args[..13],
            [
                "-y",
                "-loop",
                "1",
                "-framerate",
                "24",
                "-t",
                "2.0",
                "-i",
                "/assets/a.png",
                "-loop",
                "1",
                "-framerate",
                "24",
            ]
        );
        assert_eq!(
            &args[args.len() - 7..],
            ["-map", "[x0]", "-r", "24", "-pix_fmt", "yuv420p", "/out/slides.mp4"]
        );
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert_eq!(plan.total_duration_secs, 4.0);
        assert_eq!(plan.joins[0].offset_secs, 1.0);
    }

    #[test]
    fn test_graph_uses_sorted_clip_effects() {
        let plan =
            compile_slideshow(&two_clip_timeline(), &sources(), Path::new("out.mp4")).unwrap();
        let graph = plan.graph.to_filter_complex();
        assert!(graph.starts_with("[0:v]scale=720:1280:force_original_aspect_ratio=increase"));
        assert!(graph.contains("zoompan"));
        assert!(graph.contains("[v0][v1]xfade=transition=wipeleft:duration=1.0:offset=1.0"));
        assert_eq!(plan.graph.outputs(), ["x0"]);
    }

    #[test]
    fn test_single_clip_maps_its_own_stream() {
        let timeline =
            Timeline::from_json(r#"{"timeline": {"images": [{"id": "only"}]}}"#).unwrap();
        let plan = compile_slideshow(
            &timeline,
            &[PathBuf::from("only.png")],
            Path::new("out.mp4"),
        )
        .unwrap();
        assert_eq!(plan.graph.outputs(), ["v0"]);
        assert_eq!(plan.graph.count_filter("xfade"), 0);
        assert_eq!(plan.total_duration_secs, 5.0);
    }

    #[test]
    fn test_source_count_mismatch() {
        let err = compile_slideshow(
            &two_clip_timeline(),
            &[PathBuf::from("a.png")],
            Path::new("out.mp4"),
        )
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_render_fails_fast_on_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new("/nonexistent/engine");
        let err = render_slideshow(
            &engine,
            &two_clip_timeline(),
            dir.path(),
            &dir.path().join("out.mp4"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StoryreelError::MissingAsset { .. }));
    }
}
