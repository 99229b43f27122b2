//! Transition chain compiler.
//!
//! Folds per-clip streams left to right into a single stream, inserting one
//! `xfade` join per transition while tracking the cumulative length of the
//! already-joined stream.

use serde::Serialize;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_timeline_model::transition::{
    is_valid_style, Transition, TransitionKind, DEFAULT_TRANSITION_STYLE,
};

use crate::effects::PIXEL_FORMAT;
use crate::graph::{format_number, CompiledGraph, FilterNode};

/// One emitted join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinPlan {
    pub style: String,
    pub duration_secs: f64,
    /// Point in the joined stream where the incoming clip starts
    /// overlapping. Never negative.
    pub offset_secs: f64,
    pub output: String,
}

/// Result of folding a clip list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainOutcome {
    /// Final video stream label.
    pub output: String,
    /// `sum(durations) - sum(transition durations)`, with the running
    /// length floored at zero after every join.
    pub total_length_secs: f64,
    pub joins: Vec<JoinPlan>,
}

/// Style and overlap actually used for a transition.
pub fn resolve_transition(transition: &Transition) -> (&str, f64) {
    match transition.kind {
        TransitionKind::Cut => (DEFAULT_TRANSITION_STYLE, 0.0),
        TransitionKind::Crossfade => (transition.style.as_str(), transition.duration_secs),
    }
}

/// Fold `clip_labels` into one stream, appending join nodes to `graph`.
///
/// `transitions` must have exactly one fewer element than `clip_labels`,
/// and `durations` one per clip. A single clip yields no joins.
pub fn chain_transitions(
    graph: &mut CompiledGraph,
    clip_labels: &[String],
    transitions: &[Transition],
    durations: &[f64],
) -> StoryreelResult<ChainOutcome> {
    let (first_label, rest) = clip_labels
        .split_first()
        .ok_or_else(|| StoryreelError::config("no timeline: nothing to chain"))?;

    if durations.len() != clip_labels.len() {
        return Err(StoryreelError::config(format!(
            "{} clip durations for {} clips",
            durations.len(),
            clip_labels.len()
        )));
    }
    if transitions.len() != rest.len() {
        return Err(StoryreelError::config(format!(
            "{} transitions for {} clips (expected {})",
            transitions.len(),
            clip_labels.len(),
            rest.len()
        )));
    }

    let mut current = first_label.clone();
    let mut current_len = durations[0];
    let mut joins = Vec::with_capacity(transitions.len());

    for (i, (next_label, transition)) in rest.iter().zip(transitions).enumerate() {
        let (style, overlap) = resolve_transition(transition);
        if !is_valid_style(style) {
            return Err(StoryreelError::config(format!(
                "transition '{style}' is not a valid engine transition name"
            )));
        }
        let offset = (current_len - overlap).max(0.0);
        let output = format!("x{i}");

        graph.push(FilterNode::new(
            [current.as_str(), next_label.as_str()],
            format!(
                "xfade=transition={style}:duration={}:offset={},format={PIXEL_FORMAT}",
                format_number(overlap),
                format_number(offset),
            ),
            output.as_str(),
        ));

        tracing::trace!(join = i, style, overlap, offset, "Transition join");

        joins.push(JoinPlan {
            style: style.to_string(),
            duration_secs: overlap,
            offset_secs: offset,
            output: output.clone(),
        });

        current_len = (current_len + durations[i + 1] - overlap).max(0.0);
        current = output;
    }

    Ok(ChainOutcome {
        output: current,
        total_length_secs: current_len,
        joins,
    })
}
