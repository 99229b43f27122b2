//! Per-clip effect compiler.
//!
//! Every fragment fills the target frame (cover-scale, then center-crop)
//! and ends normalized to `fps=F,format=yuv420p` so all clip streams are
//! interchangeable inputs for the transition stage.

use storyreel_timeline_model::effect::{
    Effect, FadeEffect, HorizontalSlide, VerticalSlide, VerticalSlideEffect, ZoomEffect,
};
use storyreel_timeline_model::settings::VideoSettings;

use crate::graph::{format_number, FilterNode};

pub const PIXEL_FORMAT: &str = "yuv420p";

/// Compile one clip's effect into a comma-joined filter chain.
pub fn compile_effect(effect: &Effect, settings: &VideoSettings, duration_secs: f64) -> String {
    let VideoSettings { width, height, fps } = *settings;

    match effect {
        Effect::None | Effect::Unrecognized { .. } => {
            format!("{},fps={fps},format={PIXEL_FORMAT}", base_transform(width, height))
        }
        Effect::Zoom(zoom) => zoom_chain(zoom, settings, duration_secs),
        Effect::Fade(fade) => fade_chain(fade, settings),
        Effect::SlideHorizontal { direction } => {
            horizontal_slide_chain(*direction, settings, duration_secs)
        }
        Effect::SlideVertical(slide) => vertical_slide_chain(slide, settings, duration_secs),
    }
}

/// Node that turns input `index` into the trimmed, effected stream `v{index}`.
pub fn clip_node(
    index: usize,
    effect: &Effect,
    settings: &VideoSettings,
    duration_secs: f64,
) -> FilterNode {
    let chain = compile_effect(effect, settings, duration_secs);
    FilterNode::new(
        [format!("{index}:v")],
        format!(
            "{chain},trim=duration={},setpts=PTS-STARTPTS",
            format_number(duration_secs)
        ),
        clip_label(index),
    )
}

pub fn clip_label(index: usize) -> String {
    format!("v{index}")
}

/// Scale preserving aspect ratio to cover `w`x`h`, then center-crop.
pub fn base_transform(width: u32, height: u32) -> String {
    format!("scale={width}:{height}:force_original_aspect_ratio=increase,crop={width}:{height}")
}

/// Frames the zoom ramp spans: `round(duration * fps)`, at least one.
pub fn zoom_frames(duration_secs: f64, fps: u32) -> u64 {
    let frames = (duration_secs * fps as f64).round_ties_even();
    if frames.is_finite() && frames >= 1.0 {
        frames as u64
    } else {
        1
    }
}

fn zoom_chain(zoom: &ZoomEffect, settings: &VideoSettings, duration_secs: f64) -> String {
    let VideoSettings { width, height, fps } = *settings;
    format!(
        "{base},zoompan=z='if(eq(on,0),{start},min(zoom+{step},{end}))':\
         x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':\
         d={frames}:s={width}x{height}:fps={fps},format={PIXEL_FORMAT}",
        base = base_transform(width, height),
        start = format_number(zoom.start_scale),
        step = format_number(zoom.step),
        end = format_number(zoom.end_scale),
        frames = zoom_frames(duration_secs, fps),
    )
}

fn fade_chain(fade: &FadeEffect, settings: &VideoSettings) -> String {
    let VideoSettings { width, height, fps } = *settings;
    format!(
        "{base},fps={fps},fade=t=in:st={in_st}:d={in_d},fade=t=out:st={out_st}:d={out_d},format={PIXEL_FORMAT}",
        base = base_transform(width, height),
        in_st = format_number(fade.fade_in.start_secs),
        in_d = format_number(fade.fade_in.duration_secs),
        out_st = format_number(fade.fade_out.start_secs),
        out_d = format_number(fade.fade_out.duration_secs),
    )
}

fn horizontal_slide_chain(
    direction: HorizontalSlide,
    settings: &VideoSettings,
    duration_secs: f64,
) -> String {
    let VideoSettings { width, height, fps } = *settings;
    let progress = format!("(t/{})", format_number(duration_secs));
    let half = format_number(width as f64 / 2.0);

    let x_expr = match direction {
        HorizontalSlide::LeftToCenter => format!("{progress}*{half}"),
        HorizontalSlide::RightToCenter => format!("{width}-{progress}*{half}"),
        HorizontalSlide::RightToLeft => format!("{width}-{progress}*{width}"),
        HorizontalSlide::LeftToRight => format!("{progress}*{width}"),
    };

    format!(
        "scale={wide}:{height}:force_original_aspect_ratio=increase,\
         crop={width}:{height}:x='{x_expr}':y=0,fps={fps},format={PIXEL_FORMAT}",
        wide = u64::from(width) * 2,
    )
}

/// Oversampled source height for a vertical slide.
pub fn vertical_source_height(slide: &VerticalSlideEffect, target_height: u32) -> u32 {
    slide
        .source_height
        .unwrap_or((target_height as f64 * 1.25) as u32)
}

fn vertical_slide_chain(
    slide: &VerticalSlideEffect,
    settings: &VideoSettings,
    duration_secs: f64,
) -> String {
    let VideoSettings { width, height, fps } = *settings;
    let tall = vertical_source_height(slide, height);
    let delta = tall.saturating_sub(height).max(1);
    let progress = format!("(t/{})", format_number(duration_secs));

    let y_expr = match slide.direction {
        VerticalSlide::BottomToTop => format!("{delta}-{progress}*{delta}"),
        VerticalSlide::TopToBottom => format!("{progress}*{delta}"),
        VerticalSlide::BottomToCenter => format!("{delta}-{progress}*({delta}/2)"),
        VerticalSlide::TopToCenter => format!("{progress}*({delta}/2)"),
    };

    format!(
        "scale={width}:{tall}:force_original_aspect_ratio=increase,\
         crop={width}:{height}:x=0:y='{y_expr}',fps={fps},format={PIXEL_FORMAT}"
    )
}
