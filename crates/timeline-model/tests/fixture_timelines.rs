use std::path::{Path, PathBuf};

use storyreel_common::error::StoryreelError;
use storyreel_timeline_model::assets::resolve_clip_sources;
use storyreel_timeline_model::effect::{Effect, HorizontalSlide, VerticalSlide};
use storyreel_timeline_model::timeline::{ClipSource, Timeline};
use storyreel_timeline_model::transition::TransitionKind;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join(name)
        .join("timeline.json")
}

fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"img").expect("asset should be writable");
}

#[test]
fn story_fixture_parses_into_playback_order() {
    let timeline = Timeline::load(fixture("story-timeline")).expect("fixture should parse");

    assert_eq!(timeline.settings.width, 720);
    assert_eq!(timeline.settings.height, 1280);
    assert_eq!(timeline.settings.fps, 25);

    let ids: Vec<&str> = timeline.clips.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["intro", "harbor", "city", "finale"]);

    assert_eq!(timeline.clips[0].source, ClipSource::File("intro.jpg".to_string()));
    assert!(matches!(timeline.clips[0].effect, Effect::Fade(_)));
    assert_eq!(
        timeline.clips[1].effect,
        Effect::SlideHorizontal {
            direction: HorizontalSlide::RightToLeft
        }
    );
    assert!(matches!(
        &timeline.clips[2].effect,
        Effect::SlideVertical(slide) if slide.direction == VerticalSlide::TopToBottom
    ));
    assert!(matches!(&timeline.clips[3].effect, Effect::Zoom(zoom) if zoom.end_scale == 1.3));

    let transitions = timeline.transitions();
    assert_eq!(transitions.len(), 3);
    assert_eq!(transitions[0].style, "slideleft");
    assert_eq!(transitions[1].duration_secs, 0.5);
    assert_eq!(transitions[2].kind, TransitionKind::Cut);
    assert_eq!(transitions[2].duration_secs, 0.0);

    assert_eq!(timeline.expected_length_secs(), 13.0);
}

#[test]
fn story_fixture_resolves_against_asset_dir() {
    let timeline = Timeline::load(fixture("story-timeline")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "intro.jpg");
    touch(dir.path(), "harbor.png");
    touch(dir.path(), "city.webp");
    touch(dir.path(), "finale.jpeg");

    let sources = resolve_clip_sources(&timeline, dir.path()).unwrap();
    let names: Vec<String> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["intro.jpg", "harbor.png", "city.webp", "finale.jpeg"]);
}

#[test]
fn missing_asset_names_the_clip() {
    let timeline = Timeline::load(fixture("sample-timeline")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "image_0.png");

    let err = resolve_clip_sources(&timeline, dir.path()).unwrap_err();
    assert!(matches!(
        err,
        StoryreelError::MissingAsset { ref reference, .. } if reference == "image_1"
    ));
}
