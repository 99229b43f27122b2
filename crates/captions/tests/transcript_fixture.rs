use std::path::PathBuf;

use storyreel_captions::subtitles::{generate_srt, save_captions, CaptionFormat};
use storyreel_captions::transcript::{group_words, Transcript};

fn load_fixture_transcript() -> Transcript {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("story-timeline")
        .join("transcript.json");
    Transcript::load(&path).expect("fixture transcript should parse")
}

#[test]
fn fixture_transcript_to_srt() {
    let transcript = load_fixture_transcript();
    let cues = group_words(&transcript.words, 3);

    assert_eq!(
        generate_srt(&cues),
        "1\n00:00:00,000 --> 00:00:00,900\nEvery city has\n\n\
         2\n00:00:00,900 --> 00:00:02,400\na harbor. This\n\n\
         3\n00:00:02,400 --> 00:00:03,200\nis ours.\n\n"
    );
}

#[test]
fn fixture_transcript_to_vtt_file() {
    let transcript = load_fixture_transcript();
    let cues = group_words(&transcript.words, 4);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("captions.vtt");

    assert_eq!(save_captions(&cues, &path).unwrap(), CaptionFormat::Vtt);
    let vtt = std::fs::read_to_string(&path).unwrap();
    assert!(vtt.starts_with("WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nEvery city has a\n"));
    assert!(vtt.contains("harbor. This is ours."));
}
