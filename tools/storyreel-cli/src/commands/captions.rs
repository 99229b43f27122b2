//! Build captions from a word-timed transcript.

use std::path::PathBuf;

use storyreel_captions::style::CaptionStyle;
use storyreel_captions::subtitles::save_captions;
use storyreel_captions::transcript::{group_words, Transcript};
use storyreel_common::config::AppConfig;
use storyreel_render_engine::engine::Engine;
use storyreel_render_engine::probe::FfprobeProbe;
use storyreel_render_engine::subtitles::burn_captions;

pub async fn run(
    config: &AppConfig,
    transcript_path: PathBuf,
    output: PathBuf,
    words_per_line: usize,
    burn_into: Option<PathBuf>,
    burned_output: PathBuf,
    vertical_position: i64,
) -> anyhow::Result<()> {
    let transcript = Transcript::load(&transcript_path)?;
    let cues = group_words(&transcript.words, words_per_line);
    let format = save_captions(&cues, &output)?;

    println!(
        "Captions written: {} ({} cues, {:?}, language: {})",
        output.display(),
        cues.len(),
        format,
        transcript.language.as_deref().unwrap_or("unknown")
    );

    let Some(video) = burn_into else {
        return Ok(());
    };

    let style = CaptionStyle {
        vertical_position,
        ..CaptionStyle::default()
    };
    let engine = Engine::from_config(&config.engine);
    let probe = FfprobeProbe::from_config(&config.engine);
    let out = burned_output.clone();

    tokio::task::spawn_blocking(move || {
        burn_captions(&engine, &probe, &video, &output, &style, &out)
    })
    .await??;

    println!("Captioned video: {}", burned_output.display());
    Ok(())
}
