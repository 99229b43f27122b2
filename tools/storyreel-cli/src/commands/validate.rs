//! Validate a timeline config.

use std::path::PathBuf;

use storyreel_timeline_model::assets::resolve_clip_source;
use storyreel_timeline_model::timeline::{ClipSource, Timeline};
use storyreel_timeline_model::transition::TransitionKind;

pub fn run(path: PathBuf, assets: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Validating timeline: {}", path.display());

    let timeline = match Timeline::load(&path) {
        Ok(t) => t,
        Err(e) => {
            println!("[FAIL] {e}");
            return Err(e.into());
        }
    };

    println!(
        "[OK] Video: {} @ {} fps",
        timeline.settings.resolution(),
        timeline.settings.fps
    );
    println!("[OK] Clips: {}", timeline.clips.len());

    let last = timeline.clips.len() - 1;
    let mut missing = 0;
    for (i, clip) in timeline.clips.iter().enumerate() {
        let source = match &clip.source {
            ClipSource::File(name) => name.as_str(),
            ClipSource::Identifier(id) => id.as_str(),
        };
        let join = if i == last {
            String::new()
        } else {
            match clip.transition_to_next.kind {
                TransitionKind::Cut => " -> cut".to_string(),
                TransitionKind::Crossfade => format!(
                    " -> {} {:.2}s",
                    clip.transition_to_next.style, clip.transition_to_next.duration_secs
                ),
            }
        };
        println!(
            "     {:>2}. {} ({}) {:.2}s {}{}",
            i + 1,
            clip.id,
            source,
            clip.duration_secs,
            clip.effect.name(),
            join
        );

        if let Some(dir) = &assets {
            match resolve_clip_source(clip, dir) {
                Ok(found) => println!("         [OK] {}", found.display()),
                Err(e) => {
                    missing += 1;
                    println!("         [FAIL] {e}");
                }
            }
        }
    }

    println!(
        "[OK] Expected length: {:.2}s",
        timeline.expected_length_secs()
    );

    if missing > 0 {
        anyhow::bail!("{missing} clip source(s) could not be resolved");
    }
    println!("\nTimeline is valid.");
    Ok(())
}
