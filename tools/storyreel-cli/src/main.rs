//! Storyreel CLI: turn image timelines into narrated slideshow videos.
//!
//! Usage:
//!   storyreel render <CONFIG>     Render a timeline to video
//!   storyreel merge <VIDEO>       Add narration and background music
//!   storyreel produce <CONFIG>    Render and merge in one go
//!   storyreel validate <CONFIG>   Check a timeline without rendering
//!   storyreel probe <FILE>        Show media information
//!   storyreel captions <FILE>     Build captions from a word-timed transcript
//!   storyreel check               Check engine and integration setup

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use storyreel_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "storyreel",
    about = "Compile image timelines into ffmpeg slideshows with narration and music",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Audio inputs and mix settings shared by `merge` and `produce`.
#[derive(Args, Debug, Clone)]
pub struct AudioArgs {
    /// Narration track; sets the output length
    #[arg(long)]
    pub narration: Option<PathBuf>,

    /// Background music, looped under the video
    #[arg(long)]
    pub background: Option<PathBuf>,

    /// Narration gain (linear)
    #[arg(long)]
    pub narration_volume: Option<f64>,

    /// Background gain (linear)
    #[arg(long)]
    pub background_volume: Option<f64>,

    /// Fade-out length in seconds
    #[arg(long)]
    pub fade: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a timeline config to a slideshow video
    Render {
        /// Path to the timeline JSON
        config: PathBuf,

        /// Directory holding the referenced images
        #[arg(short, long, default_value = ".")]
        assets: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "slideshow.mp4")]
        output: PathBuf,

        /// Print the engine command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge narration and/or background music into a video
    Merge {
        /// Rendered video
        video: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "final.mp4")]
        output: PathBuf,

        #[command(flatten)]
        audio: AudioArgs,

        /// Print the engine command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Render a timeline and merge audio into the final video
    Produce {
        /// Path to the timeline JSON
        config: PathBuf,

        /// Directory holding the referenced images
        #[arg(short, long, default_value = ".")]
        assets: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "final.mp4")]
        output: PathBuf,

        #[command(flatten)]
        audio: AudioArgs,
    },

    /// Validate a timeline config
    Validate {
        /// Path to the timeline JSON
        config: PathBuf,

        /// Also resolve every clip inside this asset directory
        #[arg(short, long)]
        assets: Option<PathBuf>,
    },

    /// Show duration, dimensions and rotation of a media file
    Probe {
        /// Media file
        path: PathBuf,
    },

    /// Build captions from a word-timed transcript
    Captions {
        /// Transcript JSON (`{language?, words: [{word, start, end}]}`)
        transcript: PathBuf,

        /// Caption file (.srt or .vtt)
        #[arg(short, long, default_value = "captions.srt")]
        output: PathBuf,

        /// Maximum words per caption line
        #[arg(long, default_value = "3")]
        words_per_line: usize,

        /// Burn the captions into this video
        #[arg(long)]
        burn_into: Option<PathBuf>,

        /// Output for the captioned video
        #[arg(long, default_value = "captioned.mp4")]
        burned_output: PathBuf,

        /// Caption offset from the vertical centre, in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        vertical_position: i64,
    },

    /// Check engine availability and integration settings
    Check {
        /// Write the effective config to the standard location
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    storyreel_common::logging::init_logging(&LoggingConfig {
        level,
        json: config.logging.json,
    });

    match cli.command {
        Commands::Render {
            config: timeline,
            assets,
            output,
            dry_run,
        } => commands::render::run(&config, timeline, assets, output, dry_run).await,
        Commands::Merge {
            video,
            output,
            audio,
            dry_run,
        } => commands::merge::run(&config, video, output, audio, dry_run).await,
        Commands::Produce {
            config: timeline,
            assets,
            output,
            audio,
        } => commands::produce::run(&config, timeline, assets, output, audio).await,
        Commands::Validate {
            config: timeline,
            assets,
        } => commands::validate::run(timeline, assets),
        Commands::Probe { path } => commands::probe::run(&config, path),
        Commands::Captions {
            transcript,
            output,
            words_per_line,
            burn_into,
            burned_output,
            vertical_position,
        } => {
            commands::captions::run(
                &config,
                transcript,
                output,
                words_per_line,
                burn_into,
                burned_output,
                vertical_position,
            )
            .await
        }
        Commands::Check { write_config } => commands::check::run(&config, write_config),
    }
}
