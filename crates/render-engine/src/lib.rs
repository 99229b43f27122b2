//! Storyreel Render Engine
//!
//! Compiles a timeline into an ffmpeg filter graph, plans the
//! narration/music merge, and drives the ffmpeg binary.
//!
//! # Pipeline Architecture
//!
//! ```text
//! timeline.json ── Timeline ──┐
//!                             ├── Effect compiler (per clip)   [v0] [v1] ...
//! asset dir ── clip sources ──┘         │
//!                                       ▼
//!                              Transition chain (xfade)        [x0] [x1] ...
//!                                       │
//!                                       ▼
//!                                  slideshow.mp4
//!                                       │
//! narration.mp3 ──┐                     │
//!                 ├── Merge planner ────┘  (tpad, volume, amix, afade)
//! music.mp3 ──────┘         │
//!                           ▼
//!                       final.mp4 ── Caption burn-in (optional)
//! ```
//!
//! Compilation is pure; only [`engine`], [`probe`] and the `render_*` /
//! `merge_*` / `burn_*` entry points touch the filesystem or spawn processes.

pub mod chain;
pub mod effects;
pub mod engine;
pub mod graph;
pub mod merge;
pub mod probe;
pub mod slideshow;
pub mod subtitles;

pub use chain::*;
pub use effects::*;
pub use engine::*;
pub use graph::*;
pub use merge::*;
pub use probe::*;
pub use slideshow::*;
pub use subtitles::*;
