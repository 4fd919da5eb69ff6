//! Algoscope Playback
//!
//! Seekable playback over a materialized step log: play, pause, step in
//! either direction and scrub to any index. State at the cursor is rebuilt
//! from periodic [`Checkpoints`] and always equals
//! [`reconstruct`](algoscope_trace::reconstruct) at the same index.

mod checkpoint;
mod config;
mod error;
mod playback;

pub use checkpoint::Checkpoints;
pub use config::{PlaybackConfig, PlaybackSpeed};
pub use error::{PlaybackError, Result};
pub use playback::{Frame, Playback, PlaybackState, PlaybackStatus};
