//! Playback configuration.

use serde::{Deserialize, Serialize};

use crate::{PlaybackError, Result};

/// Playback speed multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackSpeed {
    /// Hold the current step
    Paused,
    /// 0.25x speed
    QuarterSpeed,
    /// 0.5x speed
    HalfSpeed,
    /// Normal speed (1x)
    #[default]
    Normal,
    /// 2x speed
    Double,
    /// 4x speed
    Quadruple,
    /// As fast as the host can render
    Maximum,
}

impl PlaybackSpeed {
    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Paused => 0.0,
            PlaybackSpeed::QuarterSpeed => 0.25,
            PlaybackSpeed::HalfSpeed => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
            PlaybackSpeed::Maximum => f64::INFINITY,
        }
    }

    /// Milliseconds between steps at this speed, or `None` while paused.
    pub fn ms_per_step(&self, base_ms: u64) -> Option<u64> {
        match self {
            PlaybackSpeed::Paused => None,
            PlaybackSpeed::Maximum => Some(0),
            speed => Some((base_ms as f64 / speed.multiplier()) as u64),
        }
    }
}

/// Configuration for a [`Playback`](crate::Playback) controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Capture a state snapshot every this many steps
    pub checkpoint_interval: usize,
    /// Initial speed
    pub speed: PlaybackSpeed,
    /// Wrap to the first step after the last
    pub loop_enabled: bool,
    /// Milliseconds per step at normal speed
    pub base_ms_per_step: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: 64,
            speed: PlaybackSpeed::Normal,
            loop_enabled: false,
            base_ms_per_step: 500,
        }
    }
}

impl PlaybackConfig {
    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_interval == 0 {
            return Err(PlaybackError::InvalidCheckpointInterval(self.checkpoint_interval));
        }
        Ok(())
    }
}
