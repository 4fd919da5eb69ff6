//! Playback controls over a step log.
//!
//! The controller owns an immutable log and a cursor. Every cursor change
//! is answered by rebuilding the state from a checkpoint, never by patching
//! the previous state, so stepping back is as exact as stepping forward.
//! Timers are the host's business: it calls [`Playback::tick`] at whatever
//! cadence [`Playback::ms_per_step`] suggests.

use algoscope_trace::{Fold, Pointers, Step, StepLog};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Checkpoints, PlaybackConfig, PlaybackError, PlaybackSpeed, Result};

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackState {
    /// Playback is stopped at the first step
    Stopped,
    /// Playback is running forward
    Playing,
    /// Playback is paused
    Paused,
    /// Playback reached the last step
    Finished,
}

/// Everything a renderer needs for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame<S> {
    pub index: usize,
    pub total: usize,
    pub state: S,
    pub lines: Vec<u32>,
    pub explanation: Option<String>,
    pub pointers: Pointers,
}

/// Playback controller for a step log.
pub struct Playback<S: Fold> {
    steps: StepLog<S::Kind>,
    checkpoints: Checkpoints<S>,
    current: usize,
    state: PlaybackState,
    speed: PlaybackSpeed,
    loop_enabled: bool,
    base_ms_per_step: u64,
}

impl<S: Fold + Clone> Playback<S> {
    /// Create a controller positioned on the first step.
    pub fn new(steps: StepLog<S::Kind>, config: &PlaybackConfig) -> Result<Self> {
        config.validate()?;
        if steps.is_empty() {
            return Err(PlaybackError::EmptyLog);
        }
        let checkpoints = Checkpoints::build(&steps, config.checkpoint_interval)?;
        Ok(Self {
            steps,
            checkpoints,
            current: 0,
            state: PlaybackState::Stopped,
            speed: config.speed,
            loop_enabled: config.loop_enabled,
            base_ms_per_step: config.base_ms_per_step,
        })
    }

    /// Index of the step on screen.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    fn last(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn steps(&self) -> &[Step<S::Kind>] {
        &self.steps
    }

    /// Jump to `index`, clamped to the last step.
    pub fn seek(&mut self, index: usize) {
        self.current = index.min(self.last());
        trace!(index, current = self.current, "seek");
        if self.current == self.last() && !self.loop_enabled {
            self.state = PlaybackState::Finished;
        } else if self.state == PlaybackState::Finished {
            self.state = PlaybackState::Paused;
        }
    }

    /// Start playback, rewinding first if already at the end.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Finished || self.current >= self.last() {
            self.current = 0;
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Stop playback and return to the first step.
    pub fn stop(&mut self) {
        self.current = 0;
        self.state = PlaybackState::Stopped;
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
        if matches!(speed, PlaybackSpeed::Paused) {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    /// Advance one step and return it. At the last step this wraps when
    /// looping and otherwise returns `None`.
    pub fn step_forward(&mut self) -> Option<&Step<S::Kind>> {
        if self.current < self.last() {
            self.current += 1;
            if self.current == self.last() && !self.loop_enabled {
                self.state = PlaybackState::Finished;
            }
        } else if self.loop_enabled {
            self.current = 0;
        } else {
            self.state = PlaybackState::Finished;
            return None;
        }
        trace!(current = self.current, "step forward");
        self.steps.get(self.current)
    }

    /// Go back one step and pause.
    pub fn step_backward(&mut self) {
        if self.current > 0 {
            self.current -= 1;
            self.state = PlaybackState::Paused;
        }
    }

    /// Host timer callback: advance if playing. Returns whether the cursor
    /// moved.
    pub fn tick(&mut self) -> bool {
        if self.state != PlaybackState::Playing || matches!(self.speed, PlaybackSpeed::Paused) {
            return false;
        }
        self.step_forward().is_some()
    }

    /// Suggested delay before the next tick, or `None` while paused.
    pub fn ms_per_step(&self) -> Option<u64> {
        self.speed.ms_per_step(self.base_ms_per_step)
    }

    /// Fraction of the log shown, from `1 / total` on the first step to
    /// `1.0` on the last.
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.steps.len() as f64
    }

    /// The step on screen.
    pub fn current_step(&self) -> &Step<S::Kind> {
        &self.steps[self.current]
    }

    /// Reconstructed state at the cursor.
    pub fn current_state(&self) -> S {
        self.checkpoints.state_at(&self.steps, self.current)
    }

    /// State plus the current step's annotations.
    pub fn frame(&self) -> Frame<S> {
        let step = self.current_step();
        Frame {
            index: self.current,
            total: self.steps.len(),
            state: self.current_state(),
            lines: step.lines.clone(),
            explanation: step.explanation.clone(),
            pointers: step.pointers.clone(),
        }
    }
}

/// Playback status for the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub current_index: usize,
    pub total_steps: usize,
    pub state: PlaybackState,
    pub speed: PlaybackSpeed,
    pub progress: f64,
    pub loop_enabled: bool,
}

impl<S: Fold + Clone> From<&Playback<S>> for PlaybackStatus {
    fn from(playback: &Playback<S>) -> Self {
        Self {
            current_index: playback.current,
            total_steps: playback.total_steps(),
            state: playback.state,
            speed: playback.speed,
            progress: playback.progress(),
            loop_enabled: playback.loop_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_algos::array::{bubble_sort, ArrayState, ArrayStep};
    use algoscope_trace::{reconstruct, Block};

    fn make_steps() -> StepLog<ArrayStep> {
        bubble_sort(&Block::from_values(&[3, 1, 2]))
    }

    fn playback() -> Playback<ArrayState> {
        Playback::new(make_steps(), &PlaybackConfig::default()).unwrap()
    }

    #[test]
    fn playback_starts_at_zero() {
        let playback = playback();
        assert_eq!(playback.current_index(), 0);
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn empty_log_is_rejected() {
        let result = Playback::<ArrayState>::new(Vec::new(), &PlaybackConfig::default());
        assert!(matches!(result, Err(PlaybackError::EmptyLog)));
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let mut playback = playback();
        let last = playback.total_steps() - 1;

        playback.seek(2);
        assert_eq!(playback.current_index(), 2);

        playback.seek(100);
        assert_eq!(playback.current_index(), last);
        assert_eq!(playback.state(), PlaybackState::Finished);

        playback.seek(0);
        assert_eq!(playback.current_index(), 0);
        assert_eq!(playback.state(), PlaybackState::Paused);
    }

    #[test]
    fn step_forward_stops_at_end() {
        let mut playback = playback();
        let total = playback.total_steps();
        for _ in 1..total {
            assert!(playback.step_forward().is_some());
        }
        assert_eq!(playback.state(), PlaybackState::Finished);
        assert!(playback.step_forward().is_none());
        assert_eq!(playback.current_index(), total - 1);
    }

    #[test]
    fn loop_wraps_around() {
        let mut playback = playback();
        playback.set_loop(true);
        playback.seek(playback.total_steps() - 1);
        assert!(playback.step_forward().is_some());
        assert_eq!(playback.current_index(), 0);
        assert_ne!(playback.state(), PlaybackState::Finished);
    }

    #[test]
    fn tick_only_moves_while_playing() {
        let mut playback = playback();
        assert!(!playback.tick());
        playback.play();
        assert!(playback.tick());
        assert_eq!(playback.current_index(), 1);
        playback.pause();
        assert!(!playback.tick());
    }

    #[test]
    fn frames_match_reconstruction() {
        let steps = make_steps();
        let config = PlaybackConfig {
            checkpoint_interval: 2,
            ..Default::default()
        };
        let mut playback = Playback::<ArrayState>::new(steps.clone(), &config).unwrap();
        for index in (0..steps.len()).rev() {
            playback.seek(index);
            let frame = playback.frame();
            assert_eq!(frame.state, reconstruct::<ArrayState>(&steps, index));
            assert_eq!(frame.lines, steps[index].lines);
            assert_eq!(frame.explanation, steps[index].explanation);
        }
        playback.step_backward();
        assert_eq!(playback.current_index(), 0);
    }

    #[test]
    fn final_frame_shows_sorted_values() {
        let mut playback = playback();
        playback.seek(usize::MAX);
        assert_eq!(playback.frame().state.values(), vec![1, 2, 3]);
        assert_eq!(playback.progress(), 1.0);
    }

    #[test]
    fn status_conversion() {
        let mut playback = playback();
        playback.seek(3);
        playback.set_speed(PlaybackSpeed::Double);

        let status: PlaybackStatus = (&playback).into();
        assert_eq!(status.current_index, 3);
        assert_eq!(status.total_steps, playback.total_steps());
        assert_eq!(status.speed, PlaybackSpeed::Double);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "stopped");
    }
}
