//! Workout playback engine.
//!
//! [`PlaybackClock`] owns the loaded [`Workout`] and the single [`PlaybackState`] of a
//! ride. Time only moves forward through [`PlaybackClock::tick`] (an explicit delta) or
//! [`PlaybackClock::poll`] (a delta read from the injected [`TickSource`]).
//!
//! State machine:
//!
//! ```text
//! Idle ──start──▶ Running ◀──start── Paused
//!                   │  └────pause────▶  ▲
//!                   │                   │ seek
//!                   └──last segment──▶ Finished
//! ```
//!
//! `reset` returns to `Idle` from anywhere.

use crate::workouts::target::{compute_target, Target};
use crate::workouts::ticker::{MonotonicTicks, TickSource};
use crate::workouts::types::{Segment, Workout, WorkoutError};

/// Current status of workout playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Loaded, not started (or reset)
    #[default]
    Idle,
    /// Clock advancing
    Running,
    /// Clock frozen
    Paused,
    /// Ran past the last segment
    Finished,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "Idle"),
            PlaybackStatus::Running => write!(f, "Running"),
            PlaybackStatus::Paused => write!(f, "Paused"),
            PlaybackStatus::Finished => write!(f, "Finished"),
        }
    }
}

/// Position of the rider within the workout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Index into the workout's segments; equals the segment count once finished
    pub segment_index: usize,
    /// Seconds spent in the current segment
    pub elapsed_in_segment: f64,
    /// Seconds since workout start
    pub total_elapsed: f64,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Number of segment boundaries crossed
    pub segments_advanced: usize,
    /// The tick moved the workout to `Finished`
    pub finished: bool,
}

/// Real-time playback state machine.
pub struct PlaybackClock<T: TickSource = MonotonicTicks> {
    workout: Option<Workout>,
    state: PlaybackState,
    ticks: T,
    /// Tick-source reading at the last start, seek or poll while running
    last_tick: Option<f64>,
}

impl PlaybackClock<MonotonicTicks> {
    /// Create a clock driven by wall time.
    pub fn new() -> Self {
        Self::with_ticks(MonotonicTicks::new())
    }
}

impl Default for PlaybackClock<MonotonicTicks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TickSource> PlaybackClock<T> {
    /// Create a clock driven by the given tick source.
    pub fn with_ticks(ticks: T) -> Self {
        Self {
            workout: None,
            state: PlaybackState::default(),
            ticks,
            last_tick: None,
        }
    }

    /// Load a workout, replacing any previous one, and reset to idle.
    pub fn load(&mut self, workout: Workout) {
        tracing::info!(
            "Workout loaded: {} ({} segments, {:.0}s)",
            workout.name(),
            workout.len(),
            workout.total_duration_sec()
        );
        self.workout = Some(workout);
        self.reset();
    }

    /// Start or resume playback.
    ///
    /// Starting an already running clock does nothing. Starting from `Finished`
    /// resumes at the current index; the next tick finishes again unless a seek
    /// moved the rider back.
    pub fn start(&mut self) -> Result<(), WorkoutError> {
        if self.workout.is_none() {
            return Err(WorkoutError::NoWorkoutLoaded);
        }

        if self.state.status == PlaybackStatus::Running {
            tracing::debug!("Start ignored: already running");
            return Ok(());
        }

        self.state.status = PlaybackStatus::Running;
        self.last_tick = Some(self.ticks.now());
        tracing::info!("Workout started at segment {}", self.state.segment_index);
        Ok(())
    }

    /// Pause playback. Returns `false` (and does nothing) unless running.
    pub fn pause(&mut self) -> bool {
        if self.state.status != PlaybackStatus::Running {
            tracing::debug!("Pause ignored: status is {}", self.state.status);
            return false;
        }

        self.state.status = PlaybackStatus::Paused;
        self.last_tick = None;
        tracing::info!("Workout paused");
        true
    }

    /// Return to idle at the start of the workout.
    pub fn reset(&mut self) {
        self.state = PlaybackState::default();
        self.last_tick = None;
        tracing::debug!("Playback reset");
    }

    /// Jump to the start of segment `index`.
    ///
    /// Returns `false` (and does nothing) without a workout or for an out-of-range index.
    pub fn seek(&mut self, index: usize) -> bool {
        let Some(workout) = self.workout.as_ref() else {
            tracing::debug!("Seek ignored: no workout loaded");
            return false;
        };

        if index >= workout.len() {
            tracing::debug!("Seek ignored: index {} out of range", index);
            return false;
        }

        self.state.segment_index = index;
        self.state.elapsed_in_segment = 0.0;
        self.state.total_elapsed = workout.offset_of(index);

        match self.state.status {
            PlaybackStatus::Finished => self.state.status = PlaybackStatus::Paused,
            PlaybackStatus::Running => self.last_tick = Some(self.ticks.now()),
            PlaybackStatus::Idle | PlaybackStatus::Paused => {}
        }

        tracing::debug!("Seeked to segment {}", index);
        true
    }

    /// Advance by `delta_seconds`. Has no effect unless running.
    pub fn tick(&mut self, delta_seconds: f64) -> TickOutcome {
        if self.state.status != PlaybackStatus::Running {
            return TickOutcome::default();
        }

        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            tracing::debug!("Ignoring invalid tick delta {}", delta_seconds);
            return TickOutcome::default();
        }

        let Some(workout) = self.workout.as_ref() else {
            return TickOutcome::default();
        };

        let outcome = advance(&mut self.state, workout.segments(), delta_seconds);
        if outcome.finished {
            self.last_tick = None;
            tracing::info!("Workout completed");
        }
        outcome
    }

    /// Advance by the real time elapsed since the previous start, seek or poll.
    pub fn poll(&mut self) -> TickOutcome {
        if self.state.status != PlaybackStatus::Running {
            return TickOutcome::default();
        }

        let now = self.ticks.now();
        let delta = now - self.last_tick.unwrap_or(now);
        self.last_tick = Some(now);
        self.tick(delta)
    }

    /// Current playback state.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    /// The loaded workout, if any.
    pub fn workout(&self) -> Option<&Workout> {
        self.workout.as_ref()
    }

    pub fn has_workout(&self) -> bool {
        self.workout.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.state.status == PlaybackStatus::Finished
    }

    /// The segment being ridden. `None` without a workout or once past the end.
    pub fn current_segment(&self) -> Option<&Segment> {
        self.workout.as_ref()?.segment(self.state.segment_index)
    }

    /// Seconds left in the current segment.
    pub fn remaining_in_segment(&self) -> Option<f64> {
        self.current_segment()
            .map(|s| (s.duration_sec - self.state.elapsed_in_segment).max(0.0))
    }

    /// Fraction of the whole workout completed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        match self.workout.as_ref() {
            Some(w) if w.total_duration_sec() > 0.0 => {
                (self.state.total_elapsed / w.total_duration_sec()).min(1.0)
            }
            _ => 0.0,
        }
    }

    /// Target power at the current point, for the given FTP.
    pub fn current_target(&self, ftp: u16) -> Option<Target> {
        let segment = self.current_segment()?;
        compute_target(segment, self.state.elapsed_in_segment, ftp)
    }
}

/// Add `delta` to the counters and settle on the segment the rider is now in.
///
/// Overshoot past a boundary carries into the next segment, repeatedly, so a single
/// large delta can cross any number of short segments. Running past the last
/// segment finishes the workout without carrying the leftover anywhere.
fn advance(state: &mut PlaybackState, segments: &[Segment], delta: f64) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if state.segment_index >= segments.len() {
        state.status = PlaybackStatus::Finished;
        outcome.finished = true;
        return outcome;
    }

    state.elapsed_in_segment += delta;
    state.total_elapsed += delta;

    while let Some(segment) = segments.get(state.segment_index) {
        if state.elapsed_in_segment < segment.duration_sec {
            break;
        }

        let overshoot = state.elapsed_in_segment - segment.duration_sec;
        state.segment_index += 1;
        outcome.segments_advanced += 1;

        if state.segment_index >= segments.len() {
            state.elapsed_in_segment = 0.0;
            state.status = PlaybackStatus::Finished;
            outcome.finished = true;
            break;
        }

        state.elapsed_in_segment = overshoot;
        tracing::debug!("Transitioned to segment {}", state.segment_index);
    }

    outcome
}
