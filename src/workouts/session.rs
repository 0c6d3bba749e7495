//! A ride in progress: playback clock, live power and the rider's FTP.
//!
//! [`RideSession::view`] flattens all three into the numbers and strings the
//! player screen shows. Power readings only feed the view; they never move the
//! clock.

use crate::sensors::sink::PowerSink;
use crate::workouts::engine::{PlaybackClock, PlaybackStatus};
use crate::workouts::format::{format_time, power_text};
use crate::workouts::handoff::HandoffSlot;
use crate::workouts::parser_zwo::parse_zwo;
use crate::workouts::target::TargetBand;
use crate::workouts::ticker::{MonotonicTicks, TickSource};
use crate::workouts::types::{Workout, WorkoutError};

const PLACEHOLDER: &str = "—";

/// Snapshot of the player screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Workout name
    pub title: String,
    pub status: PlaybackStatus,
    /// Current segment label, "Complete" once finished
    pub segment_label: String,
    /// Current target, e.g. "225 W (90% FTP)"
    pub power_label: String,
    /// Live power, e.g. "231 W"
    pub actual_label: String,
    /// "elapsed / total"
    pub time_label: String,
    /// Whole-workout progress, 0-100
    pub progress_pct: i64,
    /// Target range of the current segment
    pub range_label: String,
    pub hint: String,
    pub band: TargetBand,
    /// Highlighted row in the segment list
    pub active_segment: Option<usize>,
}

/// Playback clock plus live power for one rider.
pub struct RideSession<T: TickSource = MonotonicTicks> {
    clock: PlaybackClock<T>,
    power: PowerSink,
    ftp: u16,
}

impl RideSession<MonotonicTicks> {
    /// Session on wall-clock time.
    pub fn new(power: PowerSink, ftp: u16) -> Self {
        Self::with_clock(PlaybackClock::new(), power, ftp)
    }
}

impl<T: TickSource> RideSession<T> {
    pub fn with_clock(clock: PlaybackClock<T>, power: PowerSink, ftp: u16) -> Self {
        Self { clock, power, ftp }
    }

    /// Parse and load a ZWO document. On error the current workout stays loaded.
    pub fn load_xml(&mut self, xml: &str) -> Result<(), WorkoutError> {
        let workout = parse_zwo(xml)?;
        self.load_workout(workout);
        Ok(())
    }

    pub fn load_workout(&mut self, workout: Workout) {
        self.clock.load(workout);
    }

    /// Load whatever is waiting in `slot`, returning its name.
    ///
    /// The slot is emptied whether or not its content loads.
    pub fn load_pending(&mut self, slot: &HandoffSlot) -> Result<Option<String>, WorkoutError> {
        let Some(pending) = slot.take()? else {
            return Ok(None);
        };

        match self.load_xml(&pending.xml) {
            Ok(()) => {
                tracing::info!("Loaded pending workout '{}'", pending.name);
                Ok(Some(pending.name))
            }
            Err(e) => {
                tracing::warn!("Pending workout '{}' could not be loaded: {}", pending.name, e);
                Err(e)
            }
        }
    }

    /// FTP in watts; 0 means unset.
    pub fn set_ftp(&mut self, ftp: u16) {
        self.ftp = ftp;
    }

    pub fn ftp(&self) -> u16 {
        self.ftp
    }

    pub fn clock(&self) -> &PlaybackClock<T> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut PlaybackClock<T> {
        &mut self.clock
    }

    pub fn power(&self) -> &PowerSink {
        &self.power
    }

    /// Current player screen.
    pub fn view(&self) -> SessionView {
        let actual = self.power.latest_watts();
        let status = self.clock.status();

        let workout = match self.clock.workout() {
            Some(workout) if status != PlaybackStatus::Finished => workout,
            workout => {
                let finished = status == PlaybackStatus::Finished;
                let total = format_time(workout.map(Workout::total_duration_sec).unwrap_or(0.0));
                return SessionView {
                    title: workout
                        .map(|w| w.name().to_string())
                        .unwrap_or_else(|| "No workout loaded".to_string()),
                    status,
                    segment_label: (if finished { "Complete" } else { PLACEHOLDER }).to_string(),
                    power_label: PLACEHOLDER.to_string(),
                    actual_label: PLACEHOLDER.to_string(),
                    time_label: if finished {
                        format!("{} / {}", total, total)
                    } else {
                        "00:00 / 00:00".to_string()
                    },
                    progress_pct: if finished { 100 } else { 0 },
                    range_label: "No target loaded".to_string(),
                    hint: "Import a workout and set FTP to see target ranges.".to_string(),
                    band: TargetBand::layout(None, actual, self.ftp),
                    active_segment: None,
                };
            }
        };

        let state = self.clock.state();
        let target = self.clock.current_target(self.ftp);
        let segment = self.clock.current_segment();

        SessionView {
            title: workout.name().to_string(),
            status,
            segment_label: segment.map(|s| s.label.clone()).unwrap_or_default(),
            power_label: match (&target, segment) {
                (Some(target), _) => target.current_label(self.ftp),
                (None, Some(segment)) => power_text(segment),
                (None, None) => PLACEHOLDER.to_string(),
            },
            actual_label: actual
                .map(|w| format!("{} W", w))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            time_label: format!(
                "{} / {}",
                format_time(state.total_elapsed),
                format_time(workout.total_duration_sec())
            ),
            progress_pct: (self.clock.progress() * 100.0).round() as i64,
            range_label: target
                .as_ref()
                .map(|t| t.range_label())
                .unwrap_or_else(|| "Free ride / ERG off".to_string()),
            hint: (if self.ftp > 0 {
                "Aim to keep the indicator within the green band."
            } else {
                "Enter your FTP to translate % targets into watts."
            })
            .to_string(),
            band: TargetBand::layout(target.as_ref(), actual, self.ftp),
            active_segment: Some(state.segment_index),
        }
    }
}
