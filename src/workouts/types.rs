//! Workout types and enums.
//!
//! A [`Workout`] is the flat, playable form of a training session: an ordered list of
//! timed [`Segment`]s whose power is expressed as a fraction of FTP.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a segment came from.
///
/// Only serialization cares about the kind; playback and target math treat every
/// segment the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Gradual power increase
    Warmup,
    /// Gradual power decrease
    Cooldown,
    /// Constant power
    SteadyState,
    /// No ERG target
    FreeRide,
    /// "On" half of a repeated block (1-based repetition)
    IntervalOn { repetition: u32 },
    /// "Off" half of a repeated block (1-based repetition)
    IntervalOff { repetition: u32 },
    /// One flat step of a ramp ladder
    RampStep,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Warmup => write!(f, "Warmup"),
            SegmentKind::Cooldown => write!(f, "Cooldown"),
            SegmentKind::SteadyState => write!(f, "Steady State"),
            SegmentKind::FreeRide => write!(f, "Free Ride"),
            SegmentKind::IntervalOn { .. } => write!(f, "Interval On"),
            SegmentKind::IntervalOff { .. } => write!(f, "Interval Off"),
            SegmentKind::RampStep => write!(f, "Ramp Step"),
        }
    }
}

/// Linear power target, as fractions of FTP (1.0 = 100% FTP).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerRange {
    pub start: f64,
    pub end: f64,
}

impl PowerRange {
    /// Flat power.
    pub fn flat(power: f64) -> Self {
        Self {
            start: power,
            end: power,
        }
    }

    /// Ramp from `start` to `end`.
    pub fn ramp(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn is_flat(&self) -> bool {
        self.start == self.end
    }
}

/// A single timed block within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Duration in seconds
    pub duration_sec: f64,
    /// Power target; `None` is a free ride (ERG off)
    pub power: Option<PowerRange>,
    /// Display name
    pub label: String,
}

impl Segment {
    /// Create a flat-power segment.
    pub fn steady(kind: SegmentKind, label: impl Into<String>, duration_sec: f64, power: f64) -> Self {
        Self {
            kind,
            duration_sec,
            power: Some(PowerRange::flat(power)),
            label: label.into(),
        }
    }

    /// Create a ramp segment going from `start` to `end`.
    pub fn ramp(
        kind: SegmentKind,
        label: impl Into<String>,
        duration_sec: f64,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            kind,
            duration_sec,
            power: Some(PowerRange::ramp(start, end)),
            label: label.into(),
        }
    }

    /// Create a free ride segment.
    pub fn free_ride(label: impl Into<String>, duration_sec: f64) -> Self {
        Self {
            kind: SegmentKind::FreeRide,
            duration_sec,
            power: None,
            label: label.into(),
        }
    }

    pub fn is_free_ride(&self) -> bool {
        self.power.is_none()
    }
}

/// Sum of segment durations in seconds. Zero for an empty slice.
pub fn total_duration(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.duration_sec).sum()
}

/// A structured training workout.
///
/// Immutable once built. Loading a different workout replaces the whole value.
/// Only [`Workout::new`] constructs one, so the cached total always matches the
/// segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    name: String,
    author: String,
    description: String,
    segments: Vec<Segment>,
    total_duration_sec: f64,
}

impl Workout {
    /// Create a workout, computing its total duration.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Self {
        let total_duration_sec = total_duration(&segments);
        Self {
            name: name.into(),
            author: author.into(),
            description: description.into(),
            segments,
            total_duration_sec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total workout duration in seconds.
    pub fn total_duration_sec(&self) -> f64 {
        self.total_duration_sec
    }

    /// Seconds from workout start to the beginning of segment `index`.
    pub fn offset_of(&self, index: usize) -> f64 {
        total_duration(&self.segments[..index.min(self.segments.len())])
    }
}

/// Errors related to workout operations.
#[derive(Debug, Error)]
pub enum WorkoutError {
    /// No workout loaded
    #[error("No workout loaded")]
    NoWorkoutLoaded,

    /// Workout parsing failed
    #[error("Could not read workout: {0}")]
    Parse(#[from] WorkoutParseError),

    /// Pending workout slot could not be read or cleared
    #[error("Pending workout error: {0}")]
    Handoff(#[from] crate::workouts::handoff::HandoffError),

    /// Library lookup failed
    #[error("Workout not found: {0}")]
    NotFound(String),
}

/// Errors while reading or writing workout files.
#[derive(Debug, Error)]
pub enum WorkoutParseError {
    /// Document is not well-formed XML
    #[error("File is not valid XML: {0}")]
    InvalidXml(String),

    /// No `<workout>` element
    #[error("Could not find <workout> section")]
    MissingWorkout,

    /// Workout element produced no segments
    #[error("No intervals found in workout")]
    EmptyWorkout,

    /// IO error reading file
    #[error("IO error: {0}")]
    Io(String),

    /// XML writer failure
    #[error("Failed to write workout: {0}")]
    Write(String),
}
