//! Authored workout plans and their expansion into playable segments.
//!
//! A [`WorkoutPlan`] is what the library and the builder deal in: a handful of
//! high-level [`IntervalDescriptor`]s. [`expand`] lowers them into the flat
//! [`Segment`] list the playback engine consumes.

use serde::{Deserialize, Serialize};

use crate::workouts::format::percent;
use crate::workouts::types::{Segment, SegmentKind, Workout};

/// High-level authoring unit. Expands to one or more segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntervalDescriptor {
    /// Ramp from `start` up to `end`
    Warmup { duration_sec: f64, start: f64, end: f64 },
    /// Ramp from `start` (high) down to `end` (low)
    Cooldown { duration_sec: f64, start: f64, end: f64 },
    /// Flat power
    Steady {
        duration_sec: f64,
        power: f64,
        #[serde(default)]
        label: Option<String>,
    },
    /// No ERG target
    #[serde(alias = "freeride")]
    FreeRide {
        duration_sec: f64,
        #[serde(default)]
        label: Option<String>,
    },
    /// `repeat` on/off pairs
    #[serde(alias = "intervalBlock")]
    IntervalBlock {
        repeat: u32,
        on_duration_sec: f64,
        off_duration_sec: f64,
        on_power: f64,
        off_power: f64,
        #[serde(default)]
        label: Option<String>,
    },
    /// Ladder of `steps` flat blocks, each `step` higher than the last
    #[serde(alias = "rampSteps")]
    RampSteps {
        start: f64,
        step: f64,
        steps: u32,
        step_duration_sec: f64,
        #[serde(default)]
        label: Option<String>,
    },
    /// Anything this version does not know how to expand
    #[serde(other)]
    Unknown,
}

impl IntervalDescriptor {
    /// One-line description, e.g. `"3 x 480s @ 92% / 180s @ 60%"`.
    pub fn describe(&self) -> String {
        match self {
            IntervalDescriptor::Warmup {
                duration_sec,
                start,
                end,
            }
            | IntervalDescriptor::Cooldown {
                duration_sec,
                start,
                end,
            } => format!(
                "{}s ramp {}% → {}%",
                duration_sec,
                percent(*start),
                percent(*end)
            ),
            IntervalDescriptor::Steady {
                duration_sec,
                power,
                ..
            } => format!("{}s @ {}%", duration_sec, percent(*power)),
            IntervalDescriptor::FreeRide { duration_sec, .. } => {
                format!("{}s free ride", duration_sec)
            }
            IntervalDescriptor::IntervalBlock {
                repeat,
                on_duration_sec,
                off_duration_sec,
                on_power,
                off_power,
                ..
            } => format!(
                "{} x {}s @ {}% / {}s @ {}%",
                repeat,
                on_duration_sec,
                percent(*on_power),
                off_duration_sec,
                percent(*off_power)
            ),
            IntervalDescriptor::RampSteps {
                start,
                step,
                steps,
                step_duration_sec,
                ..
            } => format!(
                "{} x {}s from {}% (+{}% per step)",
                steps,
                step_duration_sec,
                percent(*start),
                percent(*step)
            ),
            IntervalDescriptor::Unknown => String::new(),
        }
    }

    /// Power of step `i` of a ramp ladder.
    pub(crate) fn step_power(start: f64, step: f64, i: u32) -> f64 {
        start + step * i as f64
    }
}

/// Lower descriptors into playable segments, preserving order.
///
/// Unknown descriptors produce nothing.
pub fn expand(descriptors: &[IntervalDescriptor]) -> Vec<Segment> {
    let mut segments = Vec::new();

    for descriptor in descriptors {
        match descriptor {
            IntervalDescriptor::Warmup {
                duration_sec,
                start,
                end,
            } => segments.push(Segment::ramp(
                SegmentKind::Warmup,
                "Warmup",
                *duration_sec,
                *start,
                *end,
            )),
            IntervalDescriptor::Cooldown {
                duration_sec,
                start,
                end,
            } => segments.push(Segment::ramp(
                SegmentKind::Cooldown,
                "Cooldown",
                *duration_sec,
                *start,
                *end,
            )),
            IntervalDescriptor::Steady {
                duration_sec,
                power,
                label,
            } => segments.push(Segment::steady(
                SegmentKind::SteadyState,
                label.as_deref().unwrap_or("Steady"),
                *duration_sec,
                *power,
            )),
            IntervalDescriptor::FreeRide {
                duration_sec,
                label,
            } => segments.push(Segment::free_ride(
                label.as_deref().unwrap_or("Free ride"),
                *duration_sec,
            )),
            IntervalDescriptor::IntervalBlock {
                repeat,
                on_duration_sec,
                off_duration_sec,
                on_power,
                off_power,
                label,
            } => {
                let on_label = label.as_deref().unwrap_or("On");
                for i in 1..=*repeat {
                    segments.push(Segment::steady(
                        SegmentKind::IntervalOn { repetition: i },
                        format!("{} {}", on_label, i),
                        *on_duration_sec,
                        *on_power,
                    ));
                    segments.push(Segment::steady(
                        SegmentKind::IntervalOff { repetition: i },
                        "Recover",
                        *off_duration_sec,
                        *off_power,
                    ));
                }
            }
            IntervalDescriptor::RampSteps {
                start,
                step,
                steps,
                step_duration_sec,
                label,
            } => {
                let ramp_label = label.as_deref().unwrap_or("Ramp");
                for i in 0..*steps {
                    let power = IntervalDescriptor::step_power(*start, *step, i);
                    segments.push(Segment::steady(
                        SegmentKind::RampStep,
                        format!("{} {}%", ramp_label, percent(power)),
                        *step_duration_sec,
                        power,
                    ));
                }
            }
            IntervalDescriptor::Unknown => {
                tracing::trace!("Skipping unknown interval descriptor");
            }
        }
    }

    segments
}

/// An authored workout: metadata plus interval descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Stable identifier (library slug)
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Training focus, e.g. "Sweet spot / tempo"
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub intervals: Vec<IntervalDescriptor>,
}

impl WorkoutPlan {
    /// Create an empty plan.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            author: String::new(),
            description: String::new(),
            focus: String::new(),
            intervals: Vec::new(),
        }
    }

    /// Append a descriptor.
    pub fn with_interval(mut self, interval: IntervalDescriptor) -> Self {
        self.intervals.push(interval);
        self
    }

    /// Parse a plan from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, PlanError> {
        toml::from_str(content).map_err(|e| PlanError::Parse(e.to_string()))
    }

    /// Parse a plan from JSON.
    pub fn from_json_str(content: &str) -> Result<Self, PlanError> {
        serde_json::from_str(content).map_err(|e| PlanError::Parse(e.to_string()))
    }

    /// Load a plan file, picking the format from the extension (`.json`, otherwise TOML).
    pub fn from_file(path: &std::path::Path) -> Result<Self, PlanError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PlanError::Io(e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Expand into playable segments.
    pub fn segments(&self) -> Vec<Segment> {
        expand(&self.intervals)
    }

    /// Expand into a playable workout.
    pub fn to_workout(&self) -> Workout {
        Workout::new(
            self.name.clone(),
            self.author.clone(),
            self.description.clone(),
            self.segments(),
        )
    }
}

/// Errors loading a plan file.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
