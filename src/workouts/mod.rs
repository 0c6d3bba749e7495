//! Workout module for structured training sessions.

pub mod builder;
pub mod engine;
pub mod format;
pub mod handoff;
pub mod library;
pub mod parser_zwo;
pub mod session;
pub mod target;
pub mod ticker;
pub mod types;
pub mod writer_zwo;

pub use builder::{expand, IntervalDescriptor, PlanError, WorkoutPlan};
pub use engine::{PlaybackClock, PlaybackState, PlaybackStatus, TickOutcome};
pub use handoff::{HandoffError, HandoffSlot, PendingWorkout};
pub use parser_zwo::{parse_zwo, parse_zwo_file};
pub use session::{RideSession, SessionView};
pub use target::{compute_target, Target, TargetBand};
pub use ticker::{ManualTicks, MonotonicTicks, TickSource};
pub use types::{
    total_duration, PowerRange, Segment, SegmentKind, Workout, WorkoutError, WorkoutParseError,
};
pub use writer_zwo::{write_plan, write_zwo};
