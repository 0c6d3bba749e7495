//! Built-in workout library.
//!
//! A fixed set of authored plans. Plans are handed to the player through the
//! pending-workout slot as ZWO XML, the same path an imported file takes.

use crate::workouts::builder::{IntervalDescriptor, WorkoutPlan};
use crate::workouts::format::{format_time, target_text};
use crate::workouts::handoff::HandoffSlot;
use crate::workouts::types::{total_duration, WorkoutError};
use crate::workouts::writer_zwo::write_plan;

const LIBRARY_AUTHOR: &str = "CycleTraining Library";

/// Demo workout played when nothing else is queued.
pub const SAMPLE_ZWO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workout_file>
  <author>CycleTraining Demo</author>
  <name>Sweet Spot Sampler</name>
  <description>Quick sampler with warmup, sweet spot repeats, and cooldown.</description>
  <workout>
    <Warmup Duration="300" PowerLow="0.55" PowerHigh="0.75" />
    <SteadyState Duration="240" Power="0.9" />
    <IntervalsT Repeat="3" OnDuration="180" OffDuration="90" OnPower="0.95" OffPower="0.6" />
    <SteadyState Duration="240" Power="0.88" />
    <Cooldown Duration="240" PowerLow="0.45" PowerHigh="0.75" />
  </workout>
</workout_file>"#;

fn plan(
    id: &str,
    name: &str,
    focus: &str,
    description: &str,
    intervals: Vec<IntervalDescriptor>,
) -> WorkoutPlan {
    WorkoutPlan {
        id: id.to_string(),
        name: name.to_string(),
        author: LIBRARY_AUTHOR.to_string(),
        description: description.to_string(),
        focus: focus.to_string(),
        intervals,
    }
}

fn warmup(duration_sec: f64, start: f64, end: f64) -> IntervalDescriptor {
    IntervalDescriptor::Warmup {
        duration_sec,
        start,
        end,
    }
}

fn cooldown(duration_sec: f64, start: f64, end: f64) -> IntervalDescriptor {
    IntervalDescriptor::Cooldown {
        duration_sec,
        start,
        end,
    }
}

fn steady(duration_sec: f64, power: f64, label: &str) -> IntervalDescriptor {
    IntervalDescriptor::Steady {
        duration_sec,
        power,
        label: Some(label.to_string()),
    }
}

fn interval_block(
    repeat: u32,
    on_duration_sec: f64,
    off_duration_sec: f64,
    on_power: f64,
    off_power: f64,
    label: &str,
) -> IntervalDescriptor {
    IntervalDescriptor::IntervalBlock {
        repeat,
        on_duration_sec,
        off_duration_sec,
        on_power,
        off_power,
        label: Some(label.to_string()),
    }
}

/// All library workouts, in display order.
pub fn all() -> Vec<WorkoutPlan> {
    vec![
        plan(
            "sweet-spot-3x8",
            "Sweet Spot 3x8",
            "Sweet spot / tempo",
            "Sub-threshold builder with three 8-minute efforts and a gentle cool down.",
            vec![
                warmup(360.0, 0.55, 0.75),
                steady(300.0, 0.88, "Settle"),
                interval_block(3, 480.0, 180.0, 0.92, 0.6, "Sweet spot repeats"),
                steady(240.0, 0.85, "Tempo flush"),
                cooldown(300.0, 0.75, 0.5),
            ],
        ),
        plan(
            "vo2-6x2",
            "VO₂ Max 6x2",
            "High intensity",
            "Short-sharp aerobic power with matched recoveries.",
            vec![
                warmup(420.0, 0.5, 0.8),
                steady(300.0, 0.88, "Prime"),
                interval_block(6, 120.0, 120.0, 1.15, 0.55, "VO₂ repeats"),
                IntervalDescriptor::FreeRide {
                    duration_sec: 120.0,
                    label: Some("Free spin".to_string()),
                },
                cooldown(300.0, 0.75, 0.5),
            ],
        ),
        plan(
            "endurance-cruise",
            "Endurance Cruise",
            "Endurance",
            "Aerobic time-in-zone with short tempo lifts.",
            vec![
                warmup(300.0, 0.55, 0.7),
                steady(1200.0, 0.75, "Endurance"),
                interval_block(3, 300.0, 180.0, 0.85, 0.7, "Tempo lifts"),
                steady(600.0, 0.78, "Aerobic finish"),
                cooldown(300.0, 0.7, 0.5),
            ],
        ),
        plan(
            "ftp-ramp-test",
            "FTP Ramp Test",
            "Assessment",
            "Classic 1-minute steps. Stop when you fail a step; last full minute x 0.75 ≈ FTP.",
            vec![
                warmup(420.0, 0.5, 0.75),
                steady(180.0, 0.8, "Settle in"),
                IntervalDescriptor::RampSteps {
                    start: 0.8,
                    step: 0.05,
                    steps: 12,
                    step_duration_sec: 60.0,
                    label: Some("Ramp".to_string()),
                },
                cooldown(420.0, 0.7, 0.45),
            ],
        ),
    ]
}

/// Look up a library workout by id.
pub fn find(id: &str) -> Option<WorkoutPlan> {
    all().into_iter().find(|plan| plan.id == id)
}

/// `"{focus} • {mm:ss} • {target}"`, where the target describes the first
/// segment with a power target.
pub fn summary_line(plan: &WorkoutPlan, ftp: u16) -> String {
    let segments = plan.segments();
    let main = segments
        .iter()
        .find(|s| !s.is_free_ride())
        .or_else(|| segments.first());
    let text = match main {
        Some(segment) => target_text(segment, ftp),
        None => "Free ride".to_string(),
    };

    format!(
        "{} • {} • {}",
        plan.focus,
        format_time(total_duration(&segments)),
        text
    )
}

/// Write the library workout `id` into the pending slot for the player.
pub fn queue(id: &str, slot: &HandoffSlot) -> Result<WorkoutPlan, WorkoutError> {
    let plan = find(id).ok_or_else(|| WorkoutError::NotFound(id.to_string()))?;
    let xml = write_plan(&plan)?;
    slot.queue(&plan.name, &xml)?;

    tracing::info!("Queued library workout '{}' for the player", plan.name);
    Ok(plan)
}
