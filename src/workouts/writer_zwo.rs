//! Zwift workout (.zwo) file writer.
//!
//! Two entry points share one element writer: [`write_zwo`] for a playable
//! [`Workout`] and [`write_plan`] for an authored [`WorkoutPlan`].

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::workouts::builder::{IntervalDescriptor, WorkoutPlan};
use crate::workouts::types::{PowerRange, Segment, SegmentKind, Workout, WorkoutParseError};

const BUILDER_AUTHOR: &str = "You";
const BUILDER_NAME: &str = "Custom Workout";

/// One child of `<workout>`.
#[derive(Debug, Clone, PartialEq)]
enum ZwoElement {
    Warmup {
        duration: f64,
        low: f64,
        high: f64,
    },
    Cooldown {
        duration: f64,
        low: f64,
        high: f64,
    },
    SteadyState {
        duration: f64,
        power: f64,
    },
    FreeRide {
        duration: f64,
    },
    IntervalsT {
        repeat: u32,
        on_duration: f64,
        off_duration: f64,
        on_power: f64,
        off_power: f64,
    },
}

impl ZwoElement {
    fn to_bytes_start(&self) -> BytesStart<'static> {
        match self {
            ZwoElement::Warmup {
                duration,
                low,
                high,
            } => ramp_element("Warmup", *duration, *low, *high),
            ZwoElement::Cooldown {
                duration,
                low,
                high,
            } => ramp_element("Cooldown", *duration, *low, *high),
            ZwoElement::SteadyState { duration, power } => {
                let mut elem = BytesStart::new("SteadyState");
                elem.push_attribute(("Duration", format_duration(*duration).as_str()));
                elem.push_attribute(("Power", format_power(*power).as_str()));
                elem
            }
            ZwoElement::FreeRide { duration } => {
                let mut elem = BytesStart::new("FreeRide");
                elem.push_attribute(("Duration", format_duration(*duration).as_str()));
                elem
            }
            ZwoElement::IntervalsT {
                repeat,
                on_duration,
                off_duration,
                on_power,
                off_power,
            } => {
                let mut elem = BytesStart::new("IntervalsT");
                elem.push_attribute(("Repeat", repeat.to_string().as_str()));
                elem.push_attribute(("OnDuration", format_duration(*on_duration).as_str()));
                elem.push_attribute(("OffDuration", format_duration(*off_duration).as_str()));
                elem.push_attribute(("OnPower", format_power(*on_power).as_str()));
                elem.push_attribute(("OffPower", format_power(*off_power).as_str()));
                elem
            }
        }
    }
}

fn ramp_element(name: &'static str, duration: f64, low: f64, high: f64) -> BytesStart<'static> {
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("Duration", format_duration(duration).as_str()));
    elem.push_attribute(("PowerLow", format_power(low).as_str()));
    elem.push_attribute(("PowerHigh", format_power(high).as_str()));
    elem
}

/// Shortest decimal that reads back to the same value (`300`, `2.5`).
fn format_duration(seconds: f64) -> String {
    format!("{}", seconds)
}

/// Two decimals (`0.75`).
fn format_power(fraction: f64) -> String {
    format!("{:.2}", fraction)
}

/// Serialize a workout to ZWO XML.
///
/// Runs of interval pairs numbered 1..n with matching parameters are written
/// back as a single `IntervalsT`.
pub fn write_zwo(workout: &Workout) -> Result<String, WorkoutParseError> {
    let elements = elements_from_segments(workout.segments());
    write_document(
        workout.author(),
        workout.name(),
        Some(workout.description()),
        &elements,
    )
}

/// Serialize an authored plan to ZWO XML.
///
/// Empty author and name fall back to "You" and "Custom Workout"; an empty
/// description is left out.
pub fn write_plan(plan: &WorkoutPlan) -> Result<String, WorkoutParseError> {
    let author = non_empty_or(&plan.author, BUILDER_AUTHOR);
    let name = non_empty_or(&plan.name, BUILDER_NAME);
    let description = Some(plan.description.trim()).filter(|d| !d.is_empty());

    let elements: Vec<ZwoElement> = plan
        .intervals
        .iter()
        .flat_map(elements_from_descriptor)
        .collect();

    write_document(author, name, description, &elements)
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

fn elements_from_descriptor(descriptor: &IntervalDescriptor) -> Vec<ZwoElement> {
    match descriptor {
        IntervalDescriptor::Warmup {
            duration_sec,
            start,
            end,
        } => vec![ZwoElement::Warmup {
            duration: *duration_sec,
            low: *start,
            high: *end,
        }],
        IntervalDescriptor::Cooldown {
            duration_sec,
            start,
            end,
        } => vec![ZwoElement::Cooldown {
            duration: *duration_sec,
            low: *end,
            high: *start,
        }],
        IntervalDescriptor::Steady {
            duration_sec,
            power,
            ..
        } => vec![ZwoElement::SteadyState {
            duration: *duration_sec,
            power: *power,
        }],
        IntervalDescriptor::FreeRide { duration_sec, .. } => vec![ZwoElement::FreeRide {
            duration: *duration_sec,
        }],
        IntervalDescriptor::IntervalBlock {
            repeat,
            on_duration_sec,
            off_duration_sec,
            on_power,
            off_power,
            ..
        } => vec![ZwoElement::IntervalsT {
            repeat: *repeat,
            on_duration: *on_duration_sec,
            off_duration: *off_duration_sec,
            on_power: *on_power,
            off_power: *off_power,
        }],
        IntervalDescriptor::RampSteps {
            start,
            step,
            steps,
            step_duration_sec,
            ..
        } => (0..*steps)
            .map(|i| ZwoElement::SteadyState {
                duration: *step_duration_sec,
                power: IntervalDescriptor::step_power(*start, *step, i),
            })
            .collect(),
        IntervalDescriptor::Unknown => Vec::new(),
    }
}

fn elements_from_segments(segments: &[Segment]) -> Vec<ZwoElement> {
    let mut elements = Vec::with_capacity(segments.len());
    let mut i = 0;

    while i < segments.len() {
        let segment = &segments[i];

        if let Some((element, consumed)) = collect_interval_run(&segments[i..]) {
            elements.push(element);
            i += consumed;
            continue;
        }

        let element = match (segment.kind, segment.power) {
            (_, None) => ZwoElement::FreeRide {
                duration: segment.duration_sec,
            },
            (SegmentKind::Warmup, Some(range)) => ZwoElement::Warmup {
                duration: segment.duration_sec,
                low: range.start,
                high: range.end,
            },
            (SegmentKind::Cooldown, Some(range)) => ZwoElement::Cooldown {
                duration: segment.duration_sec,
                low: range.end,
                high: range.start,
            },
            (_, Some(range)) if range.is_flat() => ZwoElement::SteadyState {
                duration: segment.duration_sec,
                power: range.start,
            },
            // A ramp on any other kind keeps its direction
            (_, Some(range)) if range.start <= range.end => ZwoElement::Warmup {
                duration: segment.duration_sec,
                low: range.start,
                high: range.end,
            },
            (_, Some(range)) => ZwoElement::Cooldown {
                duration: segment.duration_sec,
                low: range.end,
                high: range.start,
            },
        };
        elements.push(element);
        i += 1;
    }

    elements
}

/// Collapse a run of `IntervalOn{1}, IntervalOff{1}, IntervalOn{2}, ...` with
/// identical durations and flat powers. Returns the element and the number of
/// segments it covers, or `None` when `segments` does not start such a run.
fn collect_interval_run(segments: &[Segment]) -> Option<(ZwoElement, usize)> {
    let (first_on, first_off) = match segments {
        [on, off, ..] => (on, off),
        _ => return None,
    };
    if first_on.kind != (SegmentKind::IntervalOn { repetition: 1 }) {
        return None;
    }
    let on_power = flat_power(first_on.power)?;
    let off_power = flat_power(first_off.power)?;

    let mut repeat = 0u32;
    for pair in segments.chunks_exact(2) {
        let expected = repeat + 1;
        let matches = pair[0].kind == (SegmentKind::IntervalOn { repetition: expected })
            && pair[1].kind == (SegmentKind::IntervalOff { repetition: expected })
            && pair[0].duration_sec == first_on.duration_sec
            && pair[1].duration_sec == first_off.duration_sec
            && flat_power(pair[0].power) == Some(on_power)
            && flat_power(pair[1].power) == Some(off_power);
        if !matches {
            break;
        }
        repeat = expected;
    }

    if repeat == 0 {
        return None;
    }

    Some((
        ZwoElement::IntervalsT {
            repeat,
            on_duration: first_on.duration_sec,
            off_duration: first_off.duration_sec,
            on_power,
            off_power,
        },
        repeat as usize * 2,
    ))
}

fn flat_power(power: Option<PowerRange>) -> Option<f64> {
    power.filter(|range| range.is_flat()).map(|range| range.start)
}

fn write_document(
    author: &str,
    name: &str,
    description: Option<&str>,
    elements: &[ZwoElement],
) -> Result<String, WorkoutParseError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("workout_file")))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;

    write_element(&mut writer, "author", author)?;
    write_element(&mut writer, "name", name)?;
    if let Some(description) = description {
        write_element(&mut writer, "description", description)?;
    }

    writer
        .write_event(Event::Start(BytesStart::new("workout")))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;

    for element in elements {
        writer
            .write_event(Event::Empty(element.to_bytes_start()))
            .map_err(|e| WorkoutParseError::Write(e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("workout")))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new("workout_file")))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| WorkoutParseError::Write(e.to_string()))
}

/// Write a simple text element.
fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), WorkoutParseError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| WorkoutParseError::Write(e.to_string()))?;
    Ok(())
}
