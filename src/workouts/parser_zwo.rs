//! Zwift workout (.zwo) file parser.
//!
//! ZWO files are XML documents with a `<workout_file>` root holding optional
//! `<name>`, `<author>` and `<description>` elements and one `<workout>` element.
//! Each direct child of `<workout>` becomes one or more segments.
//!
//! Parsing is lenient about content and strict about structure. Unknown elements
//! are skipped, and missing or non-numeric attributes read as 0. A document that
//! is not well-formed, has no `<workout>` or yields no segments is rejected as a
//! whole.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::workouts::types::{Segment, SegmentKind, Workout, WorkoutParseError};

const DEFAULT_NAME: &str = "Untitled Workout";
const DEFAULT_AUTHOR: &str = "Unknown author";

/// Upper bound on `IntervalsT Repeat`.
const MAX_REPEAT: u32 = 10_000;

/// Metadata element being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    Name,
    Author,
    Description,
}

impl MetaField {
    fn from_element(name: &str) -> Option<Self> {
        match name {
            "name" => Some(MetaField::Name),
            "author" => Some(MetaField::Author),
            "description" => Some(MetaField::Description),
            _ => None,
        }
    }
}

/// Untrimmed text of the first element of each kind.
#[derive(Debug, Default)]
struct Metadata {
    name: Option<String>,
    author: Option<String>,
    description: Option<String>,
}

impl Metadata {
    fn slot(&mut self, field: MetaField) -> &mut Option<String> {
        match field {
            MetaField::Name => &mut self.name,
            MetaField::Author => &mut self.author,
            MetaField::Description => &mut self.description,
        }
    }
}

/// Trimmed metadata text. An absent or empty element gives `default`; whitespace
/// only gives "".
fn resolve(raw: Option<String>, default: &str) -> String {
    match raw {
        Some(text) if !text.is_empty() => text.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Text of a metadata element, collected until its end tag at `depth`.
struct Capture {
    field: MetaField,
    depth: usize,
    text: String,
}

/// Parse a ZWO workout from XML content.
pub fn parse_zwo(content: &str) -> Result<Workout, WorkoutParseError> {
    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));
    // Text is kept whole so mixed content in metadata keeps its inner spacing
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut metadata = Metadata::default();
    let mut capture: Option<Capture> = None;
    let mut segments: Vec<Segment> = Vec::new();

    let mut open: Vec<String> = Vec::new();
    let mut roots = 0usize;
    // Depth at which direct children of the first <workout> element open
    let mut workout_children: Option<usize> = None;
    let mut workout_seen = false;

    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| WorkoutParseError::InvalidXml(format!("XML parsing error: {}", e)))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if open.is_empty() {
                    roots += 1;
                    if roots > 1 {
                        return Err(WorkoutParseError::InvalidXml(
                            "Document has more than one root element".to_string(),
                        ));
                    }
                }

                if workout_children == Some(open.len()) {
                    segments.extend(parse_segments(&name, e)?);
                } else if name == "workout" && !workout_seen {
                    workout_seen = true;
                    if !is_empty {
                        workout_children = Some(open.len() + 1);
                    }
                } else if capture.is_none() {
                    if let Some(field) = MetaField::from_element(&name) {
                        if metadata.slot(field).is_none() {
                            if is_empty {
                                *metadata.slot(field) = Some(String::new());
                            } else {
                                capture = Some(Capture {
                                    field,
                                    depth: open.len(),
                                    text: String::new(),
                                });
                            }
                        }
                    }
                }

                if !is_empty {
                    open.push(name);
                }
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match open.pop() {
                    Some(expected) if expected == name => {}
                    _ => {
                        return Err(WorkoutParseError::InvalidXml(format!(
                            "Unexpected closing tag </{}>",
                            name
                        )));
                    }
                }

                if workout_children == Some(open.len() + 1) {
                    workout_children = None;
                }

                if capture.as_ref().is_some_and(|c| c.depth == open.len()) {
                    if let Some(done) = capture.take() {
                        *metadata.slot(done.field) = Some(done.text);
                    }
                }
            }
            Event::Text(ref e) => {
                if open.is_empty() {
                    if e.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return Err(WorkoutParseError::InvalidXml(
                        "Text outside the root element".to_string(),
                    ));
                }
                if let Some(capture) = capture.as_mut() {
                    let text = e.unescape().map_err(|e| {
                        WorkoutParseError::InvalidXml(format!("Failed to unescape text: {}", e))
                    })?;
                    capture.text.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => {
                if let Some(unclosed) = open.last() {
                    return Err(WorkoutParseError::InvalidXml(format!(
                        "Unexpected end of document inside <{}>",
                        unclosed
                    )));
                }
                break;
            }
            _ => {}
        }
    }

    if roots == 0 {
        return Err(WorkoutParseError::InvalidXml(
            "Document has no root element".to_string(),
        ));
    }

    if !workout_seen {
        return Err(WorkoutParseError::MissingWorkout);
    }

    if segments.is_empty() {
        return Err(WorkoutParseError::EmptyWorkout);
    }

    Ok(Workout::new(
        resolve(metadata.name, DEFAULT_NAME),
        resolve(metadata.author, DEFAULT_AUTHOR),
        resolve(metadata.description, ""),
        segments,
    ))
}

/// Numeric attributes of a workout element. Absent or unreadable values are 0.
#[derive(Debug, Default)]
struct SegmentAttributes {
    duration: f64,
    power: f64,
    power_low: f64,
    power_high: f64,
    repeat: f64,
    on_duration: f64,
    off_duration: f64,
    on_power: f64,
    off_power: f64,
}

impl SegmentAttributes {
    fn from_event(event: &BytesStart<'_>) -> Result<Self, WorkoutParseError> {
        let mut attrs = Self::default();

        for attr in event.attributes() {
            let attr = attr.map_err(|e| {
                WorkoutParseError::InvalidXml(format!("Malformed attribute: {}", e))
            })?;
            let value = attr.unescape_value().map_err(|e| {
                WorkoutParseError::InvalidXml(format!("Malformed attribute value: {}", e))
            })?;
            let value = to_number(&value);

            match attr.key.as_ref() {
                b"Duration" => attrs.duration = value,
                b"Power" => attrs.power = value,
                b"PowerLow" => attrs.power_low = value,
                b"PowerHigh" => attrs.power_high = value,
                b"Repeat" => attrs.repeat = value,
                b"OnDuration" => attrs.on_duration = value,
                b"OffDuration" => attrs.off_duration = value,
                b"OnPower" => attrs.on_power = value,
                b"OffPower" => attrs.off_power = value,
                _ => {}
            }
        }

        Ok(attrs)
    }

    /// Repeat count: rounded, at least 1.
    fn repeat_count(&self) -> u32 {
        let rounded = self.repeat.round();
        if rounded < 1.0 {
            1
        } else {
            (rounded as u32).min(MAX_REPEAT)
        }
    }
}

/// Lenient number conversion: surrounding whitespace is ignored; anything that
/// is not a finite number reads as 0.
fn to_number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            tracing::trace!("Non-numeric attribute value {:?} read as 0", value);
            0.0
        }
    }
}

/// Segments produced by one child of `<workout>`.
fn parse_segments(
    element_name: &str,
    event: &BytesStart<'_>,
) -> Result<Vec<Segment>, WorkoutParseError> {
    let segments = match element_name {
        "SteadyState" => {
            let a = SegmentAttributes::from_event(event)?;
            vec![Segment::steady(
                SegmentKind::SteadyState,
                "Steady State",
                a.duration,
                a.power,
            )]
        }
        "Warmup" => {
            let a = SegmentAttributes::from_event(event)?;
            vec![Segment::ramp(
                SegmentKind::Warmup,
                "Warmup",
                a.duration,
                a.power_low,
                a.power_high,
            )]
        }
        "Cooldown" => {
            let a = SegmentAttributes::from_event(event)?;
            vec![Segment::ramp(
                SegmentKind::Cooldown,
                "Cooldown",
                a.duration,
                a.power_high,
                a.power_low,
            )]
        }
        "FreeRide" => {
            let a = SegmentAttributes::from_event(event)?;
            vec![Segment::free_ride("Free Ride", a.duration)]
        }
        "IntervalsT" => {
            let a = SegmentAttributes::from_event(event)?;
            let repeat = a.repeat_count();
            let mut segments = Vec::with_capacity(repeat as usize * 2);
            for i in 1..=repeat {
                segments.push(Segment::steady(
                    SegmentKind::IntervalOn { repetition: i },
                    format!("Interval {} - On", i),
                    a.on_duration,
                    a.on_power,
                ));
                segments.push(Segment::steady(
                    SegmentKind::IntervalOff { repetition: i },
                    format!("Interval {} - Off", i),
                    a.off_duration,
                    a.off_power,
                ));
            }
            segments
        }
        other => {
            tracing::trace!("Ignoring unknown workout element <{}>", other);
            Vec::new()
        }
    };

    Ok(segments)
}

/// Parse a ZWO file from disk.
pub fn parse_zwo_file(path: &std::path::Path) -> Result<Workout, WorkoutParseError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| WorkoutParseError::Io(e.to_string()))?;

    parse_zwo(&content)
}
