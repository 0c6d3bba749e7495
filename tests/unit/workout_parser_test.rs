//! Unit tests for .zwo reading and writing.

use cycletraining::workouts::parser_zwo::{parse_zwo, parse_zwo_file};
use cycletraining::workouts::types::{PowerRange, SegmentKind, WorkoutParseError};
use cycletraining::workouts::writer_zwo::write_zwo;
use std::io::Write;
use tempfile::NamedTempFile;

/// Sample ZWO workout XML for testing.
const SAMPLE_ZWO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workout_file>
    <author>Test Author</author>
    <name>Test Workout</name>
    <description>A simple test workout</description>
    <sportType>bike</sportType>
    <tags>
        <tag name="Intervals"/>
        <tag name="FTP"/>
    </tags>
    <workout>
        <Warmup Duration="300" PowerLow="0.4" PowerHigh="0.7"/>
        <SteadyState Duration="600" Power="0.75" Cadence="90"/>
        <IntervalsT Repeat="4" OnDuration="30" OffDuration="30" OnPower="1.2" OffPower="0.5"/>
        <FreeRide Duration="120"/>
        <SteadyState Duration="300" Power="0.6"/>
        <Cooldown Duration="300" PowerLow="0.3" PowerHigh="0.5"/>
    </workout>
</workout_file>"#;

#[test]
fn test_parse_zwo_basic() {
    let workout = parse_zwo(SAMPLE_ZWO).expect("Should parse ZWO workout");

    assert_eq!(workout.name(), "Test Workout");
    assert_eq!(workout.author(), "Test Author");
    assert_eq!(workout.description(), "A simple test workout");

    // warmup + steady + 4 x 2 intervals + free ride + steady + cooldown
    assert_eq!(workout.len(), 13);
    assert_eq!(workout.total_duration_sec(), 1860.0);
}

#[test]
fn test_parse_zwo_segment_mapping() {
    let workout = parse_zwo(SAMPLE_ZWO).unwrap();
    let segments = workout.segments();

    assert_eq!(segments[0].kind, SegmentKind::Warmup);
    assert_eq!(segments[0].power, Some(PowerRange::ramp(0.4, 0.7)));

    assert_eq!(segments[1].label, "Steady State");
    assert_eq!(segments[1].power, Some(PowerRange::flat(0.75)));

    assert_eq!(segments[2].label, "Interval 1 - On");
    assert_eq!(segments[2].power, Some(PowerRange::flat(1.2)));
    assert_eq!(segments[3].label, "Interval 1 - Off");
    assert_eq!(segments[9].kind, SegmentKind::IntervalOff { repetition: 4 });

    assert_eq!(segments[10].label, "Free Ride");
    assert!(segments[10].is_free_ride());

    assert_eq!(segments[12].label, "Cooldown");
    assert_eq!(segments[12].power, Some(PowerRange::ramp(0.5, 0.3)));
}

#[test]
fn test_only_first_workout_direct_children() {
    let zwo = r#"<workout_file>
    <workout>
        <SteadyState Duration="60" Power="0.5"/>
        <group><SteadyState Duration="60" Power="0.9"/></group>
    </workout>
    <workout>
        <SteadyState Duration="600" Power="1.0"/>
    </workout>
</workout_file>"#;

    let workout = parse_zwo(zwo).unwrap();
    assert_eq!(workout.len(), 1);
    assert_eq!(workout.total_duration_sec(), 60.0);
}

#[test]
fn test_metadata_from_anywhere_first_wins() {
    let zwo = r#"<workout_file>
    <workout><FreeRide Duration="30"/></workout>
    <meta><name>  Late Name  </name></meta>
    <name>Second Name</name>
</workout_file>"#;

    let workout = parse_zwo(zwo).unwrap();
    assert_eq!(workout.name(), "Late Name");
    assert_eq!(workout.author(), "Unknown author");
}

#[test]
fn test_default_name() {
    let zwo = r#"<workout_file><workout><FreeRide Duration="30"/></workout></workout_file>"#;
    assert_eq!(parse_zwo(zwo).unwrap().name(), "Untitled Workout");
}

#[test]
fn test_not_well_formed_documents() {
    let cases = [
        "this is not xml",
        "<workout_file><workout></workout_file>",
        "<workout_file><workout><SteadyState Duration=\"60\" Power=\"0.5\"/></workout>",
        "<workout_file></workout_file><workout_file></workout_file>",
    ];

    for case in cases {
        let result = parse_zwo(case);
        assert!(
            matches!(result, Err(WorkoutParseError::InvalidXml(_))),
            "expected InvalidXml for {:?}, got {:?}",
            case,
            result
        );
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        parse_zwo("<workout_file/>").unwrap_err().to_string(),
        "Could not find <workout> section"
    );
    assert_eq!(
        parse_zwo("<workout_file><workout></workout></workout_file>")
            .unwrap_err()
            .to_string(),
        "No intervals found in workout"
    );
}

#[test]
fn test_round_trip() {
    let workout = parse_zwo(SAMPLE_ZWO).unwrap();
    let xml = write_zwo(&workout).unwrap();
    let reparsed = parse_zwo(&xml).unwrap();

    assert_eq!(reparsed, workout);
    assert_eq!(xml.matches("<IntervalsT").count(), 1);
}

#[test]
fn test_parse_zwo_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_ZWO.as_bytes()).unwrap();

    let workout = parse_zwo_file(file.path()).unwrap();
    assert_eq!(workout.name(), "Test Workout");

    let missing = parse_zwo_file(std::path::Path::new("/definitely/not/here.zwo"));
    assert!(matches!(missing, Err(WorkoutParseError::Io(_))));
}
