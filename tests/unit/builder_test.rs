//! Unit tests for workout plans, expansion and the built-in library.

use cycletraining::workouts::builder::{expand, IntervalDescriptor, WorkoutPlan};
use cycletraining::workouts::library;
use cycletraining::workouts::parser_zwo::parse_zwo;
use cycletraining::workouts::types::total_duration;
use cycletraining::workouts::writer_zwo::write_plan;

#[test]
fn test_expansion_preserves_order_and_duration() {
    let descriptors = vec![
        IntervalDescriptor::Warmup {
            duration_sec: 420.0,
            start: 0.5,
            end: 0.8,
        },
        IntervalDescriptor::IntervalBlock {
            repeat: 6,
            on_duration_sec: 120.0,
            off_duration_sec: 120.0,
            on_power: 1.15,
            off_power: 0.55,
            label: None,
        },
        IntervalDescriptor::FreeRide {
            duration_sec: 120.0,
            label: Some("Free spin".to_string()),
        },
    ];

    let segments = expand(&descriptors);
    assert_eq!(segments.len(), 14);
    assert_eq!(segments[1].label, "On 1");
    assert_eq!(segments[12].label, "Recover");
    assert_eq!(segments[13].label, "Free spin");
    assert_eq!(total_duration(&segments), 420.0 + 6.0 * 240.0 + 120.0);
}

#[test]
fn test_zero_repeat_block_is_empty() {
    let segments = expand(&[IntervalDescriptor::IntervalBlock {
        repeat: 0,
        on_duration_sec: 60.0,
        off_duration_sec: 60.0,
        on_power: 1.0,
        off_power: 0.5,
        label: None,
    }]);
    assert!(segments.is_empty());
}

#[test]
fn test_vo2_library_workout() {
    let plan = library::find("vo2-6x2").unwrap();
    let segments = plan.segments();

    assert_eq!(segments.len(), 16);
    assert_eq!(segments[2].label, "VO₂ repeats 1");
    assert!(segments[14].is_free_ride());
    assert_eq!(
        library::summary_line(&plan, 250),
        "High intensity • 43:00 • 125-200 W (50% → 80% FTP)"
    );
}

#[test]
fn test_built_plan_xml() {
    let plan = WorkoutPlan::new("Lunch Ride")
        .with_interval(IntervalDescriptor::Warmup {
            duration_sec: 300.0,
            start: 0.5,
            end: 0.7,
        })
        .with_interval(IntervalDescriptor::Steady {
            duration_sec: 600.0,
            power: 0.85,
            label: None,
        })
        .with_interval(IntervalDescriptor::Cooldown {
            duration_sec: 300.0,
            start: 0.7,
            end: 0.5,
        });

    let xml = write_plan(&plan).unwrap();
    assert!(xml.contains("<name>Lunch Ride</name>"));
    assert!(xml.contains("<author>You</author>"));
    assert!(xml.contains(r#"<Warmup Duration="300" PowerLow="0.50" PowerHigh="0.70"/>"#));
    assert!(xml.contains(r#"<SteadyState Duration="600" Power="0.85"/>"#));
    assert!(xml.contains(r#"<Cooldown Duration="300" PowerLow="0.50" PowerHigh="0.70"/>"#));

    let workout = parse_zwo(&xml).unwrap();
    assert_eq!(workout.total_duration_sec(), 1200.0);
    assert_eq!(workout.segments()[2].power, plan.segments()[2].power);
}
