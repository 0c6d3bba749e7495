//! Integration tests for the library → player hand-off.

use cycletraining::sensors::PowerSink;
use cycletraining::workouts::engine::PlaybackClock;
use cycletraining::workouts::handoff::HandoffSlot;
use cycletraining::workouts::library;
use cycletraining::workouts::session::RideSession;
use cycletraining::workouts::ticker::ManualTicks;
use cycletraining::workouts::types::WorkoutError;
use tempfile::tempdir;

fn session() -> RideSession<ManualTicks> {
    RideSession::with_clock(
        PlaybackClock::with_ticks(ManualTicks::new()),
        PowerSink::new(),
        250,
    )
}

#[test]
fn test_library_queue_is_consumed_once() {
    let dir = tempdir().unwrap();
    let slot = HandoffSlot::new(dir.path().join("pending_workout.toml"));

    let plan = library::queue("sweet-spot-3x8", &slot).unwrap();
    assert!(slot.is_pending());

    let mut session = session();
    let loaded = session.load_pending(&slot).unwrap();
    assert_eq!(loaded.as_deref(), Some("Sweet Spot 3x8"));

    let workout = session.clock().workout().unwrap();
    assert_eq!(workout.name(), plan.name);
    assert_eq!(workout.author(), "CycleTraining Library");
    assert_eq!(workout.total_duration_sec(), 3180.0);

    assert!(!slot.is_pending());
    assert!(session.load_pending(&slot).unwrap().is_none());
}

#[test]
fn test_unknown_library_id() {
    let dir = tempdir().unwrap();
    let slot = HandoffSlot::new(dir.path().join("pending_workout.toml"));

    let result = library::queue("does-not-exist", &slot);
    assert!(matches!(result, Err(WorkoutError::NotFound(_))));
    assert!(!slot.is_pending());
}

#[test]
fn test_queue_overwrites_previous_choice() {
    let dir = tempdir().unwrap();
    let slot = HandoffSlot::new(dir.path().join("pending_workout.toml"));

    library::queue("vo2-6x2", &slot).unwrap();
    library::queue("ftp-ramp-test", &slot).unwrap();

    let mut session = session();
    assert_eq!(
        session.load_pending(&slot).unwrap().as_deref(),
        Some("FTP Ramp Test")
    );
    assert_eq!(session.clock().workout().unwrap().len(), 15);
}
