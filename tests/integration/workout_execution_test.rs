//! Integration tests for workout execution.
//!
//! Covers the flow from a .zwo document through the playback clock to the
//! player view, with time driven by a manual tick source.

use cycletraining::sensors::{PowerFeed, PowerSink, PowerTransport, TransportError, TransportEvent};
use cycletraining::workouts::engine::{PlaybackClock, PlaybackStatus};
use cycletraining::workouts::session::RideSession;
use cycletraining::workouts::ticker::ManualTicks;

const INTEGRATION_ZWO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workout_file>
    <author>Integration</author>
    <name>Integration Test Workout</name>
    <workout>
        <Warmup Duration="120" PowerLow="0.5" PowerHigh="0.7"/>
        <SteadyState Duration="180" Power="0.9"/>
        <IntervalsT Repeat="2" OnDuration="60" OffDuration="120" OnPower="1.2" OffPower="0.55"/>
        <FreeRide Duration="60"/>
        <Cooldown Duration="60" PowerLow="0.4" PowerHigh="0.6"/>
    </workout>
</workout_file>"#;

/// Transport that delivers one fixed reading on connect.
struct SteadyMeter(i16);

impl PowerTransport for SteadyMeter {
    fn connect(
        &mut self,
        events: crossbeam::channel::Sender<TransportEvent>,
    ) -> Result<String, TransportError> {
        let mut data = vec![0x00, 0x00];
        data.extend_from_slice(&self.0.to_le_bytes());
        events
            .send(TransportEvent::Measurement(data))
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok("Steady".to_string())
    }
}

fn loaded_session(ftp: u16) -> (RideSession<ManualTicks>, ManualTicks) {
    let ticks = ManualTicks::new();
    let mut session = RideSession::with_clock(
        PlaybackClock::with_ticks(ticks.clone()),
        PowerSink::new(),
        ftp,
    );
    session.load_xml(INTEGRATION_ZWO).unwrap();
    (session, ticks)
}

/// Advance real time in small steps, polling like the ride loop does.
fn ride_for(session: &mut RideSession<ManualTicks>, ticks: &ManualTicks, seconds: f64) {
    let steps = (seconds * 4.0).round() as usize;
    for _ in 0..steps {
        ticks.advance(0.25);
        session.clock_mut().poll();
    }
}

#[test]
fn test_full_workout_execution() {
    let (mut session, ticks) = loaded_session(250);
    let total = session.clock().workout().unwrap().total_duration_sec();
    assert_eq!(total, 780.0);

    session.clock_mut().start().unwrap();

    ride_for(&mut session, &ticks, 60.0);
    let view = session.view();
    assert_eq!(view.segment_label, "Warmup");
    assert_eq!(view.power_label, "150 W (60% FTP)");

    ride_for(&mut session, &ticks, 90.0);
    assert_eq!(session.view().segment_label, "Steady State");
    assert_eq!(session.view().range_label, "225 W (90% FTP)");

    ride_for(&mut session, &ticks, 150.0 + 30.0);
    assert_eq!(session.view().segment_label, "Interval 1 - On");
    assert_eq!(session.view().power_label, "300 W (120% FTP)");

    ride_for(&mut session, &ticks, 30.0 + 120.0 + 180.0 + 30.0);
    let view = session.view();
    assert_eq!(view.segment_label, "Free Ride");
    assert_eq!(view.power_label, "Ride at your choice (ERG off)");
    assert_eq!(view.range_label, "Free ride / ERG off");

    ride_for(&mut session, &ticks, 120.0);
    assert!(session.clock().is_finished());
    assert_eq!(session.view().segment_label, "Complete");
    assert_eq!(session.view().time_label, "13:00 / 13:00");
}

#[test]
fn test_pause_resume_and_skip() {
    let (mut session, ticks) = loaded_session(200);
    session.clock_mut().start().unwrap();

    ride_for(&mut session, &ticks, 30.0);
    assert!(session.clock_mut().pause());
    ride_for(&mut session, &ticks, 300.0);
    assert_eq!(session.clock().status(), PlaybackStatus::Paused);
    assert!((session.clock().state().total_elapsed - 30.0).abs() < 1e-6);

    // Skip ahead to the second interval while paused
    assert!(session.clock_mut().seek(4));
    assert_eq!(session.view().segment_label, "Interval 2 - On");
    assert_eq!(session.clock().state().total_elapsed, 480.0);

    session.clock_mut().start().unwrap();
    ride_for(&mut session, &ticks, 10.0);
    assert!((session.clock().state().total_elapsed - 490.0).abs() < 1e-6);
    assert!((session.clock().state().elapsed_in_segment - 10.0).abs() < 1e-6);
}

#[test]
fn test_seek_after_finish_pauses() {
    let (mut session, _) = loaded_session(200);
    session.clock_mut().start().unwrap();
    session.clock_mut().tick(10_000.0);
    assert!(session.clock().is_finished());

    assert!(session.clock_mut().seek(1));
    assert_eq!(session.clock().status(), PlaybackStatus::Paused);
    assert_eq!(session.view().segment_label, "Steady State");
}

#[test]
fn test_live_power_in_view() {
    let (mut session, _) = loaded_session(200);
    let mut feed = PowerFeed::new(session.power().clone());
    feed.connect(&mut SteadyMeter(104));
    feed.pump();

    session.clock_mut().start().unwrap();
    let view = session.view();

    assert_eq!(view.actual_label, "104 W");
    // Warmup starts at 100 W; the band spans 100-140 W
    assert!(view.band.actual_active);
    assert!(view.band.actual_in_band());
}
