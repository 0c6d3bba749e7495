//! Unit tests for target power calculation.

use cycletraining::workouts::target::{compute_target, TargetBand};
use cycletraining::workouts::types::{Segment, SegmentKind};

#[test]
fn test_warmup_interpolation() {
    let warmup = Segment::ramp(SegmentKind::Warmup, "Warmup", 300.0, 0.55, 0.75);

    let start = compute_target(&warmup, 0.0, 200).unwrap();
    let mid = compute_target(&warmup, 150.0, 200).unwrap();
    let end = compute_target(&warmup, 300.0, 200).unwrap();

    assert_eq!(start.current_w, 110);
    assert_eq!(mid.current_w, 130);
    assert_eq!(end.current_w, 150);
}

#[test]
fn test_cooldown_descends() {
    let cooldown = Segment::ramp(SegmentKind::Cooldown, "Cooldown", 240.0, 0.75, 0.45);
    let target = compute_target(&cooldown, 60.0, 300).unwrap();

    assert_eq!(target.start_w, 225);
    assert_eq!(target.end_w, 135);
    // 225 - 90 * 0.25 = 202.5
    assert_eq!(target.current_w, 203);
    assert_eq!(target.range_label(), "225-135 W (75%→45% FTP)");
}

#[test]
fn test_no_target_cases() {
    let steady = Segment::steady(SegmentKind::SteadyState, "Steady State", 60.0, 0.9);
    assert!(compute_target(&steady, 10.0, 0).is_none());

    let free = Segment::free_ride("Free Ride", 60.0);
    assert!(compute_target(&free, 10.0, 250).is_none());
}

#[test]
fn test_band_outside_target() {
    let steady = Segment::steady(SegmentKind::SteadyState, "Steady State", 60.0, 0.9);
    let target = compute_target(&steady, 0.0, 200).unwrap();

    let band = TargetBand::layout(Some(&target), Some(320), 200);
    assert!(band.actual_active);
    assert!(!band.actual_in_band());

    // Readings beyond the scale pin to the edge
    let high = TargetBand::layout(Some(&target), Some(1000), 200);
    assert_eq!(high.actual_pct, 100.0);
    let negative = TargetBand::layout(Some(&target), Some(-20), 200);
    assert_eq!(negative.actual_pct, 0.0);
}

#[test]
fn test_band_without_ftp_is_dimmed() {
    let band = TargetBand::layout(None, Some(200), 0);
    assert!(!band.actual_active);
    assert_eq!(band.left_pct, 0.0);
    assert_eq!(band.width_pct, 100.0);
}
