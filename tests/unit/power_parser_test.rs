//! Unit tests for Cycling Power Measurement decoding.

use cycletraining::sensors::power::{encode_power_measurement, parse_power_measurement};

#[test]
fn test_parse_minimal_packet() {
    // Flags: 0x0000, power: 250 W
    let data = [0x00, 0x00, 0xFA, 0x00];
    assert_eq!(parse_power_measurement(&data), Some(250));
}

#[test]
fn test_flags_do_not_affect_power() {
    // Flags: 0x0020 (crank revolution data present), power: 300 W, crank fields follow
    let data = [0x20, 0x00, 0x2C, 0x01, 0x10, 0x00, 0x00, 0x04];
    assert_eq!(parse_power_measurement(&data), Some(300));
}

#[test]
fn test_short_packets() {
    assert_eq!(parse_power_measurement(&[0x00]), None);
    assert_eq!(parse_power_measurement(&[0x00, 0x00]), None);
    assert_eq!(parse_power_measurement(&[0x00, 0x00, 0x2C]), None);
}

#[test]
fn test_signed_range() {
    assert_eq!(
        parse_power_measurement(&encode_power_measurement(i16::MAX)),
        Some(i16::MAX)
    );
    assert_eq!(parse_power_measurement(&[0x00, 0x00, 0x00, 0x80]), Some(i16::MIN));
}
