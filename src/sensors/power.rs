//! Cycling Power Measurement payloads.
//!
//! Only instantaneous power is used. The flags word and the optional fields that
//! follow it are left alone.

/// Offset of the instantaneous power field (after the 16-bit flags).
const INSTANT_POWER_OFFSET: usize = 2;

/// Decode instantaneous power in watts from a measurement notification.
///
/// Returns `None` for payloads shorter than 4 bytes.
pub fn parse_power_measurement(data: &[u8]) -> Option<i16> {
    let bytes = data.get(INSTANT_POWER_OFFSET..INSTANT_POWER_OFFSET + 2)?;
    Some(i16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Build a minimal measurement payload (no optional fields) carrying `watts`.
pub fn encode_power_measurement(watts: i16) -> Vec<u8> {
    let flags: u16 = 0;
    let mut data = Vec::with_capacity(4);
    data.extend_from_slice(&flags.to_le_bytes());
    data.extend_from_slice(&watts.to_le_bytes());
    data
}
