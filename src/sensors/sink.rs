//! Latest power reading.

use std::sync::{Arc, RwLock};
use std::time::Instant;

/// One power reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSample {
    /// Instantaneous power in watts
    pub watts: i16,
    /// When the reading arrived
    pub received_at: Instant,
}

/// Holder of the most recent power reading.
///
/// Clones share the same slot: the transport side records, the display side reads.
/// Every write replaces the previous value; there is no history.
#[derive(Debug, Clone, Default)]
pub struct PowerSink {
    latest: Arc<RwLock<Option<PowerSample>>>,
}

impl PowerSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current reading.
    pub fn record(&self, watts: i16) {
        let sample = PowerSample {
            watts,
            received_at: Instant::now(),
        };
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(sample);
        }
    }

    /// Forget the current reading.
    pub fn clear(&self) {
        if let Ok(mut latest) = self.latest.write() {
            *latest = None;
        }
    }

    pub fn latest(&self) -> Option<PowerSample> {
        self.latest.read().ok().and_then(|latest| *latest)
    }

    pub fn latest_watts(&self) -> Option<i16> {
        self.latest().map(|sample| sample.watts)
    }
}
