//! Tick sources for the playback clock.
//!
//! The clock never reads the system time itself. It asks a [`TickSource`] for a
//! monotonic reading in seconds and integrates the difference between readings.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time in seconds.
pub trait TickSource {
    /// Seconds since an arbitrary fixed origin. Must never decrease.
    fn now(&self) -> f64;
}

/// Wall-clock tick source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTicks {
    origin: Instant,
}

impl MonotonicTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicTicks {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven tick source.
///
/// Clones share the same reading, so a test can keep one handle and move time
/// forward while the clock owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    now: Rc<Cell<f64>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `seconds`. Negative values are ignored.
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            self.now.set(self.now.get() + seconds);
        }
    }
}

impl TickSource for ManualTicks {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
