//! Simulated power meter for riding without hardware.

use crossbeam::channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::sensors::power::encode_power_measurement;
use crate::sensors::transport::PowerTransport;
use crate::sensors::types::{TransportError, TransportEvent};

const DEVICE_NAME: &str = "Simulated Power Meter";

/// Emits measurement notifications around a fixed wattage from a background thread.
pub struct SimulatedPowerMeter {
    base_watts: i16,
    variation_watts: i16,
    interval: Duration,
    /// Send `Disconnected` after this many packets
    packet_limit: Option<usize>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedPowerMeter {
    /// Meter reporting around `base_watts` four times a second.
    pub fn new(base_watts: i16) -> Self {
        Self {
            base_watts,
            variation_watts: 8,
            interval: Duration::from_millis(250),
            packet_limit: None,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_variation(mut self, variation_watts: i16) -> Self {
        self.variation_watts = variation_watts;
        self
    }

    /// Disconnect after `packets` measurements.
    pub fn with_packet_limit(mut self, packets: usize) -> Self {
        self.packet_limit = Some(packets);
        self
    }

    /// Reading for packet `n`: a slow wobble around the base wattage.
    fn sample(base_watts: i16, variation_watts: i16, n: usize) -> i16 {
        let wobble = (n as f64 * 0.7).sin() * f64::from(variation_watts);
        (f64::from(base_watts) + wobble)
            .round()
            .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
    }

    /// Stop the background thread and wait for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Simulated power meter thread panicked");
            }
        }
    }
}

impl PowerTransport for SimulatedPowerMeter {
    fn connect(&mut self, events: Sender<TransportEvent>) -> Result<String, TransportError> {
        self.stop();
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let base_watts = self.base_watts;
        let variation_watts = self.variation_watts;
        let interval = self.interval;
        let packet_limit = self.packet_limit;

        let handle = std::thread::Builder::new()
            .name("simulated-power".to_string())
            .spawn(move || {
                let mut sent = 0usize;
                while running.load(Ordering::SeqCst) {
                    if packet_limit.is_some_and(|limit| sent >= limit) {
                        let _ = events.send(TransportEvent::Disconnected);
                        break;
                    }

                    let watts = Self::sample(base_watts, variation_watts, sent);
                    if events
                        .send(TransportEvent::Measurement(encode_power_measurement(watts)))
                        .is_err()
                    {
                        // Feed dropped
                        break;
                    }
                    sent += 1;
                    std::thread::sleep(interval);
                }
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        self.handle = Some(handle);
        tracing::debug!("Simulated power meter started at {} W", self.base_watts);
        Ok(DEVICE_NAME.to_string())
    }
}

impl Drop for SimulatedPowerMeter {
    fn drop(&mut self) {
        self.stop();
    }
}
