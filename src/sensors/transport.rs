//! Power transport interface and the event feed that applies it to a sink.
//!
//! A transport runs on its own schedule and pushes [`TransportEvent`]s onto a
//! crossbeam channel. [`PowerFeed::pump`] drains that channel on the caller's
//! thread, so readings only ever reach the sink between playback ticks.

use crossbeam::channel::{Receiver, Sender};

use crate::sensors::power::parse_power_measurement;
use crate::sensors::sink::PowerSink;
use crate::sensors::types::{ConnectionStatus, TransportError, TransportEvent};

/// Source of power measurement notifications.
pub trait PowerTransport {
    /// Connect and start delivering events on `events`.
    ///
    /// Returns the device name on success.
    fn connect(&mut self, events: Sender<TransportEvent>) -> Result<String, TransportError>;
}

/// Channel between a transport and a [`PowerSink`].
pub struct PowerFeed {
    tx: Sender<TransportEvent>,
    rx: Receiver<TransportEvent>,
    sink: PowerSink,
    status: ConnectionStatus,
}

impl PowerFeed {
    /// Create a feed writing into `sink`.
    pub fn new(sink: PowerSink) -> Self {
        let (tx, rx) = crossbeam::channel::unbounded();
        Self {
            tx,
            rx,
            sink,
            status: ConnectionStatus::NotConnected,
        }
    }

    /// Connect `transport` to this feed.
    pub fn connect<P: PowerTransport + ?Sized>(&mut self, transport: &mut P) -> &ConnectionStatus {
        self.status = ConnectionStatus::Connecting;

        self.status = match transport.connect(self.tx.clone()) {
            Ok(device) => {
                tracing::info!("Power transport connected to {}", device);
                ConnectionStatus::Connected { device }
            }
            Err(TransportError::Unsupported) => {
                tracing::warn!("No power transport available");
                ConnectionStatus::Unsupported
            }
            Err(TransportError::ConnectionFailed(reason)) => {
                tracing::warn!("Power transport connection failed: {}", reason);
                ConnectionStatus::Failed(reason)
            }
        };

        &self.status
    }

    /// Apply every pending event without blocking. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Measurement(data) => match parse_power_measurement(&data) {
                Some(watts) => self.sink.record(watts),
                None => tracing::trace!("Ignoring short power payload ({} bytes)", data.len()),
            },
            TransportEvent::Disconnected => {
                tracing::info!("Power transport disconnected");
                self.sink.clear();
                self.status = ConnectionStatus::Disconnected;
            }
            TransportEvent::Failed(reason) => {
                tracing::warn!("Power transport failed: {}", reason);
                self.sink.clear();
                self.status = ConnectionStatus::Failed(reason);
            }
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn sink(&self) -> &PowerSink {
        &self.sink
    }
}

/// Transport for systems without a power meter link.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedTransport;

impl PowerTransport for UnsupportedTransport {
    fn connect(&mut self, _events: Sender<TransportEvent>) -> Result<String, TransportError> {
        Err(TransportError::Unsupported)
    }
}
