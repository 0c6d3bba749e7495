//! Integration test with a mock power transport.

use crossbeam::channel::Sender;
use cycletraining::sensors::{
    ConnectionStatus, PowerFeed, PowerSink, PowerTransport, TransportError, TransportEvent,
};

/// Mock power meter: hands its sender back to the test so packets can be pushed
/// at any point after connecting.
#[derive(Default)]
pub struct MockPowerMeter {
    /// Sender captured on connect
    pub events: Option<Sender<TransportEvent>>,
    /// Fail the connection attempt with this reason
    pub fail_with: Option<String>,
}

impl MockPowerMeter {
    /// Push a Cycling Power Measurement packet (flags 0x0000).
    pub fn send_power(&self, watts: i16) {
        let mut data = vec![0x00, 0x00];
        data.extend_from_slice(&watts.to_le_bytes());
        self.send(TransportEvent::Measurement(data));
    }

    pub fn send(&self, event: TransportEvent) {
        if let Some(events) = &self.events {
            events.send(event).unwrap();
        }
    }
}

impl PowerTransport for MockPowerMeter {
    fn connect(&mut self, events: Sender<TransportEvent>) -> Result<String, TransportError> {
        if let Some(reason) = &self.fail_with {
            return Err(TransportError::ConnectionFailed(reason.clone()));
        }
        self.events = Some(events);
        Ok("Mock PM".to_string())
    }
}

#[test]
fn test_readings_flow_to_shared_sink() {
    let sink = PowerSink::new();
    let display = sink.clone();
    let mut feed = PowerFeed::new(sink);
    let mut meter = MockPowerMeter::default();

    assert_eq!(feed.connect(&mut meter).to_string(), "Connected to Mock PM");

    meter.send_power(150);
    meter.send_power(210);
    assert_eq!(display.latest_watts(), None, "nothing applied before pump");

    assert_eq!(feed.pump(), 2);
    assert_eq!(display.latest_watts(), Some(210));
}

#[test]
fn test_short_packets_keep_last_reading() {
    let sink = PowerSink::new();
    let mut feed = PowerFeed::new(sink.clone());
    let mut meter = MockPowerMeter::default();
    feed.connect(&mut meter);

    meter.send_power(180);
    meter.send(TransportEvent::Measurement(vec![0x00, 0x00, 0x01]));
    feed.pump();

    assert_eq!(sink.latest_watts(), Some(180));
}

#[test]
fn test_disconnect_then_reconnect() {
    let sink = PowerSink::new();
    let mut feed = PowerFeed::new(sink.clone());
    let mut meter = MockPowerMeter::default();
    feed.connect(&mut meter);

    meter.send_power(240);
    meter.send(TransportEvent::Disconnected);
    feed.pump();

    assert_eq!(sink.latest_watts(), None);
    assert_eq!(
        feed.status().to_string(),
        "Disconnected. Reconnect to resume power readings."
    );

    feed.connect(&mut meter);
    meter.send_power(199);
    feed.pump();
    assert!(feed.status().is_connected());
    assert_eq!(sink.latest_watts(), Some(199));
}

#[test]
fn test_connection_failure_status() {
    let mut feed = PowerFeed::new(PowerSink::new());
    let mut meter = MockPowerMeter {
        fail_with: Some("GATT timeout".to_string()),
        ..Default::default()
    };

    let status = feed.connect(&mut meter).clone();
    assert_eq!(status, ConnectionStatus::Failed("GATT timeout".to_string()));
    assert_eq!(status.to_string(), "Connection failed: GATT timeout");
}
