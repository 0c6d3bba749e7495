//! Power meter input: wire decoding, the latest-reading sink and transports.

pub mod power;
pub mod simulated;
pub mod sink;
pub mod transport;
pub mod types;

pub use power::{encode_power_measurement, parse_power_measurement};
pub use simulated::SimulatedPowerMeter;
pub use sink::{PowerSample, PowerSink};
pub use transport::{PowerFeed, PowerTransport, UnsupportedTransport};
pub use types::{ConnectionStatus, TransportError, TransportEvent};
