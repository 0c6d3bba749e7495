//! Power transport types.

use thiserror::Error;

/// Event pushed by a power transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Raw Cycling Power Measurement notification
    Measurement(Vec<u8>),
    /// Device went away
    Disconnected,
    /// Transport failed after connecting
    Failed(String),
}

/// Connection state of the power feed, as shown to the rider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Nothing connected yet
    #[default]
    NotConnected,
    /// Connection in progress
    Connecting,
    /// Receiving readings from `device`
    Connected { device: String },
    /// Device disconnected
    Disconnected,
    /// Connection attempt or transport failed
    Failed(String),
    /// No transport available on this system
    Unsupported,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::NotConnected => write!(f, "Not connected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected { device } => write!(f, "Connected to {}", device),
            ConnectionStatus::Disconnected => {
                write!(f, "Disconnected. Reconnect to resume power readings.")
            }
            ConnectionStatus::Failed(reason) => write!(f, "Connection failed: {}", reason),
            ConnectionStatus::Unsupported => write!(f, "Bluetooth not supported on this system."),
        }
    }
}

/// Errors connecting a power transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No transport on this system
    #[error("Bluetooth not supported on this system.")]
    Unsupported,

    /// Connection attempt failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}
