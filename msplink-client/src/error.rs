//! Error types for the MSP client

use msplink_protocol::telemetry::TelemetryError;
use thiserror::Error;

/// Main error type for all client operations.
///
/// A `Timeout` or `ErrorReply` leaves the client fully usable; only the
/// transport variants indicate the link itself has failed.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Serial device could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Transport I/O failed (device unplugged, driver fault).
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No valid matching frame arrived within the timeout budget.
    #[error("timed out waiting for a matching frame")]
    Timeout,

    /// The flight controller answered with an error frame.
    #[error("flight controller rejected command {command}")]
    ErrorReply { command: u8 },

    /// Payload exceeds the single length byte of the wire format.
    #[error("payload of {size} bytes exceeds the 255 byte frame limit")]
    PayloadTooLarge { size: usize },

    /// A response arrived but its payload does not fit the requested type.
    #[error("telemetry parse error: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;
