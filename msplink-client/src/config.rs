//! Link configuration

use std::time::Duration;

/// Default serial device (Raspberry Pi UART header)
pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/serial0";

/// Default baud rate for Betaflight MSP UARTs
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default reply budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Serial link parameters, fixed for the lifetime of a client.
///
/// The single `timeout` serves both as the port read timeout and as the
/// budget for every wait-for-reply operation, so a wait overruns its budget
/// by at most one blocked read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Serial device path (e.g. "/dev/ttyUSB0", "/dev/serial0")
    pub path: String,
    /// Line speed in baud
    pub baud_rate: u32,
    /// Read timeout and reply budget
    pub timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SERIAL_DEVICE.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LinkConfig {
    /// Configuration for a device path with default baud rate and timeout
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout / reply budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.path, DEFAULT_SERIAL_DEVICE);
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_builder() {
        let config = LinkConfig::new("/dev/ttyACM0")
            .with_baud_rate(57_600)
            .with_timeout(Duration::from_millis(200));
        assert_eq!(config.path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.timeout, Duration::from_millis(200));
    }
}
