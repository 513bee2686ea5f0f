//! Blocking MSP v1 client for flight controllers
//!
//! Opens a serial link to a Betaflight/Cleanflight flight controller and
//! exchanges MSP frames synchronously: every operation runs to completion
//! (reply, explicit failure, or timeout) before returning. There is no
//! background reader and no pipelining; the protocol has no way to tag
//! concurrent requests, so the client holds at most one exchange in flight
//! and takes `&mut self` everywhere. Callers that need concurrent command
//! issuance must serialize externally.
//!
//! # Example
//!
//! ```no_run
//! use msplink_client::{FlightController, LinkConfig};
//!
//! # fn main() -> msplink_client::Result<()> {
//! let config = LinkConfig::new("/dev/ttyUSB0");
//! let mut fc = FlightController::open(&config)?;
//!
//! let attitude = fc.attitude()?;
//! println!("roll: {:.1} deg", attitude.roll_degrees());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fc;
pub mod transport;

pub use client::MspClient;
pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use fc::FlightController;
pub use transport::{SerialTransport, Transport};

pub use msplink_protocol as protocol;
