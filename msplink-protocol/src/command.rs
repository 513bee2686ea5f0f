//! MSP v1 command identifiers
//!
//! Ids follow the Betaflight/Cleanflight dialect. Queries carry no request
//! payload and answer with the typed payloads in [`crate::telemetry`];
//! overrides carry a payload out and are acknowledged by a bare echo of the
//! command id.

// Telemetry queries: host -> FC request, FC -> host response
pub const MSP_API_VERSION: u8 = 1;
pub const MSP_STATUS: u8 = 101;
pub const MSP_RC: u8 = 105;
pub const MSP_ATTITUDE: u8 = 108;
pub const MSP_ALTITUDE: u8 = 109;

// Overrides: host -> FC command with payload, ACK echo only
pub const MSP_SET_RAW_RC: u8 = 200;
pub const MSP_SET_MOTOR: u8 = 214;
