//! MSP v1 (MultiWii Serial Protocol) wire codec
//!
//! This crate defines the framing used to talk to a Betaflight/Cleanflight
//! flight controller over a serial line, plus typed views over the telemetry
//! payloads it returns.
//!
//! # Frame format
//!
//! All messages use the same binary frame:
//! ```text
//! ┌──────┬───────┬───────────┬────────┬─────────┬─────────┬──────────┐
//! │ SYNC │ PROTO │ DIRECTION │ LENGTH │ COMMAND │ PAYLOAD │ CHECKSUM │
//! │ '$'  │ 'M'   │ < > !     │ 1B     │ 1B      │ 0–255B  │ 1B       │
//! └──────┴───────┴───────────┴────────┴─────────┴─────────┴──────────┘
//! ```
//!
//! The checksum is the XOR of LENGTH, COMMAND, and every PAYLOAD byte. A
//! frame that fails the checksum is never delivered; the parser rescans the
//! stream for the next plausible frame start instead.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod modes;
pub mod telemetry;

pub use frame::{
    Direction, DirectionFilter, Frame, FrameError, FrameParser, FRAME_PROTO, FRAME_SYNC,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use modes::{FlightMode, ModeFlags};
pub use telemetry::{
    Altitude, ApiVersion, Attitude, MotorValues, RawRc, RcChannels, Status, TelemetryError,
};
