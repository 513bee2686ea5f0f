//! Typed views over MSP payloads
//!
//! Each response type parses the payload of one MSP command by fixed byte
//! offsets; all multi-byte fields are little-endian. A payload shorter than
//! a type's minimum is a parse failure distinct from frame-level errors: the
//! frame arrived intact, its contents just don't fit the type. Override
//! types go the other way and build the payload they put on the wire.

use crate::command::{MSP_ALTITUDE, MSP_API_VERSION, MSP_ATTITUDE, MSP_RC, MSP_STATUS};
use crate::modes::ModeFlags;

/// Most channels an MSP_RC response can carry
pub const MAX_RC_CHANNELS: usize = 18;

/// Channels in an MSP_SET_RAW_RC override
pub const RAW_RC_CHANNELS: usize = 8;

/// Motor slots in an MSP_SET_MOTOR override
pub const MOTOR_COUNT: usize = 8;

/// Errors raised while parsing a telemetry payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Payload shorter than the type requires
    ShortPayload {
        command: u8,
        expected: usize,
        actual: usize,
    },
    /// MSP_RC payloads must hold whole little-endian channel pairs
    OddRcPayload { actual: usize },
}

impl core::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TelemetryError::ShortPayload {
                command,
                expected,
                actual,
            } => write!(
                f,
                "command {command} payload of {actual} bytes, expected at least {expected}"
            ),
            TelemetryError::OddRcPayload { actual } => {
                write!(f, "RC payload of {actual} bytes is not a whole channel count")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TelemetryError {}

fn require(command: u8, expected: usize, payload: &[u8]) -> Result<(), TelemetryError> {
    if payload.len() < expected {
        return Err(TelemetryError::ShortPayload {
            command,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

fn read_u16(payload: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([payload[offset], payload[offset + 1]])
}

fn read_i16(payload: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([payload[offset], payload[offset + 1]])
}

fn read_u32(payload: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}

/// MSP_API_VERSION response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApiVersion {
    /// MSP protocol version
    pub protocol: u8,
    /// API major version
    pub major: u8,
    /// API minor version
    pub minor: u8,
}

impl ApiVersion {
    pub fn from_payload(payload: &[u8]) -> Result<Self, TelemetryError> {
        require(MSP_API_VERSION, 3, payload)?;
        Ok(Self {
            protocol: payload[0],
            major: payload[1],
            minor: payload[2],
        })
    }
}

/// MSP_STATUS response
///
/// Newer firmware appends extended flag bytes past the original 13; they are
/// ignored here. The mode bitmask covers the first 32 flight-mode boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Task delta time in microseconds
    pub cycle_time_us: u16,
    /// I2C error counter
    pub i2c_errors: u16,
    /// Sensor presence flags (ACC, BARO, MAG, GPS, ...)
    pub sensor_flags: u16,
    /// Active flight-mode boxes, first 32 bits
    pub mode_flags: ModeFlags,
    /// Current PID profile index
    pub pid_profile: u8,
    /// Average system load percentage
    pub system_load: u16,
}

impl Status {
    pub fn from_payload(payload: &[u8]) -> Result<Self, TelemetryError> {
        require(MSP_STATUS, 13, payload)?;
        Ok(Self {
            cycle_time_us: read_u16(payload, 0),
            i2c_errors: read_u16(payload, 2),
            sensor_flags: read_u16(payload, 4),
            mode_flags: ModeFlags(read_u32(payload, 6)),
            pid_profile: payload[10],
            system_load: read_u16(payload, 11),
        })
    }
}

/// MSP_RC response: one little-endian u16 per channel, typically in
/// [1000, 2000]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcChannels {
    count: u8,
    channels: [u16; MAX_RC_CHANNELS],
}

impl RcChannels {
    pub fn from_payload(payload: &[u8]) -> Result<Self, TelemetryError> {
        require(MSP_RC, 2, payload)?;
        if payload.len() % 2 != 0 {
            return Err(TelemetryError::OddRcPayload {
                actual: payload.len(),
            });
        }

        let count = ((payload.len() / 2).min(MAX_RC_CHANNELS)) as u8;
        let mut channels = [0u16; MAX_RC_CHANNELS];
        for (i, channel) in channels.iter_mut().enumerate().take(count as usize) {
            *channel = read_u16(payload, i * 2);
        }

        Ok(Self { count, channels })
    }

    /// Number of channels received
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Received channel values
    pub fn channels(&self) -> &[u16] {
        &self.channels[..self.count as usize]
    }

    /// A single channel value, if received
    pub fn channel(&self, index: usize) -> Option<u16> {
        self.channels().get(index).copied()
    }
}

/// MSP_ATTITUDE response, in tenths of a degree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    pub roll_decidegrees: i16,
    pub pitch_decidegrees: i16,
    pub yaw_decidegrees: i16,
}

impl Attitude {
    pub fn from_payload(payload: &[u8]) -> Result<Self, TelemetryError> {
        require(MSP_ATTITUDE, 6, payload)?;
        Ok(Self {
            roll_decidegrees: read_i16(payload, 0),
            pitch_decidegrees: read_i16(payload, 2),
            yaw_decidegrees: read_i16(payload, 4),
        })
    }

    pub fn roll_degrees(&self) -> f32 {
        self.roll_decidegrees as f32 / 10.0
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_decidegrees as f32 / 10.0
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_decidegrees as f32 / 10.0
    }
}

/// MSP_ALTITUDE response
///
/// Altitude is relative to where the flight controller initialized,
/// typically ground level at arming. Vario is positive when ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Altitude {
    /// Estimated altitude in centimeters
    pub altitude_cm: i32,
    /// Vertical velocity in cm/s
    pub vario_cm_s: i16,
}

impl Altitude {
    pub fn from_payload(payload: &[u8]) -> Result<Self, TelemetryError> {
        require(MSP_ALTITUDE, 6, payload)?;
        Ok(Self {
            altitude_cm: i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
            vario_cm_s: read_i16(payload, 4),
        })
    }

    pub fn altitude_m(&self) -> f32 {
        self.altitude_cm as f32 / 100.0
    }
}

/// MSP_SET_RAW_RC payload: eight channel overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawRc {
    pub channels: [u16; RAW_RC_CHANNELS],
}

impl RawRc {
    /// All channels centered at 1500
    pub fn centered() -> Self {
        Self {
            channels: [1500; RAW_RC_CHANNELS],
        }
    }

    /// Wire payload: channels as little-endian u16 pairs
    pub fn to_payload(&self) -> [u8; RAW_RC_CHANNELS * 2] {
        let mut payload = [0u8; RAW_RC_CHANNELS * 2];
        for (i, &channel) in self.channels.iter().enumerate() {
            payload[i * 2..i * 2 + 2].copy_from_slice(&channel.to_le_bytes());
        }
        payload
    }
}

/// MSP_SET_MOTOR payload: eight direct motor values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorValues {
    pub values: [u16; MOTOR_COUNT],
}

impl MotorValues {
    /// All motors stopped (minimum throttle)
    pub fn stopped() -> Self {
        Self {
            values: [1000; MOTOR_COUNT],
        }
    }

    /// Wire payload: values as little-endian u16 pairs
    pub fn to_payload(&self) -> [u8; MOTOR_COUNT * 2] {
        let mut payload = [0u8; MOTOR_COUNT * 2];
        for (i, &value) in self.values.iter().enumerate() {
            payload[i * 2..i * 2 + 2].copy_from_slice(&value.to_le_bytes());
        }
        payload
    }
}
