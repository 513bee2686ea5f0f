//! Typed command layer over the MSP exchange
//!
//! One request per getter, parsed at fixed byte offsets by the types in
//! [`msplink_protocol::telemetry`]. A payload that is too short for its type
//! is a [`LinkError::Telemetry`] failure, distinct from protocol-level
//! timeouts and transport faults.

use msplink_protocol::command::{
    MSP_ALTITUDE, MSP_API_VERSION, MSP_ATTITUDE, MSP_RC, MSP_SET_MOTOR, MSP_SET_RAW_RC, MSP_STATUS,
};
use msplink_protocol::modes::ModeFlags;
use msplink_protocol::telemetry::{
    Altitude, ApiVersion, Attitude, MotorValues, RawRc, RcChannels, Status, MAX_RC_CHANNELS,
};

use crate::client::MspClient;
use crate::config::LinkConfig;
use crate::error::Result;
use crate::transport::{SerialTransport, Transport};

/// High-level flight-controller handle with typed command methods.
pub struct FlightController<T: Transport> {
    link: MspClient<T>,
}

impl FlightController<SerialTransport> {
    /// Open the configured serial device and bind a handle to it.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        Ok(Self {
            link: MspClient::open(config)?,
        })
    }
}

impl<T: Transport> FlightController<T> {
    /// Wrap an existing protocol client.
    pub fn new(link: MspClient<T>) -> Self {
        Self { link }
    }

    /// Access the underlying protocol client (raw sends, reset).
    pub fn link(&mut self) -> &mut MspClient<T> {
        &mut self.link
    }

    /// MSP protocol and API version of the peer.
    pub fn api_version(&mut self) -> Result<ApiVersion> {
        let mut payload = [0u8; 3];
        let n = self.link.request(MSP_API_VERSION, &mut payload)?;
        Ok(ApiVersion::from_payload(&payload[..n])?)
    }

    /// Cycle time, error counters, sensor flags, mode bitmask and load.
    pub fn status(&mut self) -> Result<Status> {
        // MSP_STATUS can run past 13 bytes with extended flags
        let mut payload = [0u8; 32];
        let n = self.link.request(MSP_STATUS, &mut payload)?;
        Ok(Status::from_payload(&payload[..n])?)
    }

    /// RC channel values as the flight controller sees them.
    pub fn rc(&mut self) -> Result<RcChannels> {
        let mut payload = [0u8; MAX_RC_CHANNELS * 2];
        let n = self.link.request(MSP_RC, &mut payload)?;
        Ok(RcChannels::from_payload(&payload[..n])?)
    }

    /// Roll, pitch and yaw in tenths of a degree.
    pub fn attitude(&mut self) -> Result<Attitude> {
        let mut payload = [0u8; 6];
        let n = self.link.request(MSP_ATTITUDE, &mut payload)?;
        Ok(Attitude::from_payload(&payload[..n])?)
    }

    /// Estimated altitude and vertical speed.
    pub fn altitude(&mut self) -> Result<Altitude> {
        let mut payload = [0u8; 6];
        let n = self.link.request(MSP_ALTITUDE, &mut payload)?;
        Ok(Altitude::from_payload(&payload[..n])?)
    }

    /// Override the eight primary RC channels.
    ///
    /// The flight controller acknowledges with a bare echo of the command
    /// id: success proves the override was received, not that it took
    /// effect.
    pub fn set_raw_rc(&mut self, rc: &RawRc) -> Result<()> {
        self.link.command(MSP_SET_RAW_RC, &rc.to_payload(), true)
    }

    /// Drive motors directly, bypassing the mixer.
    ///
    /// Same echo-only acknowledgement as [`Self::set_raw_rc`].
    pub fn set_motor(&mut self, motors: &MotorValues) -> Result<()> {
        self.link.command(MSP_SET_MOTOR, &motors.to_payload(), true)
    }

    /// Currently active flight modes, from the status mode bitmask.
    pub fn active_modes(&mut self) -> Result<ModeFlags> {
        Ok(self.status()?.mode_flags)
    }
}
