//! Betaflight flight-mode box table
//!
//! MSP reports active flight modes as a bitmask whose bit positions follow
//! the firmware's box-id order. The table below is pure data; the only thing
//! that matters is exact index alignment with the firmware.

/// Number of defined flight-mode boxes
pub const MODE_COUNT: usize = 48;

/// Flight-mode boxes, in firmware bit order (ARM = bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlightMode {
    Arm = 0,
    Angle,
    Horizon,
    Mag,
    AltHold,
    HeadFree,
    Chirp,
    Passthru,
    Failsafe,
    PosHold,
    GpsRescue,
    AntiGravity,
    HeadAdj,
    CamStab,
    BeeperOn,
    LedLow,
    Calib,
    Osd,
    Telemetry,
    Servo1,
    Servo2,
    Servo3,
    Blackbox,
    AirMode,
    Mode3d,
    FpvAngleMix,
    BlackboxErase,
    Camera1,
    Camera2,
    Camera3,
    CrashFlip,
    Prearm,
    BeepGpsCount,
    VtxPitMode,
    Paralyze,
    User1,
    User2,
    User3,
    User4,
    PidAudio,
    AcroTrainer,
    VtxControlDisable,
    LaunchControl,
    MspOverride,
    StickCommandDisable,
    BeeperMute,
    Ready,
    LapTimerReset,
}

const MODES: [FlightMode; MODE_COUNT] = [
    FlightMode::Arm,
    FlightMode::Angle,
    FlightMode::Horizon,
    FlightMode::Mag,
    FlightMode::AltHold,
    FlightMode::HeadFree,
    FlightMode::Chirp,
    FlightMode::Passthru,
    FlightMode::Failsafe,
    FlightMode::PosHold,
    FlightMode::GpsRescue,
    FlightMode::AntiGravity,
    FlightMode::HeadAdj,
    FlightMode::CamStab,
    FlightMode::BeeperOn,
    FlightMode::LedLow,
    FlightMode::Calib,
    FlightMode::Osd,
    FlightMode::Telemetry,
    FlightMode::Servo1,
    FlightMode::Servo2,
    FlightMode::Servo3,
    FlightMode::Blackbox,
    FlightMode::AirMode,
    FlightMode::Mode3d,
    FlightMode::FpvAngleMix,
    FlightMode::BlackboxErase,
    FlightMode::Camera1,
    FlightMode::Camera2,
    FlightMode::Camera3,
    FlightMode::CrashFlip,
    FlightMode::Prearm,
    FlightMode::BeepGpsCount,
    FlightMode::VtxPitMode,
    FlightMode::Paralyze,
    FlightMode::User1,
    FlightMode::User2,
    FlightMode::User3,
    FlightMode::User4,
    FlightMode::PidAudio,
    FlightMode::AcroTrainer,
    FlightMode::VtxControlDisable,
    FlightMode::LaunchControl,
    FlightMode::MspOverride,
    FlightMode::StickCommandDisable,
    FlightMode::BeeperMute,
    FlightMode::Ready,
    FlightMode::LapTimerReset,
];

const MODE_NAMES: [&str; MODE_COUNT] = [
    "ARM",
    "ANGLE",
    "HORIZON",
    "MAG",
    "ALTHOLD",
    "HEADFREE",
    "CHIRP",
    "PASSTHRU",
    "FAILSAFE",
    "POSHOLD",
    "GPSRESCUE",
    "ANTIGRAVITY",
    "HEADADJ",
    "CAMSTAB",
    "BEEPERON",
    "LEDLOW",
    "CALIB",
    "OSD",
    "TELEMETRY",
    "SERVO1",
    "SERVO2",
    "SERVO3",
    "BLACKBOX",
    "AIRMODE",
    "3D",
    "FPVANGLEMIX",
    "BLACKBOXERASE",
    "CAMERA1",
    "CAMERA2",
    "CAMERA3",
    "CRASHFLIP",
    "PREARM",
    "BEEPGPSCOUNT",
    "VTXPITMODE",
    "PARALYZE",
    "USER1",
    "USER2",
    "USER3",
    "USER4",
    "PIDAUDIO",
    "ACROTRAINER",
    "VTXCONTROLDISABLE",
    "LAUNCHCONTROL",
    "MSPOVERRIDE",
    "STICKCOMMANDDISABLE",
    "BEEPERMUTE",
    "READY",
    "LAPTIMERRESET",
];

impl FlightMode {
    /// Bit position of this mode in the status bitmask
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Firmware name of this mode
    pub fn name(self) -> &'static str {
        MODE_NAMES[self as usize]
    }

    /// Mode at a given bit position, if defined
    pub fn from_index(index: u8) -> Option<Self> {
        MODES.get(index as usize).copied()
    }
}

/// Active flight-mode bitmask as reported by MSP_STATUS.
///
/// Only the first 32 box bits fit in the status word; modes past bit 31 can
/// never show as active here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeFlags(pub u32);

impl ModeFlags {
    /// Check whether a mode's bit is set
    pub fn contains(self, mode: FlightMode) -> bool {
        let index = mode.index();
        index < 32 && self.0 & (1 << index) != 0
    }

    /// True when the ARM box is active
    pub fn is_armed(self) -> bool {
        self.contains(FlightMode::Arm)
    }

    /// Iterate over the active modes, lowest bit first
    pub fn iter(self) -> impl Iterator<Item = FlightMode> {
        (0u8..32)
            .filter(move |index| self.0 & (1 << index) != 0)
            .filter_map(FlightMode::from_index)
    }
}
