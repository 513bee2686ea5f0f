//! Probe a flight controller over MSP: API version, attitude, altitude and
//! active modes.
//!
//! Usage: fc_info [device] [baud]

use std::env;
use std::time::Duration;

use msplink_client::{FlightController, LinkConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let device = args.next().unwrap_or_else(|| "/dev/serial0".to_string());
    let baud = args
        .next()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(115_200);

    let config = LinkConfig::new(device)
        .with_baud_rate(baud)
        .with_timeout(Duration::from_millis(1000));
    let mut fc = FlightController::open(&config)?;

    let version = fc.api_version()?;
    println!(
        "MSP protocol {}, API {}.{}",
        version.protocol, version.major, version.minor
    );

    let attitude = fc.attitude()?;
    println!(
        "attitude: roll {:.1} deg, pitch {:.1} deg, yaw {:.1} deg",
        attitude.roll_degrees(),
        attitude.pitch_degrees(),
        attitude.yaw_degrees()
    );

    let altitude = fc.altitude()?;
    println!(
        "altitude: {:.2} m, vario {} cm/s",
        altitude.altitude_m(),
        altitude.vario_cm_s
    );

    let modes = fc.active_modes()?;
    let names: Vec<&str> = modes.iter().map(|mode| mode.name()).collect();
    if names.is_empty() {
        println!("active modes: none");
    } else {
        println!("active modes: {}", names.join(", "));
    }

    Ok(())
}
