//! Fixed-layout wire records for the vehicle link
//!
//! - [`CommandPacket`]: outgoing control record (16 bytes, big-endian)
//! - [`TelemetryPacket`]: incoming vehicle state record (OutGauge, little-endian)
//! - Discovery strings for the pairing handshake
//!
//! # Command record
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────┐
//! │ steering │ throttle │ brake    │ timestamp_ms │
//! │ f32 BE   │ f32 BE   │ f32 BE   │ f32 BE       │
//! └──────────┴──────────┴──────────┴──────────────┘
//! ```
//!
//! # Telemetry record
//!
//! 92 bytes, or 96 with the optional trailing id. Only speed (offset 12)
//! and RPM (offset 16) feed [`VehicleState`](super::state::VehicleState);
//! the rest is decoded for completeness. See `constants.rs` for offsets.

use super::constants::*;
use crate::error::{Error, Result};

/// Control record sent on every send-loop tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandPacket {
    /// 0 = full left, 0.5 = center, 1 = full right
    pub steering: f32,
    /// 0-1
    pub throttle: f32,
    /// 0-1
    pub brakes: f32,
    /// Milliseconds since the Unix epoch (f32 precision on the wire)
    pub timestamp_ms: f32,
}

impl CommandPacket {
    /// Encode as 16 big-endian bytes
    pub fn to_bytes(&self) -> [u8; COMMAND_LEN] {
        let mut data = [0u8; COMMAND_LEN];
        data[0..4].copy_from_slice(&self.steering.to_be_bytes());
        data[4..8].copy_from_slice(&self.throttle.to_be_bytes());
        data[8..12].copy_from_slice(&self.brakes.to_be_bytes());
        data[12..16].copy_from_slice(&self.timestamp_ms.to_be_bytes());
        data
    }

    /// Decode a command record (vehicle side / loopback peers)
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != COMMAND_LEN {
            return Err(Error::InvalidPacket(format!(
                "command record is {} bytes, expected {}",
                data.len(),
                COMMAND_LEN
            )));
        }
        Ok(Self {
            steering: read_f32_be(data, 0),
            throttle: read_f32_be(data, 4),
            brakes: read_f32_be(data, 8),
            timestamp_ms: read_f32_be(data, 12),
        })
    }
}

/// Decoded telemetry record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryPacket {
    /// Time in milliseconds (for ordering)
    pub time_ms: u32,
    /// Short car identifier
    pub car: String,
    /// Info flags
    pub flags: u16,
    /// Gear (0 = reverse, 1 = neutral, 2 = first, ...)
    pub gear: u8,
    pub player_id: u8,
    /// Speed in m/s
    pub speed_ms: f32,
    pub rpm: f32,
    pub turbo: f32,
    pub engine_temp: f32,
    pub fuel: f32,
    pub oil_pressure: f32,
    pub oil_temp: f32,
    /// Dash lights available
    pub dash_lights: u32,
    /// Dash lights currently lit
    pub show_lights: u32,
    pub throttle: f32,
    pub brake: f32,
    pub clutch: f32,
    pub display1: String,
    pub display2: String,
    /// Optional trailing id (present in 96-byte records)
    pub id: Option<i32>,
}

impl TelemetryPacket {
    /// Decode a telemetry datagram.
    ///
    /// Accepts exactly 92 or 96 bytes; anything else is malformed.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != TELEMETRY_LEN && data.len() != TELEMETRY_LEN_NO_ID {
            return Err(Error::InvalidPacket(format!(
                "telemetry record is {} bytes, expected {} or {}",
                data.len(),
                TELEMETRY_LEN_NO_ID,
                TELEMETRY_LEN
            )));
        }

        Ok(Self {
            time_ms: read_u32_le(data, OFFSET_TIME),
            car: read_str(&data[OFFSET_CAR..OFFSET_CAR + CAR_NAME_LEN]),
            flags: u16::from_le_bytes([data[OFFSET_FLAGS], data[OFFSET_FLAGS + 1]]),
            gear: data[OFFSET_GEAR],
            player_id: data[OFFSET_PLAYER_ID],
            speed_ms: read_f32_le(data, OFFSET_SPEED),
            rpm: read_f32_le(data, OFFSET_RPM),
            turbo: read_f32_le(data, OFFSET_TURBO),
            engine_temp: read_f32_le(data, OFFSET_ENG_TEMP),
            fuel: read_f32_le(data, OFFSET_FUEL),
            oil_pressure: read_f32_le(data, OFFSET_OIL_PRESSURE),
            oil_temp: read_f32_le(data, OFFSET_OIL_TEMP),
            dash_lights: read_u32_le(data, OFFSET_DASH_LIGHTS),
            show_lights: read_u32_le(data, OFFSET_SHOW_LIGHTS),
            throttle: read_f32_le(data, OFFSET_THROTTLE),
            brake: read_f32_le(data, OFFSET_BRAKE),
            clutch: read_f32_le(data, OFFSET_CLUTCH),
            display1: read_str(&data[OFFSET_DISPLAY1..OFFSET_DISPLAY1 + DISPLAY_LEN]),
            display2: read_str(&data[OFFSET_DISPLAY2..OFFSET_DISPLAY2 + DISPLAY_LEN]),
            id: (data.len() == TELEMETRY_LEN).then(|| read_u32_le(data, OFFSET_ID) as i32),
        })
    }

    /// Encode as a wire record (96 bytes with id, 92 without)
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = if self.id.is_some() {
            TELEMETRY_LEN
        } else {
            TELEMETRY_LEN_NO_ID
        };
        let mut data = vec![0u8; len];
        data[OFFSET_TIME..OFFSET_TIME + 4].copy_from_slice(&self.time_ms.to_le_bytes());
        write_str(&mut data[OFFSET_CAR..OFFSET_CAR + CAR_NAME_LEN], &self.car);
        data[OFFSET_FLAGS..OFFSET_FLAGS + 2].copy_from_slice(&self.flags.to_le_bytes());
        data[OFFSET_GEAR] = self.gear;
        data[OFFSET_PLAYER_ID] = self.player_id;
        for (offset, value) in [
            (OFFSET_SPEED, self.speed_ms),
            (OFFSET_RPM, self.rpm),
            (OFFSET_TURBO, self.turbo),
            (OFFSET_ENG_TEMP, self.engine_temp),
            (OFFSET_FUEL, self.fuel),
            (OFFSET_OIL_PRESSURE, self.oil_pressure),
            (OFFSET_OIL_TEMP, self.oil_temp),
            (OFFSET_THROTTLE, self.throttle),
            (OFFSET_BRAKE, self.brake),
            (OFFSET_CLUTCH, self.clutch),
        ] {
            data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        data[OFFSET_DASH_LIGHTS..OFFSET_DASH_LIGHTS + 4]
            .copy_from_slice(&self.dash_lights.to_le_bytes());
        data[OFFSET_SHOW_LIGHTS..OFFSET_SHOW_LIGHTS + 4]
            .copy_from_slice(&self.show_lights.to_le_bytes());
        write_str(&mut data[OFFSET_DISPLAY1..OFFSET_DISPLAY1 + DISPLAY_LEN], &self.display1);
        write_str(&mut data[OFFSET_DISPLAY2..OFFSET_DISPLAY2 + DISPLAY_LEN], &self.display2);
        if let Some(id) = self.id {
            data[OFFSET_ID..OFFSET_ID + 4].copy_from_slice(&id.to_le_bytes());
        }
        data
    }

    /// Speed converted to km/h
    #[inline]
    pub fn speed_kmh(&self) -> f32 {
        self.speed_ms * MS_TO_KMH
    }
}

/// Discovery datagram: `"<protocol-id>|<client-name>|<security-code>"`
pub fn discovery_request(protocol_id: &str, client_name: &str, security_code: u32) -> String {
    format!(
        "{protocol_id}{DISCOVERY_SEPARATOR}{client_name}{DISCOVERY_SEPARATOR}{security_code}"
    )
}

/// Expected pairing reply: `"<protocol-id>|<security-code>"`
pub fn discovery_reply(protocol_id: &str, security_code: u32) -> String {
    format!("{protocol_id}{DISCOVERY_SEPARATOR}{security_code}")
}

#[inline]
fn read_f32_be(data: &[u8], offset: usize) -> f32 {
    f32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
fn read_f32_le(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// NUL-terminated (or full-width) ASCII field
fn read_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn write_str(field: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    let n = bytes.len().min(field.len());
    field[..n].copy_from_slice(&bytes[..n]);
}
