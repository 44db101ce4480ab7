//! Constants for the vehicle link (discovery, telemetry and command records)

// Discovery
pub const PROTOCOL_ID: &str = "beamng"; // Prefix of discovery request and reply
pub const DISCOVERY_SEPARATOR: char = '|';

// Ports and timing
pub const DEFAULT_COMMAND_PORT: u16 = 4444; // Vehicle side: discovery + command records
pub const DEFAULT_TELEMETRY_PORT: u16 = 4445; // Local side: pairing reply + telemetry
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 60;
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 100;
pub const RECV_BUFFER_SIZE: usize = 256;
pub const RECV_ERROR_BACKOFF_MS: u64 = 10;

// Telemetry record (OutGauge layout, little-endian)
pub const TELEMETRY_LEN: usize = 96; // With trailing id
pub const TELEMETRY_LEN_NO_ID: usize = 92; // Id is optional on the wire
pub const OFFSET_TIME: usize = 0; // u32 ms
pub const OFFSET_CAR: usize = 4; // 3 chars + pad
pub const OFFSET_FLAGS: usize = 8; // u16
pub const OFFSET_GEAR: usize = 10; // u8 (0 = R, 1 = N, 2 = first)
pub const OFFSET_PLAYER_ID: usize = 11; // u8
pub const OFFSET_SPEED: usize = 12; // f32 m/s
pub const OFFSET_RPM: usize = 16; // f32
pub const OFFSET_TURBO: usize = 20; // f32 bar
pub const OFFSET_ENG_TEMP: usize = 24; // f32 C
pub const OFFSET_FUEL: usize = 28; // f32 0-1
pub const OFFSET_OIL_PRESSURE: usize = 32; // f32 bar
pub const OFFSET_OIL_TEMP: usize = 36; // f32 C
pub const OFFSET_DASH_LIGHTS: usize = 40; // u32 bitfield (available)
pub const OFFSET_SHOW_LIGHTS: usize = 44; // u32 bitfield (lit)
pub const OFFSET_THROTTLE: usize = 48; // f32 0-1
pub const OFFSET_BRAKE: usize = 52; // f32 0-1
pub const OFFSET_CLUTCH: usize = 56; // f32 0-1
pub const OFFSET_DISPLAY1: usize = 60; // 15 chars + NUL
pub const OFFSET_DISPLAY2: usize = 76; // 15 chars + NUL
pub const OFFSET_ID: usize = 92; // i32
pub const CAR_NAME_LEN: usize = 3;
pub const DISPLAY_LEN: usize = 15;

/// Wire speed unit (m/s) to km/h
pub const MS_TO_KMH: f32 = 3.6;

// Command record (big-endian)
pub const COMMAND_LEN: usize = 16; // steering, throttle, brake, timestamp_ms (4 x f32)
