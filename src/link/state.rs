//! Shared link state
//!
//! Latest-value cells built on atomics. `f32` values are stored as raw bits
//! in `AtomicU32` so neither side ever blocks the other.

use super::packet::TelemetryPacket;
use std::sync::atomic::{AtomicU32, Ordering};

/// `f32` stored as bits in an `AtomicU32`
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Control values (written by the frame pipeline, read by the send loop)
#[derive(Debug)]
pub struct ControlState {
    steering: AtomicF32,
    throttle: AtomicF32,
    brakes: AtomicF32,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            steering: AtomicF32::new(0.5),
            throttle: AtomicF32::new(0.0),
            brakes: AtomicF32::new(0.0),
        }
    }
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set steering, saturated to [0, 1]
    pub fn set_steering(&self, value: f64) {
        self.steering.store(unit(value));
    }

    /// Set throttle, saturated to [0, 1]
    pub fn set_throttle(&self, value: f64) {
        self.throttle.store(unit(value));
    }

    /// Set brakes, saturated to [0, 1]
    pub fn set_brakes(&self, value: f64) {
        self.brakes.store(unit(value));
    }

    #[inline]
    pub fn steering(&self) -> f32 {
        self.steering.load()
    }

    #[inline]
    pub fn throttle(&self) -> f32 {
        self.throttle.load()
    }

    #[inline]
    pub fn brakes(&self) -> f32 {
        self.brakes.load()
    }
}

fn unit(value: f64) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0) as f32
}

/// Vehicle state (written by the receive loop only)
#[derive(Debug)]
pub struct VehicleState {
    speed_kmh: AtomicF32,
    rpm: AtomicU32,
    packets: AtomicU32,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            speed_kmh: AtomicF32::new(0.0),
            rpm: AtomicU32::new(0),
            packets: AtomicU32::new(0),
        }
    }
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the consumed fields of a telemetry record
    pub fn update(&self, packet: &TelemetryPacket) {
        self.speed_kmh.store(packet.speed_kmh());
        // Saturating float-to-int cast; negative RPM reads as 0
        self.rpm.store(packet.rpm as u32, Ordering::Relaxed);
        self.packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Speed in km/h
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed_kmh.load()
    }

    #[inline]
    pub fn rpm(&self) -> u32 {
        self.rpm.load(Ordering::Relaxed)
    }

    /// Telemetry records applied so far
    #[inline]
    pub fn packets_received(&self) -> u32 {
        self.packets.load(Ordering::Relaxed)
    }
}
