//! Telemetry receive loop
//!
//! Blocks on the shared socket with a short read timeout so the shutdown
//! flag is checked at least once per timeout.

use super::constants::{RECV_BUFFER_SIZE, RECV_ERROR_BACKOFF_MS};
use super::packet::TelemetryPacket;
use super::state::VehicleState;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Receive side of the vehicle link
pub struct TelemetryReceiver {
    socket: Arc<UdpSocket>,
    vehicle: Arc<VehicleState>,
    shutdown: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
}

impl TelemetryReceiver {
    pub fn new(
        socket: Arc<UdpSocket>,
        vehicle: Arc<VehicleState>,
        shutdown: Arc<AtomicBool>,
        alive: Arc<AtomicBool>,
    ) -> Self {
        Self {
            socket,
            vehicle,
            shutdown,
            alive,
        }
    }

    /// Run until shutdown is requested (blocking).
    ///
    /// `alive` is raised by the spawner and cleared here on exit.
    pub fn run(self) {
        log::info!("Link: receiver started");

        let mut buffer = [0u8; RECV_BUFFER_SIZE];
        let mut skipped: u64 = 0;

        while !self.shutdown.load(Ordering::Acquire) {
            let (len, from) = match self.socket.recv_from(&mut buffer) {
                Ok(result) => result,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) => {
                    log::warn!("Link: receive error: {}", e);
                    thread::sleep(Duration::from_millis(RECV_ERROR_BACKOFF_MS));
                    continue;
                }
            };

            match TelemetryPacket::from_bytes(&buffer[..len]) {
                Ok(packet) => {
                    log::trace!(
                        "Link: telemetry from {}: {:.1} m/s, {:.0} rpm, gear {}",
                        from,
                        packet.speed_ms,
                        packet.rpm,
                        packet.gear
                    );
                    self.vehicle.update(&packet);
                }
                Err(e) => {
                    skipped += 1;
                    log::debug!("Link: skipping datagram from {} ({})", from, e);
                }
            }
        }

        self.alive.store(false, Ordering::Release);
        log::info!(
            "Link: receiver stopped ({} records, {} skipped)",
            self.vehicle.packets_received(),
            skipped
        );
    }
}
