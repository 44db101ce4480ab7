//! Command send loop
//!
//! Every send interval the loop snapshots [`ControlState`], stamps it with
//! the current epoch milliseconds and sends one 16-byte command record.
//! A failed send is logged and the loop continues with the next tick.

use super::packet::CommandPacket;
use super::state::ControlState;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Send side of the vehicle link
pub struct CommandSender {
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
    interval: Duration,
    control: Arc<ControlState>,
    shutdown: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
}

impl CommandSender {
    pub fn new(
        socket: Arc<UdpSocket>,
        remote: SocketAddr,
        interval: Duration,
        control: Arc<ControlState>,
        shutdown: Arc<AtomicBool>,
        alive: Arc<AtomicBool>,
    ) -> Self {
        Self {
            socket,
            remote,
            interval,
            control,
            shutdown,
            alive,
        }
    }

    /// Build the record for the current control values
    pub fn snapshot(&self) -> CommandPacket {
        CommandPacket {
            steering: self.control.steering(),
            throttle: self.control.throttle(),
            brakes: self.control.brakes(),
            timestamp_ms: epoch_millis(),
        }
    }

    /// Run until shutdown is requested (blocking).
    ///
    /// `alive` is raised by the spawner and cleared here on exit.
    pub fn run(self) {
        log::info!(
            "Link: sender started ({}ms cadence to {})",
            self.interval.as_millis(),
            self.remote
        );

        let mut sent: u64 = 0;
        let mut failed: u64 = 0;

        while !self.shutdown.load(Ordering::Acquire) {
            thread::sleep(self.interval);
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            let packet = self.snapshot();
            match self.socket.send_to(&packet.to_bytes(), self.remote) {
                Ok(_) => {
                    sent += 1;
                    log::trace!(
                        "Link: command steering={:.3} throttle={:.2} brakes={:.2}",
                        packet.steering,
                        packet.throttle,
                        packet.brakes
                    );
                }
                Err(e) => {
                    failed += 1;
                    log::warn!("Link: command send to {} failed: {}", self.remote, e);
                }
            }
        }

        self.alive.store(false, Ordering::Release);
        log::info!("Link: sender stopped ({} sent, {} failed)", sent, failed);
    }
}

/// Milliseconds since the Unix epoch as carried on the wire
fn epoch_millis() -> f32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f32)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reads_latest_control() {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").unwrap());
        let remote = socket.local_addr().unwrap();
        let control = Arc::new(ControlState::new());
        let sender = CommandSender::new(
            socket,
            remote,
            Duration::from_millis(60),
            Arc::clone(&control),
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicBool::new(true)),
        );

        control.set_steering(0.25);
        control.set_throttle(0.4);
        let packet = sender.snapshot();
        assert_eq!(packet.steering, 0.25);
        assert_eq!(packet.throttle, 0.4f32);
        assert_eq!(packet.brakes, 0.0);
        assert!(packet.timestamp_ms > 0.0);
    }
}
