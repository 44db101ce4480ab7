//! Vehicle link over UDP
//!
//! Owns one persistent socket bound to the local telemetry port, runs the
//! pairing handshake and then two background threads:
//!
//! - `link-receiver`: decodes telemetry into [`VehicleState`]
//! - `link-sender`: sends [`ControlState`] as command records every send interval
//!
//! ```text
//! Unpaired ──pair()──▶ Pairing ──reply──▶ Paired ──start()──▶ Running ──stop()──▶ Stopped
//!    ▲                    │
//!    └──── timeout ───────┘
//! ```
//!
//! `stop()` may be called from any state and is idempotent; `Drop` calls it.

pub mod constants;
pub mod packet;
pub mod pairing;
pub mod receiver;
pub mod sender;
pub mod state;

pub use packet::{CommandPacket, TelemetryPacket};
pub use state::{ControlState, VehicleState};

use crate::config::LinkConfig;
use crate::error::{Error, Result};
use receiver::TelemetryReceiver;
use sender::CommandSender;
use std::fmt;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Link lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Socket bound, no vehicle yet
    Unpaired,
    /// Discovery sent, waiting for the reply
    Pairing,
    /// Vehicle accepted the security code
    Paired,
    /// Receive and send loops running
    Running,
    /// Loops joined and socket released
    Stopped,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::Unpaired => "unpaired",
            LinkState::Pairing => "pairing",
            LinkState::Paired => "paired",
            LinkState::Running => "running",
            LinkState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// UDP link to the vehicle
pub struct VehicleLink {
    config: LinkConfig,
    socket: Option<Arc<UdpSocket>>,
    state: LinkState,
    shutdown: Arc<AtomicBool>,
    receiver_thread: Option<JoinHandle<()>>,
    sender_thread: Option<JoinHandle<()>>,
    receiver_alive: Arc<AtomicBool>,
    sender_alive: Arc<AtomicBool>,
    control: Arc<ControlState>,
    vehicle: Arc<VehicleState>,
}

impl VehicleLink {
    /// Bind the persistent socket; the link starts `Unpaired`
    pub fn new(config: LinkConfig) -> Result<Self> {
        let bind = config.local_addr()?;
        let socket = UdpSocket::bind(bind)?;
        socket.set_read_timeout(Some(config.receive_timeout()))?;

        log::info!("Link: bound {}", socket.local_addr()?);

        Ok(Self {
            config,
            socket: Some(Arc::new(socket)),
            state: LinkState::Unpaired,
            shutdown: Arc::new(AtomicBool::new(false)),
            receiver_thread: None,
            sender_thread: None,
            receiver_alive: Arc::new(AtomicBool::new(false)),
            sender_alive: Arc::new(AtomicBool::new(false)),
            control: Arc::new(ControlState::new()),
            vehicle: Arc::new(VehicleState::new()),
        })
    }

    #[inline]
    pub fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Address the persistent socket is bound to (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket()?.local_addr()?)
    }

    /// Control values sent to the vehicle
    pub fn control(&self) -> Arc<ControlState> {
        Arc::clone(&self.control)
    }

    /// Latest telemetry-derived vehicle state
    pub fn vehicle(&self) -> Arc<VehicleState> {
        Arc::clone(&self.vehicle)
    }

    pub fn is_receiver_running(&self) -> bool {
        self.receiver_alive.load(Ordering::Acquire)
    }

    pub fn is_sender_running(&self) -> bool {
        self.sender_alive.load(Ordering::Acquire)
    }

    /// Run the discovery handshake.
    ///
    /// On timeout the link returns to `Unpaired` and pairing may be retried.
    pub fn pair(&mut self) -> Result<()> {
        self.expect_state(LinkState::Unpaired, "pair")?;
        let socket = Arc::clone(self.socket()?);

        self.state = LinkState::Pairing;
        log::info!(
            "Link: pairing as {:?} with code {}",
            self.config.client_name,
            self.config.security_code
        );

        let result = pairing::broadcast_discovery(&self.config)
            .and_then(|()| pairing::await_reply(&socket, &self.config));

        match result {
            Ok(()) => {
                self.state = LinkState::Paired;
                Ok(())
            }
            Err(e) => {
                self.state = LinkState::Unpaired;
                log::error!("Link: pairing failed: {}", e);
                Err(e)
            }
        }
    }

    /// Spawn the receive and send loops
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(LinkState::Paired, "start")?;
        let socket = Arc::clone(self.socket()?);
        let remote = self.config.remote_addr()?;

        self.shutdown.store(false, Ordering::Release);
        self.receiver_alive.store(true, Ordering::Release);
        self.sender_alive.store(true, Ordering::Release);
        // Running before spawn so a spawn failure still goes through stop()
        self.state = LinkState::Running;

        let receiver = TelemetryReceiver::new(
            Arc::clone(&socket),
            Arc::clone(&self.vehicle),
            Arc::clone(&self.shutdown),
            Arc::clone(&self.receiver_alive),
        );
        match thread::Builder::new()
            .name("link-receiver".into())
            .spawn(move || receiver.run())
        {
            Ok(handle) => self.receiver_thread = Some(handle),
            Err(e) => {
                self.receiver_alive.store(false, Ordering::Release);
                self.sender_alive.store(false, Ordering::Release);
                self.stop()?;
                return Err(e.into());
            }
        }

        let sender = CommandSender::new(
            socket,
            remote,
            self.config.send_interval(),
            Arc::clone(&self.control),
            Arc::clone(&self.shutdown),
            Arc::clone(&self.sender_alive),
        );
        match thread::Builder::new()
            .name("link-sender".into())
            .spawn(move || sender.run())
        {
            Ok(handle) => self.sender_thread = Some(handle),
            Err(e) => {
                self.sender_alive.store(false, Ordering::Release);
                self.stop()?;
                return Err(e.into());
            }
        }

        log::info!("Link: running, commands to {}", remote);
        Ok(())
    }

    /// Signal both loops, join them, then release the socket.
    ///
    /// Safe to call from any state and more than once.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == LinkState::Stopped {
            return Ok(());
        }
        log::info!("Link: stopping ({})", self.state);

        self.shutdown.store(true, Ordering::Release);

        let mut panicked = false;
        for (name, handle) in [
            ("receiver", self.receiver_thread.take()),
            ("sender", self.sender_thread.take()),
        ] {
            if let Some(handle) = handle
                && handle.join().is_err()
            {
                log::error!("Link: {} thread panicked", name);
                panicked = true;
            }
        }
        self.receiver_alive.store(false, Ordering::Release);
        self.sender_alive.store(false, Ordering::Release);

        self.socket = None;
        self.state = LinkState::Stopped;
        log::info!("Link: stopped");

        if panicked {
            return Err(Error::ThreadPanic);
        }
        Ok(())
    }

    fn socket(&self) -> Result<&Arc<UdpSocket>> {
        self.socket
            .as_ref()
            .ok_or_else(|| Error::InvalidState("socket already released".into()))
    }

    fn expect_state(&self, expected: LinkState, operation: &str) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState(format!(
                "cannot {} while {} (expected {})",
                operation, self.state, expected
            )));
        }
        Ok(())
    }
}

impl Drop for VehicleLink {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("Link: shutdown error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> LinkConfig {
        LinkConfig {
            local_host: "127.0.0.1".to_string(),
            remote_host: "127.0.0.1".to_string(),
            broadcast_host: "127.0.0.1".to_string(),
            telemetry_port: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_link_is_unpaired() {
        let link = VehicleLink::new(loopback()).unwrap();
        assert_eq!(link.state(), LinkState::Unpaired);
        assert_ne!(link.local_addr().unwrap().port(), 0);
        assert!(!link.is_receiver_running());
        assert!(!link.is_sender_running());
    }

    #[test]
    fn test_start_requires_pairing() {
        let mut link = VehicleLink::new(loopback()).unwrap();
        assert!(matches!(link.start(), Err(Error::InvalidState(_))));
        assert_eq!(link.state(), LinkState::Unpaired);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut link = VehicleLink::new(loopback()).unwrap();
        link.stop().unwrap();
        assert_eq!(link.state(), LinkState::Stopped);
        assert!(link.local_addr().is_err());
        link.stop().unwrap();
        assert!(matches!(link.pair(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LinkState::Running.to_string(), "running");
    }
}
