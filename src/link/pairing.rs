//! Discovery handshake
//!
//! The client broadcasts `"<protocol-id>|<client-name>|<security-code>"` to
//! the vehicle's command port from a short-lived broadcast socket, then waits
//! on the persistent socket for `"<protocol-id>|<security-code>"`.

use super::constants::RECV_BUFFER_SIZE;
use super::packet::{discovery_reply, discovery_request};
use crate::config::LinkConfig;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::Instant;

/// Send the discovery datagram from a transient broadcast socket
pub fn broadcast_discovery(config: &LinkConfig) -> Result<()> {
    let message = discovery_request(&config.protocol_id, &config.client_name, config.security_code);
    let target = config.broadcast_addr()?;

    let socket = UdpSocket::bind((config.local_host.as_str(), 0))?;
    socket.set_broadcast(true)?;
    socket.send_to(message.as_bytes(), target)?;

    log::debug!("Pairing: sent {:?} to {}", message, target);
    Ok(())
}

/// Wait on `socket` until the expected reply arrives or the pairing window
/// (one receive timeout) runs out.
///
/// Datagrams that are not the exact reply are ignored. The socket's read
/// timeout is restored before returning.
pub fn await_reply(socket: &UdpSocket, config: &LinkConfig) -> Result<()> {
    let expected = discovery_reply(&config.protocol_id, config.security_code);
    let window = config.receive_timeout();
    let deadline = Instant::now() + window;
    let mut buffer = [0u8; RECV_BUFFER_SIZE];

    let result = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break Err(Error::PairingTimeout {
                security_code: config.security_code,
            });
        }
        socket.set_read_timeout(Some(remaining))?;

        match socket.recv_from(&mut buffer) {
            Ok((len, from)) => {
                if &buffer[..len] == expected.as_bytes() {
                    log::info!(
                        "Pairing: vehicle at {} accepted code {}",
                        from,
                        config.security_code
                    );
                    break Ok(());
                }
                log::debug!("Pairing: ignoring {} byte datagram from {}", len, from);
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => break Err(e.into()),
        }
    };

    socket.set_read_timeout(Some(window))?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config(vehicle_port: u16, timeout_ms: u64) -> LinkConfig {
        LinkConfig {
            security_code: 46611,
            local_host: "127.0.0.1".to_string(),
            remote_host: "127.0.0.1".to_string(),
            broadcast_host: "127.0.0.1".to_string(),
            command_port: vehicle_port,
            telemetry_port: 0,
            receive_timeout_ms: timeout_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_discovery_reaches_vehicle_port() {
        let vehicle = UdpSocket::bind("127.0.0.1:0").unwrap();
        vehicle.set_read_timeout(Some(std::time::Duration::from_secs(2))).unwrap();
        let config = loopback_config(vehicle.local_addr().unwrap().port(), 100);

        broadcast_discovery(&config).unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = vehicle.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"beamng|lane-autopilot|46611");
    }

    #[test]
    fn test_reply_accepted_after_noise() {
        let local = UdpSocket::bind("127.0.0.1:0").unwrap();
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = loopback_config(peer.local_addr().unwrap().port(), 1000);

        let to = local.local_addr().unwrap();
        peer.send_to(b"beamng|12345", to).unwrap();
        peer.send_to(&[0u8; 96], to).unwrap();
        peer.send_to(b"beamng|46611", to).unwrap();

        assert!(await_reply(&local, &config).is_ok());
    }

    #[test]
    fn test_wrong_code_times_out() {
        let local = UdpSocket::bind("127.0.0.1:0").unwrap();
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = loopback_config(peer.local_addr().unwrap().port(), 100);

        peer.send_to(b"beamng|99999", local.local_addr().unwrap()).unwrap();

        let started = Instant::now();
        let result = await_reply(&local, &config);
        assert!(matches!(
            result,
            Err(Error::PairingTimeout {
                security_code: 46611
            })
        ));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(
            local.read_timeout().unwrap(),
            Some(std::time::Duration::from_millis(100))
        );
    }
}
