// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Result listener: binds the fixed ack port, deduplicates incoming
//! datagrams, and decodes the device MAC and acquired IP from each.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{Error, Result};

/// Fixed UDP port the listener binds for the session duration.
pub const LISTEN_PORT: u16 = 18266;

/// Minimum ack datagram length: 1 reserved byte + 6 MAC bytes + 4 IP bytes.
const MIN_ACK_LEN: usize = 11;

/// Longest single `recv_from` wait before re-checking the deadline and the
/// cancellation flag. Keeps the listener responsive to an operator abort
/// even when `receive_timeout` is long.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One decoded acknowledgement from a provisioned device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AckRecord {
    /// 12 lowercase hex characters, no separators.
    pub mac: String,
    /// Dotted-quad IPv4 address.
    pub ip: String,
}

/// Collect acks until `receive_timeout` elapses, `expected_results` (if
/// nonzero) have been collected, or `running` is cleared.
///
/// A `receive_timeout` of zero is valid — any packet not already queued on
/// the socket is simply missed, consistent with the wire protocol's "duration,
/// ≥ 0" allowance.
///
/// The socket's own read timeout is capped at [`POLL_INTERVAL`] rather than
/// set once to the full `receive_timeout`, so an operator clearing `running`
/// mid-wait is noticed within one tick instead of only once the whole
/// timeout has elapsed.
pub fn collect(
    expected_results: usize,
    receive_timeout: Duration,
    config: &Config,
    running: &Arc<AtomicBool>,
) -> Result<Vec<AckRecord>> {
    let socket = UdpSocket::bind(("0.0.0.0", LISTEN_PORT)).map_err(Error::SocketSetup)?;

    let mut results = Vec::new();
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    let mut buf = vec![0u8; config.recv_buffer];
    let deadline = Instant::now() + receive_timeout;

    log::info!("listener bound on 0.0.0.0:{LISTEN_PORT}, expecting {expected_results} result(s)");

    loop {
        if !running.load(Ordering::SeqCst) {
            log::debug!("listener cancelled with {} result(s) collected", results.len());
            break;
        }

        let now = Instant::now();
        if now >= deadline {
            log::debug!("listener timed out with {} result(s) collected", results.len());
            break;
        }

        let tick = (deadline - now).min(POLL_INTERVAL);
        socket
            .set_read_timeout(Some(tick.max(Duration::from_nanos(1))))
            .map_err(Error::SocketSetup)?;

        let len = match socket.recv_from(&mut buf) {
            Ok((len, _addr)) => len,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                continue;
            }
            Err(err) => {
                log::warn!("listener recv error, continuing: {err}");
                continue;
            }
        };

        let datagram = &buf[..len];
        if !seen.insert(datagram.to_vec()) {
            continue;
        }

        if let Some(record) = decode_ack(datagram) {
            log::debug!("ack received: mac={} ip={}", record.mac, record.ip);
            results.push(record);
        }

        if expected_results > 0 && results.len() >= expected_results {
            break;
        }
    }

    Ok(results)
}

/// Decode one ack datagram, or `None` if it is shorter than [`MIN_ACK_LEN`].
///
/// Bytes between the MAC (offset 1..7) and the trailing IP (last 4 bytes)
/// are ignored; their meaning is not documented upstream and this crate
/// preserves that rule exactly rather than guessing at it.
fn decode_ack(datagram: &[u8]) -> Option<AckRecord> {
    if datagram.len() < MIN_ACK_LEN {
        return None;
    }
    let mac_bytes = &datagram[1..7];
    let ip_bytes = &datagram[datagram.len() - 4..];

    let mac = mac_bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<String>();
    let ip = ip_bytes
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(".");

    Some(AckRecord { mac, ip })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_ack() {
        let datagram = [
            0x01, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x00, 192, 168, 1, 42,
        ];
        let record = decode_ack(&datagram).unwrap();
        assert_eq!(record.mac, "aabbccddeeff");
        assert_eq!(record.ip, "192.168.1.42");
    }

    #[test]
    fn rejects_short_datagram() {
        assert!(decode_ack(&[0u8; 10]).is_none());
    }

    #[test]
    fn tolerates_exactly_minimum_length() {
        let datagram = [0x00, 1, 2, 3, 4, 5, 6, 10, 20, 30, 40];
        assert!(decode_ack(&datagram).is_some());
    }

    #[test]
    fn ignores_middle_bytes() {
        let a = [0x01, 1, 2, 3, 4, 5, 6, 0xFF, 10, 20, 30, 40];
        let b = [0x01, 1, 2, 3, 4, 5, 6, 0x00, 10, 20, 30, 40];
        assert_eq!(decode_ack(&a), decode_ack(&b));
    }
}
