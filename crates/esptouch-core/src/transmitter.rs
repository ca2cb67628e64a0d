// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Timed transmitter: delivers the guide and datum length lists as UDP
//! datagram sizes against a monotonic clock, rotating across the broadcast
//! address or the first four `234.x.x.x` multicast addresses.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::GUIDE_CODE;

const TARGET_PORT: u16 = 7001;
const BROADCAST_ADDR: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

/// Largest code the wire format can produce (guide code 515, rounded up);
/// the zero-filled send buffer is sized once to this and reused for every
/// datagram so no per-send allocation happens on the hot path.
const MAX_CODE_LEN: usize = 551;

/// Run the full transmit session: `repeat_count` repetitions of a 2s guide
/// phase followed by a 4s datum phase, each phase pacing sends at
/// `config.send_interval` and ending only once the phase's nominal duration
/// has elapsed *and* its cursor has wrapped back to the start.
///
/// Send errors are transient: logged at `warn` and skipped, never
/// propagated — reliability here comes from the repeat count and the
/// guide/datum redundancy, not retries. Socket construction failure is the
/// only fatal error this function returns.
///
/// `running` is polled once per send tick (and once per repeat); clearing it
/// aborts the burst immediately instead of waiting for it to run to
/// completion, mirroring the cancellation flag threaded through the rest of
/// the session.
pub fn run(
    codes: &[u16],
    use_broadcast: bool,
    repeat_count: u32,
    config: &Config,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    let socket = UdpSocket::bind("0.0.0.0:0").map_err(Error::SocketSetup)?;
    if use_broadcast {
        socket
            .set_broadcast(true)
            .map_err(Error::SocketSetup)?;
    }

    let guide = [
        GUIDE_CODE.0,
        GUIDE_CODE.1,
        GUIDE_CODE.2,
        GUIDE_CODE.3,
    ];
    let mut buf = [0u8; MAX_CODE_LEN];
    let mut rotation: u8 = 0;

    log::info!(
        "transmitter starting: {repeat_count} repeats, {} codes/burst, broadcast={use_broadcast}",
        codes.len()
    );

    for repeat in 0..repeat_count {
        if !running.load(Ordering::SeqCst) {
            log::info!("transmitter cancelled before repeat {repeat}");
            break;
        }
        log::debug!("repeat {repeat}: guide phase");
        run_phase(&socket, &guide, config.guide_phase, config, use_broadcast, &mut rotation, &mut buf, running);
        if !running.load(Ordering::SeqCst) {
            log::info!("transmitter cancelled during repeat {repeat}");
            break;
        }
        log::debug!("repeat {repeat}: datum phase");
        run_phase(&socket, codes, config.datum_phase, config, use_broadcast, &mut rotation, &mut buf, running);
    }

    log::info!("transmitter finished after {repeat_count} repeats");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_phase(
    socket: &UdpSocket,
    codes: &[u16],
    nominal_duration: Duration,
    config: &Config,
    use_broadcast: bool,
    rotation: &mut u8,
    buf: &mut [u8],
    running: &Arc<AtomicBool>,
) {
    let start = Instant::now();
    let mut cursor = 0usize;
    let mut next_t = start;

    loop {
        if !running.load(Ordering::SeqCst) {
            return;
        }

        let now = Instant::now();
        if now < next_t {
            spin_sleep::sleep(next_t - now);
            continue;
        }

        let len = codes[cursor] as usize;
        let target = next_target(use_broadcast, *rotation);
        if let Err(err) = socket.send_to(&buf[..len], target) {
            log::warn!("transient send error (len={len}, target={target}): {err}");
        }

        *rotation = (*rotation + 1) % 4;
        cursor = (cursor + 1) % codes.len();
        next_t += config.send_interval;

        if now.duration_since(start) >= nominal_duration && cursor == 0 {
            break;
        }
    }
}

/// Rotating send target: the limited broadcast address, or one of the first
/// four `234.x.x.x` multicast addresses. `rotation` cycles `0..=3` and picks
/// the address independently of how long the code list being sent is.
fn next_target(use_broadcast: bool, rotation: u8) -> SocketAddr {
    if use_broadcast {
        return SocketAddr::from((BROADCAST_ADDR, TARGET_PORT));
    }
    let n = rotation % 4 + 1;
    SocketAddr::from((Ipv4Addr::new(234, n, n, n), TARGET_PORT))
}
