// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transmit cadence and buffer tunables.
//!
//! The wire format hardwires these values, but exposing them as
//! environment overrides lets a noisy test network be dialed in without
//! recompiling. Callers that leave the environment unset get exactly the
//! protocol's mandated defaults.

use std::time::Duration;

/// Inter-send pacing. Implementations should neither coalesce sends nor
/// drop below roughly this value on average.
const DEFAULT_SEND_INTERVAL_MS: u64 = 8;
/// Nominal duration of the guide phase within each repeat.
const DEFAULT_GUIDE_PHASE_MS: u64 = 2_000;
/// Nominal duration of the datum phase within each repeat.
const DEFAULT_DATUM_PHASE_MS: u64 = 4_000;
/// Listener `recvfrom` buffer size in bytes.
const DEFAULT_RECV_BUFFER: usize = 4096;

/// Transmit cadence and listener buffer sizing for one session.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub send_interval: Duration,
    pub guide_phase: Duration,
    pub datum_phase: Duration,
    pub recv_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_millis(DEFAULT_SEND_INTERVAL_MS),
            guide_phase: Duration::from_millis(DEFAULT_GUIDE_PHASE_MS),
            datum_phase: Duration::from_millis(DEFAULT_DATUM_PHASE_MS),
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }
}

impl Config {
    /// Build a [`Config`] from the environment, falling back to the wire
    /// defaults for anything unset or unparsable. A malformed override is
    /// logged and ignored rather than failing the session — configuration
    /// is a tuning knob, not a correctness input.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env_u64("ESPTOUCH_SEND_INTERVAL_MS") {
            config.send_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env_u64("ESPTOUCH_GUIDE_PHASE_MS") {
            config.guide_phase = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env_u64("ESPTOUCH_DATUM_PHASE_MS") {
            config.datum_phase = Duration::from_millis(ms);
        }
        if let Some(n) = read_env_u64("ESPTOUCH_RECV_BUFFER") {
            config.recv_buffer = n as usize;
        }

        config
    }
}

fn read_env_u64(key: &str) -> Option<u64> {
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("ignoring malformed {key}={raw:?}, using default");
                None
            }
        },
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let config = Config::default();
        assert_eq!(config.send_interval, Duration::from_millis(8));
        assert_eq!(config.guide_phase, Duration::from_secs(2));
        assert_eq!(config.datum_phase, Duration::from_secs(4));
        assert_eq!(config.recv_buffer, 4096);
    }
}
