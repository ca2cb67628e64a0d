// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The immutable provisioning request: validated SSID/password/BSSID/server
//! address plus the session-shape knobs (repeat count, broadcast vs
//! multicast, expected result count, receive timeout).

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::frame::prepare_codes;

/// Maximum SSID length accepted by the wire format.
pub const MAX_SSID_LEN: usize = 32;
/// Maximum password length accepted by the wire format.
pub const MAX_PASSWORD_LEN: usize = 64;
/// BSSID is either absent or exactly one MAC address.
pub const BSSID_LEN: usize = 6;

/// A validated, immutable provisioning request.
///
/// Constructed once by the caller (CLI layer or any other embedder), consumed
/// once by the session coordinator, and dropped when the session returns.
/// Nothing in this crate mutates a `ProvisionRequest` after construction.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    ssid: Vec<u8>,
    password: Vec<u8>,
    bssid: Vec<u8>,
    server_ipv4: Ipv4Addr,
    repeat_count: u32,
    use_broadcast: bool,
    expected_results: usize,
    receive_timeout: Duration,
}

impl ProvisionRequest {
    /// Validate and construct a request.
    ///
    /// `bssid` must be empty or exactly [`BSSID_LEN`] bytes; use
    /// [`parse_bssid`] to convert a hex string from the CLI layer first.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ssid: impl Into<Vec<u8>>,
        password: impl Into<Vec<u8>>,
        bssid: impl Into<Vec<u8>>,
        server_ipv4: Ipv4Addr,
        repeat_count: u32,
        use_broadcast: bool,
        expected_results: usize,
        receive_timeout: Duration,
    ) -> Result<Self> {
        let ssid = ssid.into();
        let password = password.into();
        let bssid = bssid.into();

        if ssid.is_empty() {
            return Err(Error::InvalidInput("ssid must not be empty".into()));
        }
        if ssid.len() > MAX_SSID_LEN {
            return Err(Error::InvalidInput(format!(
                "ssid is {} bytes, exceeding the {MAX_SSID_LEN}-byte limit",
                ssid.len()
            )));
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(Error::InvalidInput(format!(
                "password is {} bytes, exceeding the {MAX_PASSWORD_LEN}-byte limit",
                password.len()
            )));
        }
        if !bssid.is_empty() && bssid.len() != BSSID_LEN {
            return Err(Error::InvalidInput(format!(
                "bssid must be empty or exactly {BSSID_LEN} bytes, got {}",
                bssid.len()
            )));
        }
        if repeat_count == 0 {
            return Err(Error::InvalidInput("repeat_count must be positive".into()));
        }

        let request = Self {
            ssid,
            password,
            bssid,
            server_ipv4,
            repeat_count,
            use_broadcast,
            expected_results,
            receive_timeout,
        };

        // Validate up front that the derived frame fits the 7-bit sequence
        // space, so a caller never opens a socket for a doomed request.
        request.codes()?;

        Ok(request)
    }

    /// `server_ipv4 ‖ password ‖ ssid`, in that order — the payload the
    /// datum header and frame builder operate on.
    fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + self.password.len() + self.ssid.len());
        data.extend_from_slice(&self.server_ipv4.octets());
        data.extend_from_slice(&self.password);
        data.extend_from_slice(&self.ssid);
        data
    }

    /// Encode this request into its ordered list of datagram lengths.
    pub fn codes(&self) -> Result<Vec<u16>> {
        prepare_codes(&self.ssid, &self.password, &self.bssid, &self.data())
    }

    pub fn bssid(&self) -> &[u8] {
        &self.bssid
    }

    pub fn use_broadcast(&self) -> bool {
        self.use_broadcast
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn expected_results(&self) -> usize {
        self.expected_results
    }

    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }
}

/// Parse a BSSID from a hex string with optional `:` or `-` separators.
///
/// An empty or absent string means "no BSSID bytes in the stream" and
/// returns an empty vector. Odd-length or non-hex input after separator
/// stripping is [`Error::InvalidInput`].
pub fn parse_bssid(bssid: Option<&str>) -> Result<Vec<u8>> {
    let Some(bssid) = bssid else {
        return Ok(Vec::new());
    };
    let cleaned: String = bssid.chars().filter(|&c| c != ':' && c != '-').collect();
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }
    if cleaned.len() % 2 != 0 {
        return Err(Error::InvalidInput(
            "bssid hex string must have even length".into(),
        ));
    }

    let mut bytes = Vec::with_capacity(cleaned.len() / 2);
    for chunk in cleaned.as_bytes().chunks(2) {
        let pair = std::str::from_utf8(chunk).map_err(|_| {
            Error::InvalidInput("bssid must contain only hex digits".into())
        })?;
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|_| Error::InvalidInput(format!("invalid hex byte in bssid: {pair}")))?;
        bytes.push(byte);
    }

    if bytes.len() != BSSID_LEN {
        return Err(Error::InvalidInput(format!(
            "bssid must decode to exactly {BSSID_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_request(bssid: &[u8]) -> Result<ProvisionRequest> {
        ProvisionRequest::new(
            "home-network",
            "hunter2",
            bssid.to_vec(),
            Ipv4Addr::new(192, 168, 1, 10),
            8,
            true,
            1,
            Duration::from_secs(30),
        )
    }

    #[test]
    fn accepts_minimal_request() {
        assert!(default_request(&[]).is_ok());
    }

    #[test]
    fn accepts_full_bssid() {
        assert!(default_request(&[0, 1, 2, 3, 4, 5]).is_ok());
    }

    #[test]
    fn rejects_empty_ssid() {
        let err = ProvisionRequest::new(
            "",
            "",
            vec![],
            Ipv4Addr::UNSPECIFIED,
            1,
            true,
            0,
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_oversized_ssid() {
        let err = ProvisionRequest::new(
            vec![b'a'; MAX_SSID_LEN + 1],
            "",
            vec![],
            Ipv4Addr::UNSPECIFIED,
            1,
            true,
            0,
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_partial_bssid() {
        assert!(default_request(&[0, 1, 2]).is_err());
    }

    #[test]
    fn rejects_zero_repeat_count() {
        let err = ProvisionRequest::new(
            "net",
            "",
            vec![],
            Ipv4Addr::UNSPECIFIED,
            0,
            true,
            0,
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn bssid_parsing_accepts_equivalent_forms() {
        let colons = parse_bssid(Some("AA:BB:CC:DD:EE:FF")).unwrap();
        let dashes = parse_bssid(Some("aa-bb-cc-dd-ee-ff")).unwrap();
        let bare = parse_bssid(Some("aabbccddeeff")).unwrap();
        assert_eq!(colons, vec![0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(colons, dashes);
        assert_eq!(colons, bare);
    }

    #[test]
    fn bssid_parsing_treats_empty_and_none_as_no_bssid() {
        assert_eq!(parse_bssid(None).unwrap(), Vec::<u8>::new());
        assert_eq!(parse_bssid(Some("")).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn bssid_parsing_rejects_odd_length_hex() {
        assert!(parse_bssid(Some("aabbc")).is_err());
    }

    #[test]
    fn bssid_parsing_rejects_non_hex() {
        assert!(parse_bssid(Some("zzbbccddeeff")).is_err());
    }
}
