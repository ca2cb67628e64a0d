// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frame builder: assembles the guide sequence and datum header, interleaves
//! BSSID bytes with payload bytes, and emits the ordered list of datagram
//! lengths that carry the credentials.

use crate::codec::{encode_byte, MAX_SEQ};
use crate::crc::crc8;
use crate::error::{Error, Result};

/// The four-length preamble that tells a listening device a datum burst is
/// about to begin. Constant for the protocol, never recomputed.
pub const GUIDE_CODE: (u16, u16, u16, u16) = (515, 514, 513, 512);

/// The 5-byte datum header: `(total_len, pass_len, ssid_crc, bssid_crc, total_xor)`.
pub fn datum_header(ssid: &[u8], password: &[u8], bssid: &[u8], data: &[u8]) -> [u8; 5] {
    let total_len = (5 + data.len()) as u8;
    let pass_len = password.len() as u8;
    let ssid_crc = crc8(ssid);
    let bssid_crc = crc8(bssid);
    let mut total_xor = total_len ^ pass_len ^ ssid_crc ^ bssid_crc;
    for &b in data {
        total_xor ^= b;
    }
    [total_len, pass_len, ssid_crc, bssid_crc, total_xor]
}

/// Build the full ordered list of datagram lengths for one datum burst.
///
/// `data` must already be `server_ipv4 ‖ password ‖ ssid`; this function
/// does not reassemble it, so the same `data` can be reused across tests
/// without re-deriving it from a full request.
///
/// Returns [`Error::InvalidInput`] if the header, data, and BSSID bytes
/// combined would push a sequence number above 127 — a frame-builder
/// invariant, checked here rather than deep inside the codec, so oversized
/// requests fail before any encoding work happens.
pub fn prepare_codes(ssid: &[u8], password: &[u8], bssid: &[u8], data: &[u8]) -> Result<Vec<u16>> {
    let header = datum_header(ssid, password, bssid, data);
    let max_seq = header.len() + data.len() + bssid.len();
    if max_seq > usize::from(MAX_SEQ) + 1 {
        return Err(Error::InvalidInput(format!(
            "request requires sequence number {}, exceeding the 7-bit ceiling of {}",
            max_seq - 1,
            MAX_SEQ
        )));
    }

    let mut codes = Vec::with_capacity(3 * max_seq);

    let mut seq: u8 = 0;
    for &h in &header {
        let (l1, l2, l3) = encode_byte(h, seq)?;
        codes.extend([l1, l2, l3]);
        seq += 1;
    }

    let mut bssid_seq = (header.len() + data.len()) as u8;
    let mut bssid_idx = 0usize;
    for (data_idx, &d) in data.iter().enumerate() {
        if data_idx % 4 == 0 && bssid_idx < bssid.len() {
            let (l1, l2, l3) = encode_byte(bssid[bssid_idx], bssid_seq)?;
            codes.extend([l1, l2, l3]);
            bssid_seq += 1;
            bssid_idx += 1;
        }

        let (l1, l2, l3) = encode_byte(d, seq)?;
        codes.extend([l1, l2, l3]);
        seq += 1;
    }

    while bssid_idx < bssid.len() {
        let (l1, l2, l3) = encode_byte(bssid[bssid_idx], bssid_seq)?;
        codes.extend([l1, l2, l3]);
        bssid_seq += 1;
        bssid_idx += 1;
    }

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guide_constant() {
        assert_eq!(GUIDE_CODE, (515, 514, 513, 512));
    }

    #[test]
    fn minimal_datum() {
        // ssid="A", password="", bssid="", server_ip=0.0.0.0
        let data = [0u8, 0, 0, 0, b'A'];
        let header = datum_header(b"A", b"", b"", &data);
        assert_eq!(header[0], 10); // total_len = 5 + 5
        assert_eq!(header[1], 0); // pass_len
        assert_eq!(header[3], 0); // bssid_crc, empty bssid
        let codes = prepare_codes(b"A", b"", b"", &data).unwrap();
        assert_eq!(codes.len(), 30); // 3 * 10
    }

    #[test]
    fn length_matches_header_plus_data_plus_bssid() {
        let bssid = [0u8, 1, 2, 3, 4, 5];
        let data: Vec<u8> = (0..20).collect();
        let codes = prepare_codes(b"myssid", b"hunter2", &bssid, &data).unwrap();
        assert_eq!(codes.len(), 3 * (5 + data.len() + bssid.len()));
    }

    #[test]
    fn purity() {
        let bssid = [0u8, 1, 2, 3, 4, 5];
        let data: Vec<u8> = (0..12).collect();
        let a = prepare_codes(b"net", b"pw", &bssid, &data).unwrap();
        let b = prepare_codes(b"net", b"pw", &bssid, &data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bssid_fully_interleaved_when_data_is_long_enough() {
        // 6 BSSID bytes, 20 data bytes: BSSID consumed at data indices 0,4,8,12,16.
        let bssid: Vec<u8> = (0..6).collect();
        let data: Vec<u8> = (0..20).collect();
        let codes = prepare_codes(b"x", b"", &bssid, &data).unwrap();
        assert_eq!(codes.len(), 3 * (5 + 20 + 6));
    }

    #[test]
    fn bssid_drains_after_data_when_data_is_short() {
        // 6 BSSID bytes, 8 data bytes: indices 0 and 4 consume 2, drain emits 4 more.
        let bssid: Vec<u8> = (0..6).collect();
        let data: Vec<u8> = (0..8).collect();
        let codes = prepare_codes(b"x", b"", &bssid, &data).unwrap();
        assert_eq!(codes.len(), 3 * (5 + 8 + 6));
    }

    #[test]
    fn rejects_request_that_would_overflow_sequence_space() {
        // header(5) + data + bssid must stay within the 128-slot sequence space.
        let data = vec![0u8; 200];
        let err = prepare_codes(b"x", b"", b"", &data).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
