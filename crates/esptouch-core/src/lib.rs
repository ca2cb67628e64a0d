// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # esptouch-core
//!
//! Protocol core for ESPTouch/SmartConfig: a one-way wireless-credential
//! injection scheme that delivers a Wi-Fi SSID, passphrase, target server
//! address, and optional BSSID to an unconfigured Espressif-family Wi-Fi
//! module by modulating UDP datagram *lengths*. A module in promiscuous
//! mode recovers the bytes from packet sizes alone, without ever joining
//! the network — so the credentials never cross the air as payload.
//!
//! ## Quick start
//!
//! ```no_run
//! use esptouch_core::{ProvisionRequest, SessionOutcome};
//! use std::net::Ipv4Addr;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let request = ProvisionRequest::new(
//!     "my-network",
//!     "hunter2",
//!     vec![],
//!     Ipv4Addr::new(192, 168, 1, 10),
//!     8,
//!     true,
//!     1,
//!     Duration::from_secs(30),
//! )?;
//!
//! // Pass a real Ctrl+C-driven flag to allow cancelling mid-session; a
//! // flag that never flips simply runs the session to completion.
//! let running = Arc::new(AtomicBool::new(true));
//!
//! match esptouch_core::run(&request, &running) {
//!     SessionOutcome::Collected(records) => {
//!         for r in records {
//!             println!("{} joined at {}", r.mac, r.ip);
//!         }
//!     }
//!     SessionOutcome::TimedOut => println!("no devices reported in"),
//!     SessionOutcome::Fatal(err) => eprintln!("provisioning failed: {err}"),
//! }
//! # Ok::<(), esptouch_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------------------+
//! |                       ProvisionRequest                          |
//! +-----------------------------------------------------------------+
//! |  crc  ->  codec  ->  frame::prepare_codes  (pure, deterministic) |
//! +-----------------------------------------------------------------+
//! |         transmitter (thread)      |       listener (blocking)   |
//! |   paced UDP sends, broadcast or   |   dedup + decode acks on     |
//! |   234.x.x.x multicast rotation    |   0.0.0.0:18266              |
//! +-----------------------------------------------------------------+
//! |                    coordinator::run  (public API)               |
//! +-----------------------------------------------------------------+
//! ```
//!
//! ## Modules
//!
//! - [`crc`] - CRC-8 (poly 0x8C, reflected 0x31) checksum primitive
//! - [`codec`] - one-byte-to-three-lengths encoder
//! - [`frame`] - header assembly, BSSID interleave, full code-list builder
//! - [`request`] - validated, immutable [`ProvisionRequest`]
//! - [`config`] - environment-overridable cadence/buffer tunables
//! - [`transmitter`] - timed UDP send loop
//! - [`listener`] - ack collection and decoding
//! - [`coordinator`] - runs transmitter + listener concurrently

pub mod codec;
pub mod config;
pub mod coordinator;
pub mod crc;
pub mod error;
pub mod frame;
pub mod listener;
pub mod request;
pub mod transmitter;

pub use config::Config;
pub use coordinator::{run, run_with_config, SessionOutcome};
pub use error::{Error, Result};
pub use listener::AckRecord;
pub use request::{parse_bssid, ProvisionRequest};
