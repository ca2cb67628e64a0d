// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the ESPTouch protocol core.

use std::fmt;

/// Result type for fallible ESPTouch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or running a provisioning session.
#[derive(Debug)]
pub enum Error {
    /// Malformed BSSID, non-IPv4 server address, oversized SSID/password, or a
    /// request whose derived sequence numbers would exceed 127. Fails the
    /// session before any socket is opened.
    InvalidInput(String),

    /// Socket creation, bind, or broadcast-option setup failed. Fatal to the
    /// session.
    SocketSetup(std::io::Error),

    /// A sequence number outside `0..=127` reached the byte codec. Indicates a
    /// frame-builder bug, not a user input problem.
    ProgrammerError(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid provisioning input: {msg}"),
            Self::SocketSetup(err) => write!(f, "socket setup failed: {err}"),
            Self::ProgrammerError(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SocketSetup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::SocketSetup(err)
    }
}
