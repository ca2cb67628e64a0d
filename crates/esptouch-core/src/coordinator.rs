// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session coordinator: the crate's public API. Runs the transmitter and
//! listener concurrently for the duration of one provisioning attempt and
//! returns the collected acknowledgements.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::listener::{self, AckRecord};
use crate::request::ProvisionRequest;
use crate::transmitter;

/// Outcome of a provisioning session.
///
/// A tagged variant rather than a bare `Vec`/`Option`, so callers can tell
/// "nothing arrived before the timeout" apart from "the request was invalid
/// and no socket was ever opened" without inspecting an error string.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The listener collected at least one acknowledgement.
    Collected(Vec<AckRecord>),
    /// The receive timeout elapsed with no acknowledgements collected.
    TimedOut,
    /// The session could not run at all (invalid input or socket setup failure).
    Fatal(crate::error::Error),
}

/// Run one provisioning session: encode `request` into its datagram-length
/// stream, spawn the transmitter on a background thread, and block the
/// caller on the listener until it returns.
///
/// `running` is shared with the transmitter and listener and polled inside
/// both of their loops; clearing it (e.g. from a Ctrl+C handler) aborts the
/// session promptly instead of only being noticed once it next starts a new
/// send tick or the caller's own code resumes. Callers with no cancellation
/// source of their own can pass `&Arc::new(AtomicBool::new(true))`.
///
/// The transmitter is best-effort: its thread handle is dropped once the
/// listener returns, so a still-running burst keeps sending to completion
/// in the background but the coordinator does not wait on it. Both sockets
/// close on drop regardless of which path this function returns through.
pub fn run(request: &ProvisionRequest, running: &Arc<AtomicBool>) -> SessionOutcome {
    run_with_config(request, &Config::from_env(), running)
}

/// Like [`run`], but with an explicit [`Config`] instead of reading the
/// environment — primarily useful for tests that need deterministic,
/// fast-running phase durations.
pub fn run_with_config(
    request: &ProvisionRequest,
    config: &Config,
    running: &Arc<AtomicBool>,
) -> SessionOutcome {
    let codes = match request.codes() {
        Ok(codes) => codes,
        Err(err) => return SessionOutcome::Fatal(err),
    };

    let use_broadcast = request.use_broadcast();
    let repeat_count = request.repeat_count();
    let tx_config = *config;
    let tx_running = Arc::clone(running);

    let transmitter_handle = thread::spawn(move || {
        if let Err(err) = transmitter::run(&codes, use_broadcast, repeat_count, &tx_config, &tx_running) {
            log::error!("transmitter failed to start: {err}");
        }
    });

    let result = listener::collect(
        request.expected_results(),
        request.receive_timeout(),
        config,
        running,
    );

    // Best-effort: don't block session teardown on the transmitter, which
    // may still be mid-burst. Its socket is released when the thread exits.
    drop(transmitter_handle);

    match result {
        Ok(records) if records.is_empty() => SessionOutcome::TimedOut,
        Ok(records) => SessionOutcome::Collected(records),
        Err(err) => SessionOutcome::Fatal(err),
    }
}
