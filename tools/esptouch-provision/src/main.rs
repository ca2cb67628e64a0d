// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! esptouch-provision - ESPTouch/SmartConfig Wi-Fi provisioning CLI
//!
//! Thin wrapper around `esptouch-core`: parses arguments, prompts for
//! anything missing, drives one provisioning session, and reports the
//! devices that joined.

use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use dialoguer::{Input, Password};
use esptouch_core::{parse_bssid, ProvisionRequest, SessionOutcome};

/// Provision an Espressif Wi-Fi module over ESPTouch/SmartConfig
#[derive(Parser, Debug)]
#[command(name = "esptouch-provision")]
#[command(version)]
#[command(about = "Inject Wi-Fi credentials into an unconfigured ESPTouch device")]
struct Args {
    /// IP address the device should contact after joining the network
    #[arg(long)]
    server_ip: Option<String>,

    /// Wi-Fi SSID (2.4GHz only)
    #[arg(long)]
    ssid: Option<String>,

    /// Wi-Fi password
    #[arg(long)]
    password: Option<String>,

    /// Target AP BSSID (MAC), optional — improves receiver lock
    #[arg(long)]
    bssid: Option<String>,

    /// Expected number of devices (0 = collect until timeout)
    ///
    /// Parsed by hand rather than typed directly on this struct: a clap
    /// derive-level type mismatch exits with clap's own usage-error code
    /// (2), which collides with the "timed out with no results" exit code
    /// this CLI also uses. Validating by hand after `Args::parse()` keeps
    /// every malformed-input path on the same exit code (1).
    #[arg(long, default_value = "1")]
    count: String,

    /// Receive timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: String,

    /// Transmit repeat loops
    #[arg(long, default_value = "8")]
    repeat: String,

    /// Use multicast instead of the limited broadcast address
    #[arg(long)]
    multicast: bool,

    /// Output the final result as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Suppress progress messages (result/error output is unaffected)
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}: {err}", "Error".red().bold());
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    if !args.quiet && !args.json {
        eprintln!("{} ESPTouch provisioning", ">>>".green().bold());
    }

    let server_ip = match &args.server_ip {
        Some(raw) => parse_server_ip(raw)?,
        None => prompt_server_ip()?,
    };
    let count: usize = args
        .count
        .trim()
        .parse()
        .map_err(|e| format!("invalid --count {:?}: {e}", args.count))?;
    let timeout_secs: u64 = args
        .timeout
        .trim()
        .parse()
        .map_err(|e| format!("invalid --timeout {:?}: {e}", args.timeout))?;
    let repeat: u32 = args
        .repeat
        .trim()
        .parse()
        .map_err(|e| format!("invalid --repeat {:?}: {e}", args.repeat))?;
    let ssid = match &args.ssid {
        Some(s) => s.clone(),
        None => Input::<String>::new()
            .with_prompt("SSID")
            .interact_text()?,
    };
    let password = match &args.password {
        Some(p) => p.clone(),
        None => Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?,
    };
    let bssid_input = match &args.bssid {
        Some(b) => Some(b.clone()),
        None => {
            let raw: String = Input::new()
                .with_prompt("BSSID (optional, press Enter to skip)")
                .allow_empty(true)
                .interact_text()?;
            if raw.trim().is_empty() {
                None
            } else {
                Some(raw)
            }
        }
    };
    let bssid = parse_bssid(bssid_input.as_deref())?;

    let request = ProvisionRequest::new(
        ssid,
        password,
        bssid,
        server_ip,
        repeat,
        !args.multicast,
        count,
        Duration::from_secs(timeout_secs),
    )?;

    if !args.quiet && !args.json {
        eprintln!(
            "{}",
            "    Provisioning... (make sure the device is in SmartConfig mode)".dimmed()
        );
    }

    if !running.load(Ordering::SeqCst) {
        return Ok(ExitCode::from(1));
    }

    let outcome = esptouch_core::run(&request, &running);

    // The coordinator returns whatever it collected up to the point of
    // cancellation rather than a distinct "interrupted" variant; checking
    // the shared flag here is how the CLI tells "the operator aborted"
    // apart from "the listener simply timed out" so it can honor the
    // documented exit code for each.
    if !running.load(Ordering::SeqCst) {
        if !args.quiet && !args.json {
            eprintln!("{}", "Interrupted".yellow());
        }
        return Ok(ExitCode::from(1));
    }

    match outcome {
        SessionOutcome::Collected(records) => {
            if args.json {
                print_json(&records);
            } else {
                println!("Devices reported:");
                for r in &records {
                    println!("- mac={} ip={}", r.mac, r.ip);
                }
            }
            Ok(ExitCode::from(0))
        }
        SessionOutcome::TimedOut => {
            if args.json {
                print_json(&[]);
            } else if !args.quiet {
                println!(
                    "Please check the device display or server logs to confirm configuration."
                );
            }
            Ok(ExitCode::from(2))
        }
        SessionOutcome::Fatal(err) => Err(Box::new(err)),
    }
}

fn prompt_server_ip() -> Result<Ipv4Addr, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt("Server IP (the device should connect here after joining)")
        .interact_text()?;
    parse_server_ip(&raw)
}

fn parse_server_ip(raw: &str) -> Result<Ipv4Addr, Box<dyn std::error::Error>> {
    raw.trim()
        .parse()
        .map_err(|e| format!("invalid --server-ip {raw:?}: {e}").into())
}

fn print_json(records: &[esptouch_core::AckRecord]) {
    let payload = serde_json::json!({ "devices": records });
    println!("{payload}");
}
