// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests driving the listener over a real loopback UDP socket.
//!
//! Both scenarios bind the listener's fixed port (18266), so they run as
//! one `#[test]` rather than two — the wire protocol requires that port to be
//! held by a single session at a time, and `cargo test` runs `#[test]`
//! functions in separate threads by default.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use esptouch_core::{listener, Config};

fn fake_ack(mac: [u8; 6], ip: [u8; 4]) -> Vec<u8> {
    let mut datagram = vec![0x01];
    datagram.extend_from_slice(&mac);
    datagram.push(0x00);
    datagram.push(0x00);
    datagram.extend_from_slice(&ip);
    datagram
}

#[test]
fn listener_over_loopback() {
    let dest: SocketAddr = "127.0.0.1:18266".parse().unwrap();

    // Early exit: returns as soon as the expected result count arrives,
    // well before the generous timeout.
    {
        let sender = UdpSocket::bind("0.0.0.0:0").expect("sender socket");
        let running = Arc::new(AtomicBool::new(true));
        let handle = thread::spawn({
            let running = Arc::clone(&running);
            move || {
                let start = Instant::now();
                let records =
                    listener::collect(1, Duration::from_secs(10), &Config::default(), &running)
                        .expect("listener should not fail");
                (records, start.elapsed())
            }
        });

        thread::sleep(Duration::from_millis(100));
        sender
            .send_to(&fake_ack([0xAA; 6], [10, 0, 0, 1]), dest)
            .expect("send ack");

        let (records, elapsed) = handle.join().expect("listener thread panicked");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mac, "aaaaaaaaaaaa");
        assert_eq!(records[0].ip, "10.0.0.1");
        assert!(
            elapsed < Duration::from_secs(5),
            "listener should return as soon as the expected result arrives, took {elapsed:?}"
        );
    }

    // Dedup: five identical datagrams collapse to one record.
    {
        let sender = UdpSocket::bind("0.0.0.0:0").expect("sender socket");
        let running = Arc::new(AtomicBool::new(true));
        let handle = thread::spawn({
            let running = Arc::clone(&running);
            move || {
                listener::collect(0, Duration::from_millis(500), &Config::default(), &running)
                    .expect("listener should not fail")
            }
        });

        thread::sleep(Duration::from_millis(100));
        let datagram = fake_ack([0xBB; 6], [10, 0, 0, 2]);
        for _ in 0..5 {
            sender.send_to(&datagram, dest).expect("send ack");
        }

        let records = handle.join().expect("listener thread panicked");
        assert_eq!(records.len(), 1, "repeated datagrams must dedupe to one record");
    }

    // Cancellation: clearing `running` returns well before a long timeout.
    {
        let running = Arc::new(AtomicBool::new(true));
        let handle = thread::spawn({
            let running = Arc::clone(&running);
            move || {
                let start = Instant::now();
                let records =
                    listener::collect(0, Duration::from_secs(30), &Config::default(), &running)
                        .expect("listener should not fail");
                (records, start.elapsed())
            }
        });

        thread::sleep(Duration::from_millis(100));
        running.store(false, std::sync::atomic::Ordering::SeqCst);

        let (records, elapsed) = handle.join().expect("listener thread panicked");
        assert!(records.is_empty());
        assert!(
            elapsed < Duration::from_secs(1),
            "listener should notice cancellation within one poll tick, took {elapsed:?}"
        );
    }
}
