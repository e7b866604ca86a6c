// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loopback send/receive tests for the one-shot TLS channel.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use lockbox_core::{LockboxError, NetworkErrorKind, PlaintextEntry};
use lockbox_transfer::{
    generate_identity, receive, receive_entry, send, share_entry, CertificateProvisioner,
    Identity, ReceiveOptions, Receiver, SendOptions, DEFAULT_PORT,
};
use serial_test::serial;
use tempfile::tempdir;

fn identity() -> &'static Identity {
    static IDENTITY: OnceLock<Identity> = OnceLock::new();
    IDENTITY.get_or_init(|| generate_identity("localhost").unwrap())
}

fn loopback_receiver() -> (Receiver, u16) {
    let receiver = Receiver::bind("127.0.0.1", 0, identity()).unwrap();
    let port = receiver.local_addr().unwrap().port();
    (receiver, port)
}

/// Provisioner backed by files pre-seeded with the shared identity.
fn seeded_provisioner(dir: &std::path::Path) -> CertificateProvisioner {
    let provisioner = CertificateProvisioner::new(dir.join("cert.pem"), dir.join("key.pem"));
    std::fs::write(provisioner.cert_path(), identity().cert_pem()).unwrap();
    std::fs::write(provisioner.key_path(), identity().key_pem()).unwrap();
    provisioner
}

#[test]
fn payload_arrives_byte_for_byte() {
    let (receiver, port) = loopback_receiver();
    let payload = br#"{"service":"gmail","username":"a","password":"b"}"#;
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));

    send(payload, "127.0.0.1", port, &SendOptions::default()).unwrap();
    assert_eq!(handle.join().unwrap().unwrap(), payload.to_vec());
}

#[test]
fn sender_does_not_check_certificate_name() {
    let other = generate_identity("some-other-host.example").unwrap();
    let receiver = Receiver::bind("127.0.0.1", 0, &other).unwrap();
    let port = receiver.local_addr().unwrap().port();
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));

    send(b"{}", "localhost", port, &SendOptions::default()).unwrap();
    assert_eq!(handle.join().unwrap().unwrap(), b"{}");
}

#[test]
fn empty_send_yields_empty_payload() {
    let (receiver, port) = loopback_receiver();
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));

    send(b"", "127.0.0.1", port, &SendOptions::default()).unwrap();
    assert!(handle.join().unwrap().unwrap().is_empty());
}

#[test]
fn oversized_payload_is_cut_at_cap() {
    let (receiver, port) = loopback_receiver();
    let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    let sent = payload.clone();
    let sender = thread::spawn(move || send(&sent, "127.0.0.1", port, &SendOptions::default()));

    let received = receiver.accept_one(Some(Duration::from_secs(10))).unwrap();
    assert_eq!(received.len(), 4096);
    assert_eq!(received[..], payload[..4096]);
    let _ = sender.join().unwrap();
}

#[test]
fn send_to_closed_port_is_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = send(b"x", "127.0.0.1", port, &SendOptions::default()).unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Refused));

    let err = send(
        b"x",
        "127.0.0.1",
        port,
        &SendOptions {
            connect_timeout: Some(Duration::from_secs(2)),
        },
    )
    .unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Refused));
}

#[test]
fn invalid_host_is_rejected_before_connecting() {
    let err = send(b"x", "bad host name", 1, &SendOptions::default()).unwrap_err();
    assert!(matches!(err, LockboxError::Validation(_)));
}

#[test]
fn accept_timeout_expires_without_sender() {
    let (receiver, _port) = loopback_receiver();
    let started = Instant::now();
    let err = receiver
        .accept_one(Some(Duration::from_millis(200)))
        .unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Timeout));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[test]
fn plaintext_peer_fails_handshake() {
    let (receiver, port) = loopback_receiver();
    let peer = thread::spawn(move || {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n")
            .unwrap();
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
    });

    let err = receiver
        .accept_one(Some(Duration::from_secs(10)))
        .unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Other));
    peer.join().unwrap();
}

#[test]
fn listener_closes_after_one_exchange() {
    let (receiver, port) = loopback_receiver();
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));
    send(b"first", "127.0.0.1", port, &SendOptions::default()).unwrap();
    assert_eq!(handle.join().unwrap().unwrap(), b"first");

    let err = send(b"second", "127.0.0.1", port, &SendOptions::default()).unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Refused));
}

#[test]
fn entry_round_trips_through_share_and_receive() {
    let dir = tempdir().unwrap();
    let provisioner = seeded_provisioner(dir.path());
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let options = ReceiveOptions {
        bind_address: "127.0.0.1".into(),
        accept_timeout: Some(Duration::from_secs(10)),
    };
    let handle = thread::spawn(move || receive_entry(port, &provisioner, &options));

    let entry = PlaintextEntry::new("gmail", "alice", "s3cret!");
    // The receiver binds asynchronously; retry until it is listening.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match share_entry(&entry, "127.0.0.1", port, &SendOptions::default()) {
            Ok(()) => break,
            Err(e) if e.network_kind() == Some(NetworkErrorKind::Refused) && Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => panic!("share failed: {e}"),
        }
    }
    assert_eq!(handle.join().unwrap().unwrap(), entry);
}

#[test]
fn received_entry_defaults_missing_fields() {
    let (receiver, port) = loopback_receiver();
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));
    send(br#"{"service":"gmail"}"#, "127.0.0.1", port, &SendOptions::default()).unwrap();

    let entry = PlaintextEntry::from_payload(&handle.join().unwrap().unwrap()).unwrap();
    assert_eq!(entry.service, "gmail");
    assert_eq!(entry.username, "");
    assert_eq!(entry.password, "");
}

#[test]
fn non_json_payload_is_protocol_error() {
    let (receiver, port) = loopback_receiver();
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));
    send(b"definitely not json", "127.0.0.1", port, &SendOptions::default()).unwrap();

    let err = PlaintextEntry::from_payload(&handle.join().unwrap().unwrap()).unwrap_err();
    assert!(matches!(err, LockboxError::Protocol(_)));
}

#[test]
fn receive_provisions_missing_identity() {
    let dir = tempdir().unwrap();
    let provisioner = CertificateProvisioner::new(
        dir.path().join("fresh/cert.pem"),
        dir.path().join("fresh/key.pem"),
    );
    let options = ReceiveOptions {
        bind_address: "127.0.0.1".into(),
        accept_timeout: Some(Duration::from_millis(100)),
    };

    let err = receive(0, &provisioner, &options).unwrap_err();
    assert_eq!(err.network_kind(), Some(NetworkErrorKind::Timeout));
    assert!(provisioner.cert_path().is_file());
    assert!(provisioner.key_path().is_file());
}

#[test]
#[serial]
fn default_port_exchange() {
    let receiver = Receiver::bind("127.0.0.1", DEFAULT_PORT, identity()).unwrap();
    let handle = thread::spawn(move || receiver.accept_one(Some(Duration::from_secs(10))));

    let payload = br#"{"service":"gmail","username":"a","password":"b"}"#;
    assert_eq!(DEFAULT_PORT, 65432);
    send(payload, "127.0.0.1", DEFAULT_PORT, &SendOptions::default()).unwrap();
    assert_eq!(handle.join().unwrap().unwrap(), payload.as_slice());
}
