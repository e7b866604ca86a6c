// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot TLS send and receive of a single payload.
//!
//! The receiver accepts exactly one connection, completes the handshake,
//! performs a single read of at most [`MAX_PAYLOAD_BYTES`] and closes both
//! the connection and the listener. Anything beyond the cap is discarded.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lockbox_core::{LockboxError, NetworkErrorKind, PlaintextEntry};
use rustls::{ClientConnection, ServerConfig, ServerConnection, StreamOwned};
use rustls_pki_types::ServerName;
use tracing::{debug, info, warn};

use crate::identity::{CertificateProvisioner, Identity};
use crate::tls;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 65432;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const MAX_PAYLOAD_BYTES: usize = 4096;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Sender tuning.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Bound on TCP connection establishment. `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,
}

/// Receiver tuning.
#[derive(Debug, Clone)]
pub struct ReceiveOptions {
    pub bind_address: String,
    /// How long to wait for a sender, and then for its handshake and data.
    /// `None` waits indefinitely.
    pub accept_timeout: Option<Duration>,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            accept_timeout: None,
        }
    }
}

fn classify(err: &io::Error) -> NetworkErrorKind {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => NetworkErrorKind::Refused,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => NetworkErrorKind::Timeout,
        _ => NetworkErrorKind::Other,
    }
}

fn network_error(context: &str, err: io::Error) -> LockboxError {
    LockboxError::network(classify(&err), format!("{context}: {err}"))
}

/// Server name to present in the ClientHello. The receiver certificate is
/// never checked against it.
fn server_name_for(host: &str) -> Result<ServerName<'static>, LockboxError> {
    ServerName::try_from(host.to_string())
        .map_err(|_| LockboxError::Validation(format!("'{host}' is not a valid host name or IP address")))
}

fn connect(host: &str, port: u16, timeout: Option<Duration>) -> Result<TcpStream, LockboxError> {
    let context = format!("failed to connect to {host}:{port}");
    let Some(timeout) = timeout else {
        return TcpStream::connect((host, port)).map_err(|e| network_error(&context, e));
    };

    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| network_error(&context, e))?;
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(match last_err {
        Some(e) => network_error(&context, e),
        None => LockboxError::network(NetworkErrorKind::Other, format!("{context}: no addresses")),
    })
}

/// Deliver `payload` to a receiver at `host:port` over TLS.
///
/// Succeeds once the bytes and the TLS close have been handed to the
/// transport; there is no application-level acknowledgement.
pub fn send(
    payload: &[u8],
    host: &str,
    port: u16,
    options: &SendOptions,
) -> Result<(), LockboxError> {
    let config = tls::client_config()?;
    let server_name = server_name_for(host)?;
    let tcp = connect(host, port, options.connect_timeout)?;
    tcp.set_read_timeout(options.connect_timeout)
        .and_then(|()| tcp.set_write_timeout(options.connect_timeout))
        .map_err(|e| network_error("failed to configure connection", e))?;

    let conn = ClientConnection::new(config, server_name)
        .map_err(|e| LockboxError::network(NetworkErrorKind::Other, format!("TLS setup failed: {e}")))?;
    let mut stream = StreamOwned::new(conn, tcp);
    // An empty payload triggers no write, so the handshake must not depend on one.
    while stream.conn.is_handshaking() {
        stream
            .conn
            .complete_io(&mut stream.sock)
            .map_err(|e| network_error("TLS handshake failed", e))?;
    }

    stream
        .write_all(payload)
        .map_err(|e| network_error("failed to send payload", e))?;
    stream.conn.send_close_notify();
    stream
        .flush()
        .map_err(|e| network_error("failed to send payload", e))?;

    info!(peer = %format!("{host}:{port}"), bytes = payload.len(), "payload sent");
    Ok(())
}

/// A bound listener waiting for exactly one sender.
#[derive(Debug)]
pub struct Receiver {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Receiver {
    pub fn bind(bind_address: &str, port: u16, identity: &Identity) -> Result<Self, LockboxError> {
        let config = tls::server_config(identity)?;
        let listener = TcpListener::bind((bind_address, port))
            .map_err(|e| network_error(&format!("failed to listen on {bind_address}:{port}"), e))?;
        info!(addr = %format!("{bind_address}:{port}"), "waiting for one transfer");
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LockboxError> {
        self.listener
            .local_addr()
            .map_err(|e| network_error("listener has no local address", e))
    }

    /// Accept one connection and return its first read. Consumes the
    /// receiver; the listener is closed before the payload is read.
    pub fn accept_one(self, timeout: Option<Duration>) -> Result<Vec<u8>, LockboxError> {
        let Receiver { listener, config } = self;
        let (mut tcp, peer) = accept(&listener, timeout)?;
        drop(listener);
        debug!(%peer, "sender connected");

        tcp.set_read_timeout(timeout)
            .and_then(|()| tcp.set_write_timeout(timeout))
            .map_err(|e| network_error("failed to configure connection", e))?;

        let mut conn = ServerConnection::new(config)
            .map_err(|e| LockboxError::network(NetworkErrorKind::Other, format!("TLS setup failed: {e}")))?;
        while conn.is_handshaking() {
            conn.complete_io(&mut tcp)
                .map_err(|e| network_error("TLS handshake failed", e))?;
        }

        let mut stream = StreamOwned::new(conn, tcp);
        let mut buf = vec![0u8; MAX_PAYLOAD_BYTES];
        let n = stream
            .read(&mut buf)
            .map_err(|e| network_error("failed to read payload", e))?;
        buf.truncate(n);

        if n == MAX_PAYLOAD_BYTES {
            warn!(%peer, cap = MAX_PAYLOAD_BYTES, "payload filled the receive buffer; any excess was discarded");
        }
        info!(%peer, bytes = n, "payload received");
        Ok(buf)
    }
}

fn accept(
    listener: &TcpListener,
    timeout: Option<Duration>,
) -> Result<(TcpStream, SocketAddr), LockboxError> {
    let Some(timeout) = timeout else {
        return listener
            .accept()
            .map_err(|e| network_error("failed to accept connection", e));
    };

    listener
        .set_nonblocking(true)
        .map_err(|e| network_error("failed to configure listener", e))?;
    let deadline = Instant::now() + timeout;
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                stream
                    .set_nonblocking(false)
                    .map_err(|e| network_error("failed to configure connection", e))?;
                return Ok((stream, peer));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Err(LockboxError::network(
                        NetworkErrorKind::Timeout,
                        format!("no sender connected within {timeout:?}"),
                    ));
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => return Err(network_error("failed to accept connection", e)),
        }
    }
}

/// Provision the identity, listen on `port` and return the one payload.
pub fn receive(
    port: u16,
    provisioner: &CertificateProvisioner,
    options: &ReceiveOptions,
) -> Result<Vec<u8>, LockboxError> {
    let identity = provisioner.ensure_identity()?;
    Receiver::bind(&options.bind_address, port, &identity)?.accept_one(options.accept_timeout)
}

/// Serialize `entry` and send it.
pub fn share_entry(
    entry: &PlaintextEntry,
    host: &str,
    port: u16,
    options: &SendOptions,
) -> Result<(), LockboxError> {
    let payload = zeroize::Zeroizing::new(entry.to_payload()?);
    send(&payload, host, port, options)
}

/// Receive one payload and parse it as an entry. Missing fields become
/// empty strings; undecodable payloads are [`LockboxError::Protocol`].
pub fn receive_entry(
    port: u16,
    provisioner: &CertificateProvisioner,
    options: &ReceiveOptions,
) -> Result<PlaintextEntry, LockboxError> {
    let payload = zeroize::Zeroizing::new(receive(port, provisioner, options)?);
    PlaintextEntry::from_payload(&payload)
}
