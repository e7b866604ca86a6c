// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Point-to-point credential transfer for lockbox.
//!
//! A receiver provisions a self-signed identity, listens for exactly one TLS
//! connection and returns what the sender wrote (up to 4096 bytes). The
//! sender encrypts the transport but deliberately does not authenticate the
//! receiver's certificate: trust-on-first-use, not PKI.

pub mod channel;
pub mod identity;
pub mod tls;

pub use channel::{
    receive, receive_entry, send, share_entry, ReceiveOptions, Receiver, SendOptions,
    DEFAULT_BIND_ADDRESS, DEFAULT_HOST, DEFAULT_PORT, MAX_PAYLOAD_BYTES,
};
pub use identity::{generate_identity, CertificateProvisioner, Identity};
