// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the lockbox credential vault.

use std::fmt;

use thiserror::Error;

/// The primary error type returned by every lockbox operation.
#[derive(Debug, Error)]
pub enum LockboxError {
    /// Caller-supplied input was rejected (short passphrase, empty required field).
    #[error("validation error: {0}")]
    Validation(String),

    /// AEAD tag verification failed. Carries no detail: a wrong passphrase
    /// and a tampered record are indistinguishable.
    #[error("authentication failed: wrong passphrase or tampered record")]
    Authentication,

    /// The vault backing store could not be read, written or parsed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Transport failure on the transfer channel.
    #[error("network error ({kind}): {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    /// Received bytes are not a parseable transfer payload.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The transfer identity (certificate + key) could not be loaded or generated.
    #[error("identity error: {0}")]
    Identity(String),

    /// Configuration errors surfaced outside the config loader.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors (RNG failure, crypto library misuse).
    #[error("internal error: {0}")]
    Internal(String),
}

impl LockboxError {
    /// Shorthand for building a [`LockboxError::Network`].
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self::Network {
            kind,
            message: message.into(),
        }
    }

    /// Returns the network failure class, if this is a network error.
    pub fn network_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            Self::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Failures of the vault backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The persisted container cannot be parsed as a sequence of records.
    #[error("vault file is corrupt: {0}")]
    Corrupt(String),

    /// The underlying medium failed.
    #[error("vault i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes of the transfer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkErrorKind {
    /// No listener at the target address.
    Refused,
    /// Connect, accept or read exceeded its time bound.
    Timeout,
    /// Any other transport or TLS failure.
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Refused => "refused",
            Self::Timeout => "timeout",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}
