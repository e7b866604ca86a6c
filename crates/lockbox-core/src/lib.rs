// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the lockbox credential vault.
//!
//! This crate provides the error taxonomy shared by every lockbox crate and
//! the plaintext credential type that travels between the vault and the
//! transfer channel.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{LockboxError, NetworkErrorKind, StorageError};
pub use types::PlaintextEntry;
