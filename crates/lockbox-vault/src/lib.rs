// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record encrypted credential vault.
//!
//! Every credential is encrypted on its own: a fresh 16-byte salt feeds
//! PBKDF2-HMAC-SHA256 to derive a 32-byte key, which seals the record with
//! AES-256-GCM under a fresh 96-bit nonce. The resulting
//! `{salt, nonce, ciphertext}` triples are kept in insertion order in a JSON
//! file that is rewritten atomically.

pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod record;
pub mod store;
pub mod vault;

pub use crypto::{RecordCipher, MIN_PASSPHRASE_LEN};
pub use prompt::{get_passphrase, get_passphrase_with_confirm, prompt_hidden};
pub use record::EncryptedRecord;
pub use store::VaultStore;
pub use vault::{mask_secret, LoadReport, Vault};
