// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk form of one encrypted credential.
//!
//! ```json
//! {"salt": "<b64>", "nonce": "<b64>", "ciphertext": "<b64>"}
//! ```
//!
//! Each field is URL-safe base64 with padding. `iterations` is only present
//! when the record was derived with a non-default PBKDF2 cost.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kdf::DEFAULT_ITERATIONS;

/// `{salt, nonce, ciphertext}` as produced by [`crate::RecordCipher::encrypt`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    #[serde(with = "urlsafe_b64")]
    pub salt: Vec<u8>,
    #[serde(with = "urlsafe_b64")]
    pub nonce: Vec<u8>,
    /// Ciphertext with the 16-byte GCM tag appended.
    #[serde(with = "urlsafe_b64")]
    pub ciphertext: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

impl EncryptedRecord {
    /// PBKDF2 iteration count this record was derived with.
    pub fn kdf_iterations(&self) -> u32 {
        self.iterations.unwrap_or(DEFAULT_ITERATIONS)
    }
}

impl fmt::Debug for EncryptedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedRecord")
            .field("salt_len", &self.salt.len())
            .field("nonce_len", &self.nonce.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iterations", &self.kdf_iterations())
            .finish()
    }
}

mod urlsafe_b64 {
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        URL_SAFE
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
