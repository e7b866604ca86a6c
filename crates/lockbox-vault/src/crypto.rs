// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM record encryption.
//!
//! [`seal`] and [`open`] are the raw AEAD operations; [`RecordCipher`] adds
//! per-record key derivation on top. Every [`seal`] draws a fresh 96-bit
//! nonce from the system CSPRNG, and since each record also derives a fresh
//! key from its own salt, a key/nonce pair is never used twice.

use lockbox_core::LockboxError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::kdf::{self, DEFAULT_ITERATIONS, KEY_LEN, MAX_ITERATIONS, SALT_LEN};
use crate::record::EncryptedRecord;

/// Minimum passphrase length, in characters, for any vault-mutating operation.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), LockboxError> {
    let key = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| LockboxError::Internal("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| LockboxError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate `ciphertext` (which must end with the 16-byte tag).
///
/// Any tag mismatch is [`LockboxError::Authentication`]; the working buffer
/// is zeroed on every path, so no unauthenticated plaintext escapes.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, LockboxError> {
    let key = aead_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let len = key
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce_bytes),
            Aad::empty(),
            in_out.as_mut_slice(),
        )
        .map_err(|_| LockboxError::Authentication)?
        .len();
    in_out.truncate(len);

    Ok(in_out)
}

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, LockboxError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| LockboxError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Reject passphrases too short for a vault-mutating operation.
pub fn validate_passphrase(passphrase: &SecretString) -> Result<(), LockboxError> {
    if passphrase.expose_secret().chars().count() < MIN_PASSPHRASE_LEN {
        return Err(LockboxError::Validation(format!(
            "master passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
        )));
    }
    Ok(())
}

/// Authenticated encryption of single records under a passphrase.
///
/// Holds no key material: each call derives, uses and wipes its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCipher {
    iterations: u32,
}

impl Default for RecordCipher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl RecordCipher {
    /// A cipher that derives keys for new records with `iterations` rounds.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Encrypt `plaintext` with a fresh salt, nonce and derived key.
    pub fn encrypt(
        &self,
        passphrase: &SecretString,
        plaintext: &[u8],
    ) -> Result<EncryptedRecord, LockboxError> {
        validate_passphrase(passphrase)?;

        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, self.iterations)?;
        let (ciphertext, nonce) = seal(&key, plaintext)?;

        debug!(
            bytes = plaintext.len(),
            iterations = self.iterations,
            "record encrypted"
        );
        Ok(EncryptedRecord {
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
            iterations: (self.iterations != DEFAULT_ITERATIONS).then_some(self.iterations),
        })
    }

    /// Decrypt a record produced by [`RecordCipher::encrypt`].
    ///
    /// Uses the iteration count stored in the record, not the one this cipher
    /// was built with. Malformed lengths and counts outside
    /// `1..=MAX_ITERATIONS` are reported exactly like a failed tag check,
    /// before any key is derived.
    pub fn decrypt(
        &self,
        passphrase: &SecretString,
        record: &EncryptedRecord,
    ) -> Result<Zeroizing<Vec<u8>>, LockboxError> {
        if record.salt.len() != SALT_LEN || record.ciphertext.len() < TAG_LEN {
            return Err(LockboxError::Authentication);
        }
        let iterations = record.kdf_iterations();
        if !(1..=MAX_ITERATIONS).contains(&iterations) {
            return Err(LockboxError::Authentication);
        }
        let nonce: [u8; NONCE_LEN] = record
            .nonce
            .as_slice()
            .try_into()
            .map_err(|_| LockboxError::Authentication)?;

        let key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &record.salt,
            iterations,
        )?;
        open(&key, &nonce, &record.ciphertext)
    }
}
