// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a passphrase.
//!
//! Every record carries its own 16-byte salt, so every record gets its own
//! 32-byte key. The iteration count is a cost knob: records written with a
//! non-default count persist it (see [`crate::record::EncryptedRecord`]).

use std::num::NonZeroU32;

use lockbox_core::LockboxError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Iteration count used when a record does not say otherwise.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Highest iteration count a record may ask for. Counts come from the vault
/// file, so without a ceiling a single crafted record could stall a load.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte key from passphrase and salt.
///
/// Deterministic for identical inputs. The returned key is wrapped in
/// [`Zeroizing`] so it is wiped when the single encrypt/decrypt call that
/// needs it returns.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, LockboxError> {
    if salt.is_empty() {
        return Err(LockboxError::Validation("salt must not be empty".to_string()));
    }
    if iterations > MAX_ITERATIONS {
        return Err(LockboxError::Validation(format!(
            "KDF iteration count must be at most {MAX_ITERATIONS}"
        )));
    }
    let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
        LockboxError::Validation("KDF iteration count must be at least 1".to_string())
    })?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        output.as_mut(),
    );

    Ok(output)
}

/// Generate a random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], LockboxError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| LockboxError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_published_pbkdf2_sha256_vectors() {
        let one = derive_key(b"password", b"salt", 1).unwrap();
        assert_eq!(
            hex::encode(*one),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );

        let many = derive_key(b"password", b"salt", 4096).unwrap();
        assert_eq!(
            hex::encode(*many),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let key1 = derive_key(b"correct horse", &salt, 1_000).unwrap();
        let key2 = derive_key(b"correct horse", &salt, 1_000).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn different_passphrase_produces_different_key() {
        let salt = [2u8; SALT_LEN];
        let key1 = derive_key(b"passphrase one", &salt, 1_000).unwrap();
        let key2 = derive_key(b"passphrase two", &salt, 1_000).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salt_produces_different_key() {
        let key1 = derive_key(b"same passphrase", &[1u8; SALT_LEN], 1_000).unwrap();
        let key2 = derive_key(b"same passphrase", &[2u8; SALT_LEN], 1_000).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn iteration_count_changes_the_key() {
        let salt = [3u8; SALT_LEN];
        let key1 = derive_key(b"same passphrase", &salt, 1_000).unwrap();
        let key2 = derive_key(b"same passphrase", &salt, 1_001).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn empty_salt_is_rejected() {
        let err = derive_key(b"passphrase", &[], 1_000).unwrap_err();
        assert!(matches!(err, LockboxError::Validation(_)));
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err = derive_key(b"passphrase", &[0u8; SALT_LEN], 0).unwrap_err();
        assert!(matches!(err, LockboxError::Validation(_)));
    }

    #[test]
    fn ceiling_matches_config_validation() {
        assert_eq!(
            MAX_ITERATIONS,
            lockbox_config::validation::MAX_KDF_ITERATIONS
        );
    }

    #[test]
    fn iterations_above_ceiling_are_rejected() {
        let err = derive_key(b"pw", b"salt", MAX_ITERATIONS + 1).unwrap_err();
        assert!(matches!(err, LockboxError::Validation(_)));
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
