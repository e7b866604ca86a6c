// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential-level vault operations: save, load with a failure report,
//! duplicate lookup, and clear.
//!
//! Each credential is serialized as `{"service","username","password"}`,
//! encrypted into its own [`EncryptedRecord`] and appended to the store.
//! There is no vault-wide key: a record encrypted under a different
//! passphrase simply fails to decrypt and is counted, not fatal.

use lockbox_config::model::VaultConfig;
use lockbox_core::{LockboxError, PlaintextEntry, StorageError};
use secrecy::SecretString;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, RecordCipher};
use crate::record::EncryptedRecord;
use crate::store::VaultStore;

/// A vault file paired with the cipher used for new records.
#[derive(Debug, Clone)]
pub struct Vault {
    store: VaultStore,
    cipher: RecordCipher,
}

/// Outcome of decrypting every record in the vault.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully decrypted entries, in vault order.
    pub entries: Vec<PlaintextEntry>,
    /// Records that failed authentication or did not hold an entry.
    pub failed: usize,
    /// Records present in the vault.
    pub total: usize,
}

impl LoadReport {
    /// True when the vault is non-empty and nothing decrypted.
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.failed == self.total
    }

    /// Human-readable outcome, e.g. `"1 of 2 failed"`.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            format!("{} entries loaded", self.entries.len())
        } else {
            format!("{} of {} failed", self.failed, self.total)
        }
    }
}

impl Vault {
    pub fn new(store: VaultStore, cipher: RecordCipher) -> Self {
        Self { store, cipher }
    }

    /// Build a vault from the `[vault]` config section.
    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(
            VaultStore::new(&config.path),
            RecordCipher::new(config.kdf_iterations),
        )
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    /// Encrypt `entry` under `passphrase` and append it.
    ///
    /// Does not check for an existing record with the same service; callers
    /// that want that policy use [`Vault::contains_service`] first.
    pub fn save_entry(
        &self,
        passphrase: &SecretString,
        entry: &PlaintextEntry,
    ) -> Result<(), LockboxError> {
        crypto::validate_passphrase(passphrase)?;
        entry.validate()?;

        let plaintext = Zeroizing::new(
            serde_json::to_vec(entry)
                .map_err(|e| LockboxError::Internal(format!("failed to serialize entry: {e}")))?,
        );
        let record = self.cipher.encrypt(passphrase, &plaintext)?;
        self.store.append(record)?;

        info!(path = %self.store.path().display(), "entry saved");
        Ok(())
    }

    /// Decrypt every record, counting the ones that fail.
    ///
    /// A corrupt container aborts with [`StorageError::Corrupt`]; a bad or
    /// foreign-keyed record only increments [`LoadReport::failed`].
    pub fn load_entries(&self, passphrase: &SecretString) -> Result<LoadReport, LockboxError> {
        let records = self.store.load()?;
        let mut report = LoadReport {
            total: records.len(),
            ..LoadReport::default()
        };

        for (index, record) in records.iter().enumerate() {
            match self.decrypt_entry(passphrase, record) {
                Ok(entry) => report.entries.push(entry),
                Err(e) => {
                    warn!(index, error = %e, "skipping record that could not be decrypted");
                    report.failed += 1;
                }
            }
        }

        debug!(
            total = report.total,
            failed = report.failed,
            "vault entries decrypted"
        );
        Ok(report)
    }

    /// Whether any record readable under `passphrase` has this service name.
    ///
    /// Records that do not decrypt are ignored.
    pub fn contains_service(
        &self,
        passphrase: &SecretString,
        service: &str,
    ) -> Result<bool, LockboxError> {
        let records = self.store.load()?;
        Ok(records.iter().any(|record| {
            self.decrypt_entry(passphrase, record)
                .is_ok_and(|entry| entry.service == service)
        }))
    }

    /// Discard every record.
    pub fn clear(&self) -> Result<(), LockboxError> {
        self.store.clear()
    }

    fn decrypt_entry(
        &self,
        passphrase: &SecretString,
        record: &EncryptedRecord,
    ) -> Result<PlaintextEntry, LockboxError> {
        let plaintext = self.cipher.decrypt(passphrase, record)?;
        serde_json::from_slice(&plaintext).map_err(|e| {
            LockboxError::Storage(StorageError::Corrupt(format!(
                "record does not hold a credential entry: {e}"
            )))
        })
    }
}

/// Mask a secret value for display: `"hunter2-abcdef"` becomes `"hunt...cdef"`.
///
/// Values shorter than 10 characters are fully masked as `"****"`.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
