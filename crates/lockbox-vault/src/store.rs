// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage of the ordered record collection as a JSON array.
//!
//! The store keeps no state between calls: every operation re-reads the
//! file, so changes made by another process are seen on the next call.
//! Writes go to a temporary file in the same directory which is synced and
//! then renamed over the vault, so a crash mid-write leaves either the old
//! or the new vault, never a torn one.
//!
//! Two processes appending at the same time still race: the later
//! read-modify-write wins and the earlier record is lost. There is no file
//! locking.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lockbox_core::{LockboxError, StorageError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::record::EncryptedRecord;

/// File-backed vault of [`EncryptedRecord`]s in insertion order.
#[derive(Debug, Clone)]
pub struct VaultStore {
    path: PathBuf,
}

impl VaultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a vault file is present (it may still hold an empty array).
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read every persisted record.
    ///
    /// A missing or blank file is an empty vault. Anything that does not
    /// parse as an array of records is [`StorageError::Corrupt`]; nothing
    /// partially parsed is ever returned.
    pub fn load(&self) -> Result<Vec<EncryptedRecord>, LockboxError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no vault file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::Io(e).into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<EncryptedRecord> = serde_json::from_str(&content)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        debug!(path = %self.path.display(), count = records.len(), "vault loaded");
        Ok(records)
    }

    /// Append one record and rewrite the vault.
    pub fn append(&self, record: EncryptedRecord) -> Result<(), LockboxError> {
        let mut records = self.load()?;
        records.push(record);
        self.replace(&records)?;
        debug!(path = %self.path.display(), count = records.len(), "record appended");
        Ok(())
    }

    /// Replace the vault with an empty sequence. Irreversible.
    pub fn clear(&self) -> Result<(), LockboxError> {
        self.replace(&[])?;
        info!(path = %self.path.display(), "vault cleared");
        Ok(())
    }

    /// Atomically swap the vault contents for `records`.
    fn replace(&self, records: &[EncryptedRecord]) -> Result<(), LockboxError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(StorageError::Io)?;

        let json = serde_json::to_vec(records)
            .map_err(|e| LockboxError::Internal(format!("failed to serialize vault: {e}")))?;

        // NamedTempFile is created 0600 on Unix, and rename keeps that mode.
        let mut tmp = NamedTempFile::new_in(dir).map_err(StorageError::Io)?;
        tmp.write_all(&json).map_err(StorageError::Io)?;
        tmp.as_file().sync_all().map_err(StorageError::Io)?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::Io(e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(tag: u8) -> EncryptedRecord {
        EncryptedRecord {
            salt: vec![tag; 16],
            nonce: vec![tag; 12],
            ciphertext: vec![tag; 20],
            iterations: None,
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));
        assert!(!store.exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn blank_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, "  \n").unwrap();
        assert!(VaultStore::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));

        store.append(record(1)).unwrap();
        let before = store.load().unwrap();
        store.append(record(2)).unwrap();
        let after = store.load().unwrap();

        let mut expected = before;
        expected.push(record(2));
        assert_eq!(after, expected);
        assert_eq!(after[0], record(1));
    }

    #[test]
    fn append_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("nested/deeper/vault.json"));
        store.append(record(1)).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn clear_then_load_is_empty() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));
        store.append(record(1)).unwrap();
        store.append(record(2)).unwrap();

        store.clear().unwrap();
        assert!(store.exists());
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, "[{\"salt\": ").unwrap();

        let err = VaultStore::new(path).load().unwrap_err();
        assert!(matches!(err, LockboxError::Storage(StorageError::Corrupt(_))));
    }

    #[test]
    fn non_array_document_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, r#"{"salt":"AA==","nonce":"AA==","ciphertext":"AA=="}"#).unwrap();

        let err = VaultStore::new(path).load().unwrap_err();
        assert!(matches!(err, LockboxError::Storage(StorageError::Corrupt(_))));
    }

    #[test]
    fn one_bad_record_corrupts_the_whole_load() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));
        store.append(record(1)).unwrap();

        let mut content = fs::read_to_string(store.path()).unwrap();
        content = content.replacen(']', r#",{"salt":"!!","nonce":"AA==","ciphertext":"AA=="}]"#, 1);
        fs::write(store.path(), content).unwrap();

        assert!(matches!(
            store.load(),
            Err(LockboxError::Storage(StorageError::Corrupt(_)))
        ));
    }

    #[test]
    fn external_changes_are_observed() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));
        store.append(record(1)).unwrap();

        let other = VaultStore::new(store.path());
        other.append(record(2)).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn rewrite_leaves_no_temporary_files() {
        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));
        store.append(record(1)).unwrap();
        store.append(record(2)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("vault.json")]);
    }

    #[cfg(unix)]
    #[test]
    fn vault_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = VaultStore::new(dir.path().join("vault.json"));
        store.append(record(1)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
