// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plaintext credential and its transfer payload form.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::LockboxError;

/// One decrypted credential.
///
/// Lives only for the duration of a single operation; all three fields are
/// zeroed when the value is dropped.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PlaintextEntry {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl PlaintextEntry {
    pub fn new(
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject entries missing a field the vault requires.
    ///
    /// `service` and `password` are mandatory; `username` may be empty.
    pub fn validate(&self) -> Result<(), LockboxError> {
        if self.service.trim().is_empty() {
            return Err(LockboxError::Validation("service is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(LockboxError::Validation("password is required".to_string()));
        }
        Ok(())
    }

    /// Serialize to the textual transfer payload (`{"service":..,"username":..,"password":..}`).
    pub fn to_payload(&self) -> Result<Vec<u8>, LockboxError> {
        serde_json::to_vec(self)
            .map_err(|e| LockboxError::Internal(format!("failed to serialize entry: {e}")))
    }

    /// Parse a received transfer payload.
    ///
    /// Missing fields default to empty strings; anything that is not a JSON
    /// object is a protocol error.
    pub fn from_payload(bytes: &[u8]) -> Result<Self, LockboxError> {
        if bytes.is_empty() {
            return Err(LockboxError::Protocol("no data received".to_string()));
        }
        serde_json::from_slice(bytes)
            .map_err(|e| LockboxError::Protocol(format!("invalid payload: {e}")))
    }
}

impl fmt::Debug for PlaintextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaintextEntry")
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn payload_matches_documented_field_order() {
        let entry = PlaintextEntry::new("gmail", "a", "b");
        let payload = entry.to_payload().unwrap();
        assert_eq!(
            payload,
            br#"{"service":"gmail","username":"a","password":"b"}"#.to_vec()
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let entry = PlaintextEntry::from_payload(br#"{"service":"gmail"}"#).unwrap();
        assert_eq!(entry.service, "gmail");
        assert_eq!(entry.username, "");
        assert_eq!(entry.password, "");
    }

    #[test]
    fn garbage_payload_is_protocol_error() {
        let err = PlaintextEntry::from_payload(b"not json at all").unwrap_err();
        assert!(matches!(err, LockboxError::Protocol(_)));
    }

    #[test]
    fn empty_payload_is_protocol_error() {
        let err = PlaintextEntry::from_payload(b"").unwrap_err();
        assert!(matches!(err, LockboxError::Protocol(_)));
    }

    #[test]
    fn truncated_payload_is_protocol_error() {
        let err = PlaintextEntry::from_payload(br#"{"service":"gm"#).unwrap_err();
        assert!(matches!(err, LockboxError::Protocol(_)));
    }

    #[test]
    fn validate_requires_service_and_password() {
        assert!(PlaintextEntry::new("gmail", "", "pw").validate().is_ok());
        assert!(matches!(
            PlaintextEntry::new("  ", "a", "pw").validate(),
            Err(LockboxError::Validation(_))
        ));
        assert!(matches!(
            PlaintextEntry::new("gmail", "a", "").validate(),
            Err(LockboxError::Validation(_))
        ));
    }

    #[test]
    fn debug_redacts_password() {
        let entry = PlaintextEntry::new("gmail", "alice", "hunter22");
        let debug = format!("{entry:?}");
        assert!(debug.contains("gmail"));
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("[REDACTED]"));
    }

    proptest! {
        #[test]
        fn payload_survives_transfer_encoding(
            service in ".{1,40}",
            username in ".{0,40}",
            password in ".{1,40}",
        ) {
            let entry = PlaintextEntry::new(service, username, password);
            let parsed = PlaintextEntry::from_payload(&entry.to_payload().unwrap()).unwrap();
            prop_assert_eq!(parsed, entry);
        }
    }
}
