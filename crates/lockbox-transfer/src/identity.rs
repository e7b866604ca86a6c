// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-signed receiver identity.
//!
//! A 2048-bit RSA key and a certificate valid for 365 days from the moment
//! of generation, with the configured common name as both subject CN and
//! DNS subject-alternative-name. Existing files are reused untouched, so
//! the identity is stable across runs until someone deletes either file.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use lockbox_config::model::IdentityConfig;
use lockbox_core::LockboxError;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, PKCS_RSA_SHA256};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tempfile::NamedTempFile;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use zeroize::Zeroizing;

pub const RSA_KEY_BITS: usize = 2048;
pub const VALIDITY_DAYS: i64 = 365;

fn identity_error(context: &str, err: impl fmt::Display) -> LockboxError {
    LockboxError::Identity(format!("{context}: {err}"))
}

/// PEM-encoded certificate and private key.
#[derive(Clone)]
pub struct Identity {
    cert_pem: String,
    key_pem: Zeroizing<String>,
}

impl Identity {
    pub fn from_pem(cert_pem: String, key_pem: Zeroizing<String>) -> Self {
        Self { cert_pem, key_pem }
    }

    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }

    /// DER certificates in file order.
    pub fn certificate_chain(&self) -> Result<Vec<CertificateDer<'static>>, LockboxError> {
        let chain = CertificateDer::pem_slice_iter(self.cert_pem.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| identity_error("unreadable certificate PEM", e))?;
        if chain.is_empty() {
            return Err(LockboxError::Identity(
                "certificate file contains no certificates".into(),
            ));
        }
        Ok(chain)
    }

    pub fn private_key(&self) -> Result<PrivateKeyDer<'static>, LockboxError> {
        PrivateKeyDer::from_pem_slice(self.key_pem.as_bytes())
            .map_err(|e| identity_error("unreadable private key PEM", e))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("cert_pem_len", &self.cert_pem.len())
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

/// Finds or creates the receiver identity at a fixed pair of paths.
#[derive(Debug, Clone)]
pub struct CertificateProvisioner {
    cert_path: PathBuf,
    key_path: PathBuf,
    common_name: String,
}

impl CertificateProvisioner {
    pub fn new(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            common_name: "localhost".to_string(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(&config.cert_path, &config.key_path).with_common_name(&config.common_name)
    }

    pub fn with_common_name(mut self, common_name: impl Into<String>) -> Self {
        self.common_name = common_name.into();
        self
    }

    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Return the identity at the configured paths, generating one if either
    /// file is missing.
    ///
    /// Both files are rewritten together when generating; a lone surviving
    /// half is never paired with a fresh counterpart.
    pub fn ensure_identity(&self) -> Result<Identity, LockboxError> {
        if self.cert_path.is_file() && self.key_path.is_file() {
            let cert_pem = fs::read_to_string(&self.cert_path)
                .map_err(|e| identity_error("failed to read certificate", e))?;
            let key_pem = fs::read_to_string(&self.key_path)
                .map(Zeroizing::new)
                .map_err(|e| identity_error("failed to read private key", e))?;
            debug!(cert = %self.cert_path.display(), "using existing identity");
            return Ok(Identity::from_pem(cert_pem, key_pem));
        }

        let identity = generate_identity(&self.common_name)?;
        write_atomic(&self.key_path, identity.key_pem().as_bytes())?;
        write_atomic(&self.cert_path, identity.cert_pem().as_bytes())?;
        info!(
            cert = %self.cert_path.display(),
            key = %self.key_path.display(),
            common_name = %self.common_name,
            "generated self-signed identity"
        );
        Ok(identity)
    }
}

/// Certificate parameters for `common_name`, valid from `now` for
/// [`VALIDITY_DAYS`].
pub fn certificate_params(
    common_name: &str,
    now: OffsetDateTime,
) -> Result<CertificateParams, LockboxError> {
    let mut params = CertificateParams::new(vec![common_name.to_string()])
        .map_err(|e| identity_error("invalid common name", e))?;
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = now;
    params.not_after = now + Duration::days(VALIDITY_DAYS);
    Ok(params)
}

/// Generate a fresh RSA key and self-signed certificate in memory.
pub fn generate_identity(common_name: &str) -> Result<Identity, LockboxError> {
    let mut rng = rand::rngs::OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
        .map_err(|e| identity_error("RSA key generation failed", e))?;
    let key_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| identity_error("failed to encode private key", e))?;

    let key_pair = KeyPair::from_pem_and_sign_algo(&key_pem, &PKCS_RSA_SHA256)
        .map_err(|e| identity_error("failed to load generated key", e))?;
    let cert = certificate_params(common_name, OffsetDateTime::now_utc())?
        .self_signed(&key_pair)
        .map_err(|e| identity_error("failed to self-sign certificate", e))?;

    Ok(Identity::from_pem(cert.pem(), key_pem))
}

// Temp files are created 0600 and rename preserves the mode, which is what
// the private key needs.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), LockboxError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .map_err(|e| identity_error(&format!("failed to create {}", dir.display()), e))?;
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| identity_error("failed to create temporary file", e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| identity_error(&format!("failed to write {}", path.display()), e))?;
    tmp.persist(path)
        .map_err(|e| identity_error(&format!("failed to write {}", path.display()), e.error))?;
    Ok(())
}

/// One identity per test binary; RSA generation dominates test time otherwise.
#[cfg(test)]
pub(crate) fn shared_test_identity() -> &'static Identity {
    static IDENTITY: std::sync::OnceLock<Identity> = std::sync::OnceLock::new();
    IDENTITY.get_or_init(|| generate_identity("localhost").unwrap())
}
