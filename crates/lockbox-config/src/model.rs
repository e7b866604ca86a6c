// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for lockbox.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level lockbox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockboxConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Encrypted vault file settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Point-to-point transfer settings.
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Receiver TLS identity settings.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Encrypted vault configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Path to the JSON vault file.
    #[serde(default = "default_vault_path")]
    pub path: String,

    /// PBKDF2-HMAC-SHA256 iteration count for newly written records.
    ///
    /// Records written with a non-default count store it alongside the
    /// ciphertext, so changing this never breaks older records.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

fn default_vault_path() -> String {
    data_dir().join("vault.json").display().to_string()
}

fn default_kdf_iterations() -> u32 {
    100_000
}

/// Transfer channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransferConfig {
    /// Default peer host for `share`.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port used by both roles.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Local address the receiver binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Connect timeout for the sender in seconds. 0 means the platform default.
    #[serde(default)]
    pub connect_timeout_secs: u64,

    /// Accept timeout for the receiver in seconds. 0 blocks indefinitely.
    #[serde(default)]
    pub accept_timeout_secs: u64,
}

impl TransferConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.connect_timeout_secs)
    }

    pub fn accept_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.accept_timeout_secs)
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bind_address: default_bind_address(),
            connect_timeout_secs: 0,
            accept_timeout_secs: 0,
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    65432
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

/// Receiver identity (self-signed certificate) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// PEM certificate path.
    #[serde(default = "default_cert_path")]
    pub cert_path: String,

    /// PEM private key path (unencrypted PKCS#8).
    #[serde(default = "default_key_path")]
    pub key_path: String,

    /// Common name and DNS subject-alternative-name of generated certificates.
    #[serde(default = "default_common_name")]
    pub common_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            cert_path: default_cert_path(),
            key_path: default_key_path(),
            common_name: default_common_name(),
        }
    }
}

fn default_cert_path() -> String {
    data_dir().join("identity/cert.pem").display().to_string()
}

fn default_key_path() -> String {
    data_dir().join("identity/key.pem").display().to_string()
}

fn default_common_name() -> String {
    "localhost".to_string()
}

/// Per-user data directory, falling back to `./.lockbox` when none is known.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("lockbox"))
        .unwrap_or_else(|| PathBuf::from(".lockbox"))
}
