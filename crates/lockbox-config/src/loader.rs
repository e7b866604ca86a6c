// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lockbox.toml` > `~/.config/lockbox/lockbox.toml` > `/etc/lockbox/lockbox.toml`
//! with environment variable overrides via `LOCKBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LockboxConfig;

pub(crate) const SYSTEM_CONFIG_FILE: &str = "/etc/lockbox/lockbox.toml";
pub(crate) const LOCAL_CONFIG_FILE: &str = "lockbox.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lockbox/lockbox.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lockbox/lockbox.toml` (system-wide)
/// 3. `~/.config/lockbox/lockbox.toml` (user XDG config)
/// 4. `./lockbox.toml` (local directory)
/// 5. `LOCKBOX_*` environment variables
pub fn load_config() -> Result<LockboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Map `LOCKBOX_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LOCKBOX_VAULT_KDF_ITERATIONS` must become `vault.kdf_iterations`.
/// `LOCKBOX_PASSPHRASE` is read by the passphrase prompt, not the config.
fn env_provider() -> Env {
    Env::prefixed("LOCKBOX_")
        .ignore(&["passphrase"])
        .map(|key| env_key_to_path(key.as_str()).into())
}

const SECTIONS: [&str; 4] = ["log", "vault", "transfer", "identity"];

/// `TRANSFER_BIND_ADDRESS` -> `transfer.bind_address`. Figment hands the key
/// over in its original case, and only a leading section name is rewritten.
fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key
}
