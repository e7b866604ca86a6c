// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid IP addresses, non-empty paths, and KDF floors.

use crate::diagnostic::ConfigError;
use crate::model::LockboxConfig;

/// Lowest PBKDF2 iteration count accepted from configuration.
pub const MIN_KDF_ITERATIONS: u32 = 1_000;

/// Ceiling on `vault.kdf_iterations`; records asking for more are refused
/// on decrypt, so the vault must never write them.
pub const MAX_KDF_ITERATIONS: u32 = 10_000_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LockboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        fail(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.vault.path.trim().is_empty() {
        fail("vault.path must not be empty".to_string());
    }

    if !(MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(&config.vault.kdf_iterations) {
        fail(format!(
            "vault.kdf_iterations must be between {MIN_KDF_ITERATIONS} and {MAX_KDF_ITERATIONS}, got {}",
            config.vault.kdf_iterations
        ));
    }

    if config.transfer.host.trim().is_empty() {
        fail("transfer.host must not be empty".to_string());
    }

    if config.transfer.port == 0 {
        fail("transfer.port must be between 1 and 65535".to_string());
    }

    let bind = config.transfer.bind_address.trim();
    if bind.parse::<std::net::IpAddr>().is_err() {
        fail(format!(
            "transfer.bind_address `{bind}` is not a valid IP address"
        ));
    }

    if config.identity.cert_path.trim().is_empty() {
        fail("identity.cert_path must not be empty".to_string());
    }

    if config.identity.key_path.trim().is_empty() {
        fail("identity.key_path must not be empty".to_string());
    }

    if config.identity.cert_path.trim() == config.identity.key_path.trim() {
        fail("identity.cert_path and identity.key_path must differ".to_string());
    }

    if config.identity.common_name.trim().is_empty() {
        fail("identity.common_name must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LockboxConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = LockboxConfig::default();
        config.transfer.port = 0;
        config.vault.kdf_iterations = 10;
        config.transfer.bind_address = "not-an-ip".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn kdf_iterations_bounds_are_inclusive() {
        let mut config = LockboxConfig::default();
        config.vault.kdf_iterations = MAX_KDF_ITERATIONS;
        assert!(validate_config(&config).is_ok());

        config.vault.kdf_iterations = MAX_KDF_ITERATIONS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("vault.kdf_iterations"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = LockboxConfig::default();
        config.log.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("log.level"));
    }

    #[test]
    fn rejects_shared_identity_path() {
        let mut config = LockboxConfig::default();
        config.identity.key_path = config.identity.cert_path.clone();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("must differ"));
    }
}
