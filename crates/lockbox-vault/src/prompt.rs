// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the `LOCKBOX_PASSPHRASE` environment variable.
//!
//! This is a caller-side convenience: the vault operations themselves only
//! ever receive the passphrase as an explicit argument.

use std::io::IsTerminal;

use lockbox_core::LockboxError;
use secrecy::SecretString;

/// The environment variable name for providing the master passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "LOCKBOX_PASSPHRASE";

/// Get the master passphrase from the environment or an interactive prompt.
///
/// Priority:
/// 1. `LOCKBOX_PASSPHRASE` (for scripts and non-interactive use)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, LockboxError> {
    if let Some(passphrase) = passphrase_from_env() {
        return Ok(passphrase);
    }
    prompt_hidden("Master passphrase: ")
}

/// Get the master passphrase, prompting twice when interactive.
///
/// Used before writing new records so a typo does not lock the record
/// under an unknown passphrase.
pub fn get_passphrase_with_confirm() -> Result<SecretString, LockboxError> {
    if let Some(passphrase) = passphrase_from_env() {
        return Ok(passphrase);
    }

    let first = read_hidden("Master passphrase: ")?;
    let second = read_hidden("Confirm master passphrase: ")?;
    if first != second {
        return Err(LockboxError::Validation("passphrases do not match".to_string()));
    }
    non_empty(first)
}

/// Prompt for any hidden value (e.g. the credential password) on the TTY.
pub fn prompt_hidden(label: &str) -> Result<SecretString, LockboxError> {
    non_empty(read_hidden(label)?)
}

fn passphrase_from_env() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read_hidden(label: &str) -> Result<String, LockboxError> {
    if !std::io::stdin().is_terminal() {
        return Err(LockboxError::Validation(format!(
            "no TTY available to prompt for input; set {PASSPHRASE_ENV_VAR} or pass the value explicitly"
        )));
    }
    eprint!("{label}");
    rpassword::read_password()
        .map_err(|e| LockboxError::Validation(format!("failed to read input: {e}")))
}

fn non_empty(value: String) -> Result<SecretString, LockboxError> {
    if value.is_empty() {
        return Err(LockboxError::Validation("empty value not allowed".to_string()));
    }
    Ok(SecretString::from(value))
}
