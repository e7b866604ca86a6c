// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox save`, `lockbox load` and `lockbox clear`.

use clap::Args;
use colored::Colorize;
use lockbox_config::model::LockboxConfig;
use lockbox_core::{LockboxError, PlaintextEntry};
use lockbox_vault::crypto::validate_passphrase;
use lockbox_vault::{get_passphrase, get_passphrase_with_confirm, mask_secret, prompt_hidden, Vault};
use secrecy::{ExposeSecret, SecretString};

use crate::confirm::{ask, ConfirmState, PendingAction};

/// Credential fields given on the command line.
#[derive(Args, Debug)]
pub struct EntryArgs {
    /// Service the credential belongs to (e.g. "gmail").
    #[arg(long, short = 's')]
    pub service: String,

    /// Account name for the service.
    #[arg(long, short = 'u', default_value = "")]
    pub username: String,

    /// Password. Prompted for (hidden) when omitted.
    #[arg(long, short = 'p')]
    pub password: Option<String>,
}

impl EntryArgs {
    pub fn into_entry(self) -> Result<PlaintextEntry, LockboxError> {
        let password = match self.password {
            Some(password) => password,
            None => prompt_hidden("Password: ")?.expose_secret().to_string(),
        };
        let entry = PlaintextEntry::new(self.service, self.username, password);
        entry.validate()?;
        Ok(entry)
    }
}

/// Passphrase for a write, checked before any expensive decryption runs.
pub fn write_passphrase() -> Result<SecretString, LockboxError> {
    let passphrase = get_passphrase_with_confirm()?;
    validate_passphrase(&passphrase)?;
    Ok(passphrase)
}

/// Run `lockbox save`.
pub fn run_save(config: &LockboxConfig, args: EntryArgs, assume_yes: bool) -> Result<(), LockboxError> {
    let vault = Vault::from_config(&config.vault);
    let entry = args.into_entry()?;
    let passphrase = write_passphrase()?;
    store_entry(&vault, &passphrase, entry, assume_yes)
}

/// Save `entry`, asking first when its service is already stored.
pub fn store_entry(
    vault: &Vault,
    passphrase: &SecretString,
    entry: PlaintextEntry,
    assume_yes: bool,
) -> Result<(), LockboxError> {
    if !vault.contains_service(passphrase, &entry.service)? {
        return save(vault, passphrase, &entry);
    }

    let mut state = ConfirmState::Idle;
    state.request(PendingAction::SaveDuplicate(entry));
    let approved = match state.pending() {
        Some(action) => ask(action, assume_yes)?,
        None => false,
    };
    if !approved {
        state.cancel();
        println!("{}", "Nothing saved.".yellow());
        return Ok(());
    }
    if let Some(PendingAction::SaveDuplicate(entry)) = state.confirm() {
        save(vault, passphrase, &entry)?;
    }
    Ok(())
}

fn save(vault: &Vault, passphrase: &SecretString, entry: &PlaintextEntry) -> Result<(), LockboxError> {
    vault.save_entry(passphrase, entry)?;
    println!("{} entry for '{}'", "Saved".green(), entry.service);
    Ok(())
}

/// Run `lockbox load`.
pub fn run_load(config: &LockboxConfig, reveal: bool) -> Result<(), LockboxError> {
    let vault = Vault::from_config(&config.vault);
    if !vault.store().exists() {
        println!("No vault at {}.", vault.store().path().display());
        return Ok(());
    }

    let passphrase = get_passphrase()?;
    let report = vault.load_entries(&passphrase)?;
    if report.total == 0 {
        println!("Vault is empty.");
        return Ok(());
    }
    if report.all_failed() {
        eprintln!("{}", "Decryption failed for every entry.".red());
        return Err(LockboxError::Authentication);
    }

    println!("{}", format_header().bold());
    for entry in &report.entries {
        println!("{}", format_row(entry, reveal));
    }

    if report.failed > 0 {
        eprintln!(
            "{}",
            format!(
                "Loaded {} entries; {} to decrypt",
                report.entries.len(),
                report.summary()
            )
            .yellow()
        );
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}

/// Run `lockbox clear`.
pub fn run_clear(config: &LockboxConfig, assume_yes: bool) -> Result<(), LockboxError> {
    let vault = Vault::from_config(&config.vault);

    let mut state = ConfirmState::Idle;
    state.request(PendingAction::ClearVault);
    let approved = match state.pending() {
        Some(action) => ask(action, assume_yes)?,
        None => false,
    };
    if !approved {
        state.cancel();
        println!("{}", "Vault left unchanged.".yellow());
        return Ok(());
    }
    if let Some(PendingAction::ClearVault) = state.confirm() {
        vault.clear()?;
        println!("{}", "Vault cleared.".green());
    }
    Ok(())
}

fn format_header() -> String {
    format!("{:<24} {:<24} {}", "SERVICE", "USERNAME", "PASSWORD")
}

/// One table row; the password is masked unless `reveal` is set.
pub fn format_row(entry: &PlaintextEntry, reveal: bool) -> String {
    let password = if reveal {
        entry.password.clone()
    } else {
        mask_secret(&entry.password)
    };
    format!("{:<24} {:<24} {}", entry.service, entry.username, password)
}
