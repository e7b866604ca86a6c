// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox share`, `lockbox receive` and `lockbox identity`.

use std::time::Duration;

use clap::Args;
use colored::Colorize;
use lockbox_config::model::LockboxConfig;
use lockbox_core::LockboxError;
use lockbox_transfer::{
    receive_entry, share_entry, CertificateProvisioner, ReceiveOptions, SendOptions,
};
use lockbox_vault::Vault;

use crate::vault_cmd::{format_row, store_entry, write_passphrase, EntryArgs};

#[derive(Args, Debug)]
pub struct ShareArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    /// Receiver host. Defaults to `transfer.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Receiver port. Defaults to `transfer.port`.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Give up connecting after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Port to listen on. Defaults to `transfer.port`.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Stop waiting for a sender after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Store the received entry in the local vault.
    #[arg(long)]
    pub save: bool,

    /// Show the received password in full.
    #[arg(long)]
    pub reveal: bool,

    /// Confirm saving over an existing service without asking.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn seconds(value: Option<u64>) -> Option<Duration> {
    value.filter(|secs| *secs > 0).map(Duration::from_secs)
}

/// Run `lockbox share`.
pub fn run_share(config: &LockboxConfig, args: ShareArgs) -> Result<(), LockboxError> {
    let host = args.host.unwrap_or_else(|| config.transfer.host.clone());
    let port = args.port.unwrap_or(config.transfer.port);
    let options = SendOptions {
        connect_timeout: seconds(args.connect_timeout).or(config.transfer.connect_timeout()),
    };
    let entry = args.entry.into_entry()?;

    share_entry(&entry, &host, port, &options)?;
    println!("{} '{}' to {host}:{port}", "Shared".green(), entry.service);
    Ok(())
}

/// Run `lockbox receive`.
pub fn run_receive(config: &LockboxConfig, args: ReceiveArgs) -> Result<(), LockboxError> {
    let provisioner = CertificateProvisioner::from_config(&config.identity);
    let port = args.port.unwrap_or(config.transfer.port);
    let options = ReceiveOptions {
        bind_address: config.transfer.bind_address.clone(),
        accept_timeout: seconds(args.timeout).or(config.transfer.accept_timeout()),
    };

    println!(
        "Waiting for one credential on {}:{port}...",
        options.bind_address
    );
    let entry = receive_entry(port, &provisioner, &options)?;
    println!("{}", "Received".green());
    println!("{}", format_row(&entry, args.reveal));

    if args.save {
        entry.validate()?;
        let vault = Vault::from_config(&config.vault);
        let passphrase = write_passphrase()?;
        store_entry(&vault, &passphrase, entry, args.yes)?;
    }
    Ok(())
}

/// Run `lockbox identity`.
pub fn run_identity(config: &LockboxConfig) -> Result<(), LockboxError> {
    let provisioner = CertificateProvisioner::from_config(&config.identity);
    provisioner.ensure_identity()?;
    println!("certificate: {}", provisioner.cert_path().display());
    println!("private key: {}", provisioner.key_path().display());
    Ok(())
}
