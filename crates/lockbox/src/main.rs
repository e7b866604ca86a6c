// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lockbox - an encrypted credential vault with one-shot TLS sharing.
//!
//! This is the binary entry point. Everything here is presentation: the
//! vault and transfer crates do the work.

mod confirm;
mod transfer_cmd;
mod vault_cmd;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use lockbox_config::model::LockboxConfig;
use lockbox_config::ConfigError;
use lockbox_core::LockboxError;

use crate::transfer_cmd::{ReceiveArgs, ShareArgs};
use crate::vault_cmd::EntryArgs;

/// Lockbox - store credentials under one master passphrase.
#[derive(Parser, Debug)]
#[command(name = "lockbox", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a credential and add it to the vault.
    Save {
        #[command(flatten)]
        entry: EntryArgs,
        /// Save even if the service already has an entry.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Decrypt and list every entry readable with the passphrase.
    Load {
        /// Show passwords in full.
        #[arg(long)]
        reveal: bool,
    },
    /// Delete every entry in the vault.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Send one credential to a waiting receiver.
    Share(ShareArgs),
    /// Wait for one credential from a sender.
    Receive(ReceiveArgs),
    /// Create the receiver certificate if needed and print its location.
    Identity,
}

/// figment reads a missing file as empty, so an explicit path is checked first.
fn require_config_file(path: Option<&Path>) -> Result<(), LockboxError> {
    match path {
        Some(path) if !path.is_file() => Err(LockboxError::Config(format!(
            "config file {} not found",
            path.display()
        ))),
        _ => Ok(()),
    }
}

fn load_config(path: Option<&Path>) -> Result<LockboxConfig, Vec<ConfigError>> {
    match path {
        Some(path) => lockbox_config::load_and_validate_path(path),
        None => lockbox_config::load_and_validate(),
    }
}

fn run(command: Commands, config: &LockboxConfig) -> Result<(), LockboxError> {
    match command {
        Commands::Save { entry, yes } => vault_cmd::run_save(config, entry, yes),
        Commands::Load { reveal } => vault_cmd::run_load(config, reveal),
        Commands::Clear { yes } => vault_cmd::run_clear(config, yes),
        Commands::Share(args) => transfer_cmd::run_share(config, args),
        Commands::Receive(args) => transfer_cmd::run_receive(config, args),
        Commands::Identity => transfer_cmd::run_identity(config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = require_config_file(cli.config.as_deref()) {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lockbox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, &config) {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lockbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
