// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongbox - a versioned secret vault.
//!
//! This is the binary entry point for the Strongbox CLI.

mod backend;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use strongbox_config::StrongboxConfig;
use strongbox_core::StrongboxError;
use strongbox_vault::{prompt, GeneratorOptions, PasswordGenerator, Vault};
use tracing::warn;

/// Strongbox - a versioned secret vault.
#[derive(Parser, Debug)]
#[command(name = "strongbox", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard search path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new password for a service and store it as the next version.
    Generate {
        /// Service name. Prompted for when omitted.
        service: Option<String>,
        /// Override the configured password length.
        #[arg(long)]
        length: Option<usize>,
    },
    /// Store an existing password for a service as the next version.
    Set {
        /// Service name. Prompted for when omitted.
        service: Option<String>,
    },
    /// Print the current (or a specific) password of a service.
    Get {
        service: String,
        /// Version to print instead of the current one.
        #[arg(long)]
        version: Option<u64>,
    },
    /// List the versions of a service, newest first.
    History { service: String },
    /// Point a service back at an existing version.
    Rollback { service: String, version: u64 },
    /// List every service with a current password.
    Services,
}

impl Commands {
    /// Whether the command encrypts or decrypts and so needs the master key.
    fn needs_master_key(&self) -> bool {
        matches!(self, Self::Generate { .. } | Self::Set { .. } | Self::Get { .. })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => strongbox_config::load_and_validate_path(path),
        None => strongbox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            strongbox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &StrongboxConfig) -> Result<(), StrongboxError> {
    let mut options = GeneratorOptions::from(&config.generator);
    if let Commands::Generate {
        length: Some(length),
        ..
    } = &command
    {
        options.length = *length;
    }
    let generator = PasswordGenerator::new(&options)?;

    let store = backend::open_store(config).await?;
    let result = dispatch(command, Vault::new(store.clone(), generator)).await;
    if let Err(e) = store.close().await {
        warn!(backend = store.name(), error = %e, "failed to close store");
    }
    result
}

async fn dispatch(command: Commands, mut vault: Vault) -> Result<(), StrongboxError> {
    if command.needs_master_key() {
        vault.set_master_key(&prompt::get_master_key()?)?;
    }

    let mut out = std::io::stdout().lock();
    match command {
        Commands::Generate { service, .. } => {
            let service = service_or_prompt(service)?;
            commands::generate(&vault, &service, &mut out).await
        }
        Commands::Set { service } => {
            let service = service_or_prompt(service)?;
            let password = prompt::prompt_existing_password()?;
            commands::set(&vault, &service, &password, &mut out).await
        }
        Commands::Get { service, version } => {
            commands::get(&vault, &service, version, &mut out).await
        }
        Commands::History { service } => commands::history(&vault, &service, &mut out).await,
        Commands::Rollback { service, version } => {
            commands::rollback(&vault, &service, version, &mut out).await
        }
        Commands::Services => commands::services(&vault, &mut out).await,
    }
}

fn service_or_prompt(service: Option<String>) -> Result<String, StrongboxError> {
    match service {
        Some(name) => prompt::parse_service_name(&name),
        None => prompt::prompt_service_name(),
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strongbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
