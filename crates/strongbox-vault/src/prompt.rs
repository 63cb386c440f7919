// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key and input acquisition via TTY prompt or environment.

use std::io::{BufRead, IsTerminal};

use secrecy::SecretString;
use strongbox_core::StrongboxError;

/// The environment variable name for providing the master key.
pub const MASTER_KEY_ENV_VAR: &str = "STRONGBOX_MASTER_KEY";

/// Get the master key from environment variable or interactive TTY prompt.
///
/// Priority:
/// 1. `STRONGBOX_MASTER_KEY` environment variable (for scripts and CI)
/// 2. Masked TTY prompt via `rpassword`
///
/// Returns an error if neither source is available.
pub fn get_master_key() -> Result<SecretString, StrongboxError> {
    if let Ok(key) = std::env::var(MASTER_KEY_ENV_VAR)
        && !key.is_empty()
    {
        return Ok(SecretString::from(key));
    }

    if std::io::stdin().is_terminal() {
        eprint!("Master key: ");
        let key = rpassword::read_password()
            .map_err(|e| StrongboxError::Prompt(format!("failed to read master key: {e}")))?;
        if key.is_empty() {
            return Err(StrongboxError::Prompt("empty master key not allowed".to_string()));
        }
        return Ok(SecretString::from(key));
    }

    Err(StrongboxError::Prompt(
        "No master key provided. Set STRONGBOX_MASTER_KEY environment variable or run interactively."
            .to_string(),
    ))
}

/// Read one line from `reader`, without the trailing newline.
fn read_line(reader: &mut impl BufRead) -> Result<String, StrongboxError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| StrongboxError::Prompt(format!("failed to read input: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Parse a service name, rejecting blank input.
pub fn parse_service_name(input: &str) -> Result<String, StrongboxError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(StrongboxError::InvalidInput(
            "service name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Prompt for a service name with visible input on stderr, reading stdin.
pub fn prompt_service_name() -> Result<String, StrongboxError> {
    eprint!("Service name: ");
    let line = read_line(&mut std::io::stdin().lock())?;
    parse_service_name(&line)
}

/// Prompt for an existing password to store.
///
/// Masked on a TTY; read as one plain line from piped stdin otherwise.
pub fn prompt_existing_password() -> Result<SecretString, StrongboxError> {
    let password = if std::io::stdin().is_terminal() {
        eprint!("Password to store: ");
        rpassword::read_password()
            .map_err(|e| StrongboxError::Prompt(format!("failed to read password: {e}")))?
    } else {
        read_line(&mut std::io::stdin().lock())?
    };

    if password.is_empty() {
        return Err(StrongboxError::Prompt("empty password not allowed".to_string()));
    }
    Ok(SecretString::from(password))
}
