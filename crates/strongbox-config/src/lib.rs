// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongbox configuration.
//!
//! `[logging]`, `[generator]`, `[backend]` and `[storage]` are merged from
//! compiled defaults, the system and user config files, `./strongbox.toml`
//! and `STRONGBOX_*` variables. Unknown keys are rejected.
//!
//! # Usage
//!
//! ```no_run
//! use strongbox_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("backend: {}", config.backend.kind);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError, SourceFile};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::StrongboxConfig;

/// Load the layered configuration and validate it.
///
/// Deserialization failures come back as diagnostics pointing into the
/// config file that caused them.
pub fn load_and_validate() -> Result<StrongboxConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::search_paths()
            .iter()
            .filter_map(|path| SourceFile::read(&absolute(path)))
            .collect()
    })
}

/// Load one explicit config file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<StrongboxConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        SourceFile::read(&absolute(path)).into_iter().collect()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<StrongboxConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![SourceFile::new("<inline>", toml_content)]
    })
}

fn checked(
    loaded: Result<StrongboxConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<SourceFile>,
) -> Result<StrongboxConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Figment reports file sources by absolute path.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
