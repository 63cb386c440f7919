// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Strongbox.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strongbox_core::BackendKind;

/// Top-level Strongbox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrongboxConfig {
    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Password generator defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Which key-value backend holds the records.
    #[serde(default)]
    pub backend: BackendConfig,

    /// SQLite backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Password generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of characters in a generated password.
    #[serde(default = "default_length")]
    pub length: usize,

    /// Include A-Z.
    #[serde(default = "default_true")]
    pub uppercase: bool,

    /// Include a-z.
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Include 0-9.
    #[serde(default = "default_true")]
    pub digits: bool,

    /// Include the symbol class.
    #[serde(default = "default_true")]
    pub symbols: bool,

    /// Characters never emitted, even when their class is enabled.
    #[serde(default = "default_excluded_chars")]
    pub excluded_chars: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            excluded_chars: default_excluded_chars(),
        }
    }
}

fn default_length() -> usize {
    12
}

fn default_true() -> bool {
    true
}

/// Punctuation excluded by default.
pub const DEFAULT_EXCLUDED_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

fn default_excluded_chars() -> String {
    DEFAULT_EXCLUDED_CHARS.to_string()
}

/// Backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// `sqlite` (local file) or `dynamodb` (remote table).
    #[serde(default = "default_backend_kind")]
    pub kind: BackendKind,

    /// DynamoDB table name. Falls back to the `DB` environment variable.
    #[serde(default)]
    pub table: String,

    /// AWS region. `None` uses the SDK's default region chain.
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            table: String::new(),
            region: None,
            endpoint_url: None,
        }
    }
}

fn default_backend_kind() -> BackendKind {
    BackendKind::Sqlite
}

/// SQLite backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("strongbox").join("strongbox.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("strongbox.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
