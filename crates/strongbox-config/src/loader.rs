// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./strongbox.toml` > `~/.config/strongbox/strongbox.toml` >
//! `/etc/strongbox/strongbox.toml` with environment variable overrides via `STRONGBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StrongboxConfig;

/// Config sections addressable from `STRONGBOX_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["logging", "generator", "backend", "storage"];

/// Legacy variable naming the DynamoDB table.
pub const LEGACY_TABLE_ENV_VAR: &str = "DB";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `DB` (legacy table name)
/// 3. `/etc/strongbox/strongbox.toml` (system-wide)
/// 4. `~/.config/strongbox/strongbox.toml` (user XDG config)
/// 5. `./strongbox.toml` (local directory)
/// 6. `STRONGBOX_*` environment variables
pub fn load_config() -> Result<StrongboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(legacy_table_provider())
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/strongbox/strongbox.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("strongbox").join("strongbox.toml"));
    }
    paths.push(PathBuf::from("strongbox.toml"));
    paths
}

/// Build the layered Figment behind [`load_config`].
pub fn build_figment() -> Figment {
    let files = search_paths()
        .into_iter()
        .fold(Figment::new(), |figment, path| figment.merge(Toml::file(path)));

    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(legacy_table_provider())
        .merge(files)
        .merge(env_provider())
}

/// `DB=<table>` maps to `backend.table`; config files and `STRONGBOX_BACKEND_TABLE` win over it.
fn legacy_table_provider() -> Env {
    Env::raw()
        .only(&[LEGACY_TABLE_ENV_VAR])
        .map(|_| "backend.table".into())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `STRONGBOX_BACKEND_ENDPOINT_URL` must map to
/// `backend.endpoint_url`, not `backend.endpoint.url`.
///
/// `STRONGBOX_MASTER_KEY` is a secret, not a config key, and is ignored here.
fn env_provider() -> Env {
    Env::prefixed("STRONGBOX_")
        .ignore(&["MASTER_KEY"])
        .map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
