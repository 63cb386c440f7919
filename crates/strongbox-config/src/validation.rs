// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde attributes cannot express: a usable generator
//! shape, a table name when DynamoDB is selected, a database path when SQLite
//! is selected.

use strongbox_core::BackendKind;

use crate::diagnostic::ConfigError;
use crate::model::StrongboxConfig;

/// Levels accepted by `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StrongboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let generator = &config.generator;
    if generator.length == 0 {
        errors.push(ConfigError::Validation {
            message: "generator.length must be at least 1".to_string(),
        });
    }

    if !(generator.uppercase || generator.lowercase || generator.digits || generator.symbols) {
        errors.push(ConfigError::Validation {
            message: "generator must enable at least one of uppercase, lowercase, digits, symbols"
                .to_string(),
        });
    }

    match config.backend.kind {
        BackendKind::Dynamodb => {
            if config.backend.table.trim().is_empty() {
                errors.push(ConfigError::Validation {
                    message: "backend.table must be set when backend.kind = \"dynamodb\" \
                              (or export DB=<table>)"
                        .to_string(),
                });
            }
        }
        BackendKind::Sqlite => {
            if config.storage.database_path.trim().is_empty() {
                errors.push(ConfigError::Validation {
                    message: "storage.database_path must not be empty".to_string(),
                });
            }
        }
    }

    if let Some(endpoint) = &config.backend.endpoint_url
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("backend.endpoint_url `{endpoint}` must start with http:// or https://"),
        });
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

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = StrongboxConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_length_fails_validation() {
        let mut config = StrongboxConfig::default();
        config.generator.length = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "generator.length"));
    }

    #[test]
    fn all_classes_disabled_fails_validation() {
        let mut config = StrongboxConfig::default();
        config.generator.uppercase = false;
        config.generator.lowercase = false;
        config.generator.digits = false;
        config.generator.symbols = false;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "at least one of"));
    }

    #[test]
    fn dynamodb_requires_table() {
        let mut config = StrongboxConfig::default();
        config.backend.kind = BackendKind::Dynamodb;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "backend.table"));

        config.backend.table = "secrets".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn sqlite_requires_database_path() {
        let mut config = StrongboxConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = StrongboxConfig::default();
        config.logging.level = "loud".to_string();
        config.generator.length = 0;
        config.backend.endpoint_url = Some("localhost:8000".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = StrongboxConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
