// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strongbox secret ledger.

use thiserror::Error;

/// The primary error type used across the store trait, the ledger, and the vault.
#[derive(Debug, Error)]
pub enum StrongboxError {
    /// Generator options yield an empty or contradictory character set.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A cipher operation was attempted before a master key was configured.
    #[error("master key not set")]
    KeyNotSet,

    /// Ciphertext was malformed, the key was wrong, or padding validation failed.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The requested service, version, or current record does not exist.
    #[error("not found: {record} for service `{service}`")]
    NotFound { service: String, record: String },

    /// The store round trip failed (network, process, or database error).
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored record exists but does not carry the expected attributes.
    #[error("malformed record `{sort_key}` for service `{service}`: {reason}")]
    MalformedRecord {
        service: String,
        sort_key: String,
        reason: String,
    },

    /// Caller-supplied input was rejected before touching the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Application configuration errors (invalid TOML, missing table name).
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading the master key or another prompt failed.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrongboxError {
    /// Wrap a transport error from a store implementation.
    pub fn backend<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Convenience constructor for [`StrongboxError::NotFound`].
    pub fn not_found(service: &str, record: impl Into<String>) -> Self {
        Self::NotFound {
            service: service.to_string(),
            record: record.into(),
        }
    }

    /// Returns true for [`StrongboxError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`StrongboxError::BackendUnavailable`].
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}
