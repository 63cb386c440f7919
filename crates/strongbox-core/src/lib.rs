// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strongbox secret ledger.
//!
//! This crate provides the error taxonomy, the on-store record types, and the
//! [`KvStore`] trait that every storage backend implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StrongboxError;
pub use traits::KvStore;
pub use types::{
    AttributeValue, Attributes, BackendKind, Record, ScanFilter, SortKey, CURRENT_SORT_KEY,
    PARTITION_KEY_ATTR, PASSWORD_ATTR, SORT_KEY_ATTR, TIMESTAMP_ATTR, VERSION_ATTR,
    VERSION_PREFIX,
};
