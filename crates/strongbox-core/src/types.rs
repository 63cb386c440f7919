// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types shared by every store backend and the version ledger.
//!
//! The attribute names and sort-key spellings here are the on-store encoding
//! and must not change: existing tables are read with exactly these strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Partition-key attribute name.
pub const PARTITION_KEY_ATTR: &str = "pk";

/// Sort-key attribute name.
pub const SORT_KEY_ATTR: &str = "sk";

/// Ciphertext attribute, present on both record kinds.
pub const PASSWORD_ATTR: &str = "password";

/// ISO-8601 creation time, present on versioned records.
pub const TIMESTAMP_ATTR: &str = "timestamp";

/// Version number, present on the current-pointer record.
pub const VERSION_ATTR: &str = "version";

/// Sort key of the current-pointer record.
pub const CURRENT_SORT_KEY: &str = "current";

/// Prefix shared by every versioned record's sort key.
pub const VERSION_PREFIX: &str = "version#";

/// A single attribute value, shaped like DynamoDB's typed attribute values.
///
/// Numbers are kept as integers; every number this system stores is a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    Str(String),
    #[serde(rename = "N")]
    Num(i64),
}

impl AttributeValue {
    /// Returns the string payload, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Num(_) => None,
        }
    }

    /// Returns the numeric payload, if this is a number attribute.
    pub fn as_num(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(_) => None,
        }
    }
}

/// Attributes of one record, excluding the partition and sort keys.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A full record as returned by a table scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub partition_key: String,
    pub sort_key: String,
    pub attributes: Attributes,
}

/// Filter applied by [`KvStore::scan`](crate::KvStore::scan) to sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    /// Sort key must equal the given string exactly.
    SortKeyEquals(String),
    /// Sort key must start with the given prefix.
    SortKeyPrefix(String),
}

impl ScanFilter {
    /// Returns true if `sort_key` passes this filter.
    pub fn matches(&self, sort_key: &str) -> bool {
        match self {
            Self::SortKeyEquals(expected) => sort_key == expected,
            Self::SortKeyPrefix(prefix) => sort_key.starts_with(prefix.as_str()),
        }
    }
}

/// The record discriminator within a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// The mutable pointer to the active version.
    Current,
    /// An immutable versioned record; versions start at 1.
    Version(u64),
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str(CURRENT_SORT_KEY),
            Self::Version(v) => write!(f, "{VERSION_PREFIX}{v}"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == CURRENT_SORT_KEY {
            return Ok(Self::Current);
        }
        let digits = s
            .strip_prefix(VERSION_PREFIX)
            .ok_or_else(|| format!("unrecognized sort key `{s}`"))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("sort key `{s}` has a non-numeric version"));
        }
        match digits.parse::<u64>() {
            Ok(0) => Err(format!("sort key `{s}` has version 0")),
            Ok(v) => Ok(Self::Version(v)),
            Err(e) => Err(format!("sort key `{s}`: {e}")),
        }
    }
}

/// Which [`KvStore`](crate::KvStore) implementation backs the vault.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    /// Local SQLite file.
    Sqlite,
    /// Remote DynamoDB table.
    Dynamodb,
}
