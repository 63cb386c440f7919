// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store trait for record persistence backends (SQLite, DynamoDB).

use async_trait::async_trait;

use crate::error::StrongboxError;
use crate::types::{Attributes, Record, ScanFilter};

/// A partitioned key-value table addressed by `(partition_key, sort_key)`.
///
/// Implementations map transport failures to
/// [`StrongboxError::BackendUnavailable`]. An absent record is not an error
/// at this layer: [`get`](KvStore::get) returns `Ok(None)`.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Writes a record, replacing any existing record with the same keys.
    async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        attributes: Attributes,
    ) -> Result<(), StrongboxError>;

    /// Reads one record's attributes.
    async fn get(
        &self,
        partition_key: &str,
        sort_key: &str,
    ) -> Result<Option<Attributes>, StrongboxError>;

    /// Lists records in one partition whose sort key starts with `sort_key_prefix`,
    /// ordered by sort key ascending.
    async fn query(
        &self,
        partition_key: &str,
        sort_key_prefix: &str,
    ) -> Result<Vec<(String, Attributes)>, StrongboxError>;

    /// Lists records across all partitions whose sort key passes `filter`.
    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Record>, StrongboxError>;

    /// Flushes and releases the backend. Stateless backends have nothing to do.
    async fn close(&self) -> Result<(), StrongboxError> {
        Ok(())
    }
}
