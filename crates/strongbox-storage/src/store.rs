// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KvStore`] trait.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use strongbox_core::{Attributes, KvStore, Record, ScanFilter, StrongboxError};

use crate::database::{map_tr_err, Database};

/// SQLite-backed key-value store.
///
/// Prefix matching uses `substr()` rather than `LIKE`, so `%` and `_` in
/// service names or prefixes are matched literally.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    db: Database,
}

impl SqliteKvStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn encode(attributes: &Attributes) -> Result<String, StrongboxError> {
    serde_json::to_string(attributes)
        .map_err(|e| StrongboxError::Internal(format!("cannot encode attributes: {e}")))
}

fn decode(partition_key: &str, sort_key: &str, json: &str) -> Result<Attributes, StrongboxError> {
    serde_json::from_str(json).map_err(|e| StrongboxError::MalformedRecord {
        service: partition_key.to_string(),
        sort_key: sort_key.to_string(),
        reason: format!("attributes are not valid JSON: {e}"),
    })
}

#[async_trait]
impl KvStore for SqliteKvStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        attributes: Attributes,
    ) -> Result<(), StrongboxError> {
        let json = encode(&attributes)?;
        let pk = partition_key.to_string();
        let sk = sort_key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO records (partition_key, sort_key, attributes)
                     VALUES (?1, ?2, ?3)",
                    params![pk, sk, json],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(partition_key = %partition_key, sort_key = %sort_key, "record written");
        Ok(())
    }

    async fn get(
        &self,
        partition_key: &str,
        sort_key: &str,
    ) -> Result<Option<Attributes>, StrongboxError> {
        let pk = partition_key.to_string();
        let sk = sort_key.to_string();
        let row = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT attributes FROM records WHERE partition_key = ?1 AND sort_key = ?2",
                    params![pk, sk],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        row.map(|json| decode(partition_key, sort_key, &json))
            .transpose()
    }

    async fn query(
        &self,
        partition_key: &str,
        sort_key_prefix: &str,
    ) -> Result<Vec<(String, Attributes)>, StrongboxError> {
        let pk = partition_key.to_string();
        let prefix = sort_key_prefix.to_string();
        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT sort_key, attributes FROM records
                     WHERE partition_key = ?1 AND substr(sort_key, 1, length(?2)) = ?2
                     ORDER BY sort_key",
                )?;
                let rows = stmt.query_map(params![pk, prefix], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)?;

        rows.into_iter()
            .map(|(sk, json)| {
                let attributes = decode(partition_key, &sk, &json)?;
                Ok((sk, attributes))
            })
            .collect()
    }

    /// Checkpoints the WAL and closes the shared connection. Clones of this
    /// store fail afterwards.
    async fn close(&self) -> Result<(), StrongboxError> {
        self.db.clone().close().await
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Record>, StrongboxError> {
        let (sql, arg) = match filter {
            ScanFilter::SortKeyEquals(sk) => (
                "SELECT partition_key, sort_key, attributes FROM records
                 WHERE sort_key = ?1
                 ORDER BY partition_key, sort_key",
                sk.clone(),
            ),
            ScanFilter::SortKeyPrefix(prefix) => (
                "SELECT partition_key, sort_key, attributes FROM records
                 WHERE substr(sort_key, 1, length(?1)) = ?1
                 ORDER BY partition_key, sort_key",
                prefix.clone(),
            ),
        };

        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<(String, String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(sql)?;
                let rows = stmt.query_map(params![arg], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)?;

        rows.into_iter()
            .map(|(pk, sk, json)| {
                let attributes = decode(&pk, &sk, &json)?;
                Ok(Record {
                    partition_key: pk,
                    sort_key: sk,
                    attributes,
                })
            })
            .collect()
    }
}
