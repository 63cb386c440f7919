// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend selection from `[backend]` configuration.

use std::sync::Arc;

use strongbox_config::StrongboxConfig;
use strongbox_core::{BackendKind, KvStore, StrongboxError};
use tracing::debug;

/// Open the key-value store named by `config.backend.kind`.
pub async fn open_store(config: &StrongboxConfig) -> Result<Arc<dyn KvStore>, StrongboxError> {
    debug!(backend = %config.backend.kind, "opening store");
    match config.backend.kind {
        BackendKind::Sqlite => open_sqlite(config).await,
        BackendKind::Dynamodb => open_dynamodb(config).await,
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(config: &StrongboxConfig) -> Result<Arc<dyn KvStore>, StrongboxError> {
    let db = strongbox_storage::Database::open_config(&config.storage).await?;
    Ok(Arc::new(strongbox_storage::SqliteKvStore::new(db)))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_config: &StrongboxConfig) -> Result<Arc<dyn KvStore>, StrongboxError> {
    Err(StrongboxError::Config(
        "this build does not include the sqlite backend".to_string(),
    ))
}

#[cfg(feature = "dynamodb")]
async fn open_dynamodb(config: &StrongboxConfig) -> Result<Arc<dyn KvStore>, StrongboxError> {
    let store = strongbox_dynamo::DynamoKvStore::connect(&config.backend).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "dynamodb"))]
async fn open_dynamodb(_config: &StrongboxConfig) -> Result<Arc<dyn KvStore>, StrongboxError> {
    Err(StrongboxError::Config(
        "this build does not include the dynamodb backend".to_string(),
    ))
}
