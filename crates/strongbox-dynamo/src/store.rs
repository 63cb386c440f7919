// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DynamoDB implementation of the [`KvStore`] trait.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;
use strongbox_config::model::BackendConfig;
use strongbox_core::{Attributes, KvStore, Record, ScanFilter, StrongboxError};
use tracing::debug;

use crate::client::load_sdk_config;
use crate::codec::{self, Item};

/// Key-value store over one DynamoDB table with keys `pk` and `sk`.
///
/// Reads use strongly consistent reads so a version written by this process
/// is visible to the next `next_version` query.
#[derive(Debug, Clone)]
pub struct DynamoKvStore {
    client: Client,
    table: String,
}

/// Map an SDK error to [`StrongboxError::BackendUnavailable`], keeping the
/// full error chain in the message.
fn sdk_err<E>(operation: &str, table: &str, err: E) -> StrongboxError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = format!("{operation} on table `{table}` failed: {}", DisplayErrorContext(&err));
    StrongboxError::backend(message, err)
}

impl DynamoKvStore {
    /// Build a store from an existing client.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Build a store from backend configuration using the default AWS credential chain.
    pub async fn connect(config: &BackendConfig) -> Result<Self, StrongboxError> {
        if config.table.trim().is_empty() {
            return Err(StrongboxError::Config(
                "DynamoDB backend requires a table name".to_string(),
            ));
        }
        let sdk_config = load_sdk_config(config).await;
        Ok(Self::new(Client::new(&sdk_config), config.table.clone()))
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl KvStore for DynamoKvStore {
    fn name(&self) -> &str {
        "dynamodb"
    }

    async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        attributes: Attributes,
    ) -> Result<(), StrongboxError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(codec::to_item(partition_key, sort_key, attributes)))
            .send()
            .await
            .map_err(|e| sdk_err("PutItem", &self.table, e))?;
        debug!(partition_key = %partition_key, sort_key = %sort_key, "item written");
        Ok(())
    }

    async fn get(
        &self,
        partition_key: &str,
        sort_key: &str,
    ) -> Result<Option<Attributes>, StrongboxError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(codec::key(partition_key, sort_key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| sdk_err("GetItem", &self.table, e))?;

        output
            .item()
            .map(|item| codec::from_item(item).map(|record| record.attributes))
            .transpose()
    }

    async fn query(
        &self,
        partition_key: &str,
        sort_key_prefix: &str,
    ) -> Result<Vec<(String, Attributes)>, StrongboxError> {
        let mut rows = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("pk = :pk AND begins_with(sk, :prefix)")
                .expression_attribute_values(":pk", DynamoValue::S(partition_key.to_string()))
                .expression_attribute_values(
                    ":prefix",
                    DynamoValue::S(sort_key_prefix.to_string()),
                )
                .consistent_read(true)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| sdk_err("Query", &self.table, e))?;

            for item in output.items() {
                let record = codec::from_item(item)?;
                rows.push((record.sort_key, record.attributes));
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rows)
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Record>, StrongboxError> {
        let (expression, value) = match filter {
            ScanFilter::SortKeyEquals(sk) => ("sk = :sk", sk.clone()),
            ScanFilter::SortKeyPrefix(prefix) => ("begins_with(sk, :sk)", prefix.clone()),
        };

        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .filter_expression(expression)
                .consistent_read(true)
                .expression_attribute_values(":sk", DynamoValue::S(value.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| sdk_err("Scan", &self.table, e))?;

            for item in output.items() {
                records.push(codec::from_item(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        records.sort_by(|a, b| {
            (a.partition_key.as_str(), a.sort_key.as_str())
                .cmp(&(b.partition_key.as_str(), b.sort_key.as_str()))
        });
        Ok(records)
    }
}
