// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value store with fault injection.
//!
//! `MockKvStore` implements `KvStore` over a `BTreeMap`, so query and scan
//! results come back in key order without any sorting of their own. Each
//! operation can be told to fail with `BackendUnavailable` to exercise the
//! ledger's degrade and divergence paths.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use strongbox_core::{Attributes, KvStore, Record, ScanFilter, StrongboxError};

type Key = (String, String);

#[derive(Debug, Default)]
struct FailurePlan {
    query: bool,
    /// Queries fail as if a returned row could not be decoded.
    malformed_query: bool,
    get: bool,
    scan: bool,
    /// 1-based index of the `put` call that fails.
    put_at: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<Key, Attributes>,
    plan: FailurePlan,
    puts: usize,
}

/// An in-memory store whose operations can be made to fail on demand.
///
/// Clones share the same records and failure plan.
#[derive(Debug, Clone, Default)]
pub struct MockKvStore {
    state: Arc<Mutex<State>>,
}

fn injected(operation: &str) -> StrongboxError {
    StrongboxError::backend(
        format!("mock {operation} failed"),
        std::io::Error::other("injected failure"),
    )
}

impl MockKvStore {
    /// Create an empty store with no failures planned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `query` fail.
    pub async fn fail_queries(&self) {
        self.state.lock().await.plan.query = true;
    }

    /// Make every `query` fail with `MalformedRecord`, the way a backend
    /// reports a row it cannot decode.
    pub async fn malform_queries(&self) {
        self.state.lock().await.plan.malformed_query = true;
    }

    /// Make every `get` fail.
    pub async fn fail_gets(&self) {
        self.state.lock().await.plan.get = true;
    }

    /// Make every `scan` fail.
    pub async fn fail_scans(&self) {
        self.state.lock().await.plan.scan = true;
    }

    /// Make the `n`-th `put` from now fail (1-based). Earlier and later puts succeed.
    pub async fn fail_nth_put(&self, n: usize) {
        let mut state = self.state.lock().await;
        state.plan.put_at = Some(state.puts + n);
    }

    /// Clear every planned failure.
    pub async fn heal(&self) {
        self.state.lock().await.plan = FailurePlan::default();
    }

    /// Insert a record directly, bypassing the failure plan and put counter.
    pub async fn insert_raw(&self, partition_key: &str, sort_key: &str, attributes: Attributes) {
        self.state
            .lock()
            .await
            .records
            .insert((partition_key.to_string(), sort_key.to_string()), attributes);
    }

    /// Snapshot of every stored record, in key order.
    pub async fn records(&self) -> Vec<Record> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .map(|((pk, sk), attributes)| Record {
                partition_key: pk.clone(),
                sort_key: sk.clone(),
                attributes: attributes.clone(),
            })
            .collect()
    }

    /// Number of `put` calls attempted so far, failed ones included.
    pub async fn put_count(&self) -> usize {
        self.state.lock().await.puts
    }
}

#[async_trait]
impl KvStore for MockKvStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        attributes: Attributes,
    ) -> Result<(), StrongboxError> {
        let mut state = self.state.lock().await;
        state.puts += 1;
        if state.plan.put_at == Some(state.puts) {
            return Err(injected("put"));
        }
        state
            .records
            .insert((partition_key.to_string(), sort_key.to_string()), attributes);
        Ok(())
    }

    async fn get(
        &self,
        partition_key: &str,
        sort_key: &str,
    ) -> Result<Option<Attributes>, StrongboxError> {
        let state = self.state.lock().await;
        if state.plan.get {
            return Err(injected("get"));
        }
        Ok(state
            .records
            .get(&(partition_key.to_string(), sort_key.to_string()))
            .cloned())
    }

    async fn query(
        &self,
        partition_key: &str,
        sort_key_prefix: &str,
    ) -> Result<Vec<(String, Attributes)>, StrongboxError> {
        let state = self.state.lock().await;
        if state.plan.query {
            return Err(injected("query"));
        }
        if state.plan.malformed_query {
            return Err(StrongboxError::MalformedRecord {
                service: partition_key.to_string(),
                sort_key: sort_key_prefix.to_string(),
                reason: "mock row could not be decoded".to_string(),
            });
        }
        Ok(state
            .records
            .iter()
            .filter(|((pk, sk), _)| pk == partition_key && sk.starts_with(sort_key_prefix))
            .map(|((_, sk), attributes)| (sk.clone(), attributes.clone()))
            .collect())
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Record>, StrongboxError> {
        let state = self.state.lock().await;
        if state.plan.scan {
            return Err(injected("scan"));
        }
        Ok(state
            .records
            .iter()
            .filter(|((_, sk), _)| filter.matches(sk))
            .map(|((pk, sk), attributes)| Record {
                partition_key: pk.clone(),
                sort_key: sk.clone(),
                attributes: attributes.clone(),
            })
            .collect())
    }
}
