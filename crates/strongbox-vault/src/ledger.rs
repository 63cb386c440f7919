// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The versioning protocol over a [`KvStore`].
//!
//! Each service holds immutable `version#N` records plus one mutable
//! `current` record that copies the ciphertext and number of the active
//! version. A commit is two sequential puts with no transaction: the versioned
//! record first, then the current pointer. If the second put fails, history
//! and pointer stay diverged until the next successful write or rollback; the
//! failure is logged at `error` and returned to the caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use strongbox_core::{
    AttributeValue, Attributes, KvStore, ScanFilter, SortKey, StrongboxError, CURRENT_SORT_KEY,
    PASSWORD_ATTR, TIMESTAMP_ATTR, VERSION_ATTR, VERSION_PREFIX,
};
use tracing::{debug, error, info, warn};

/// One entry of a service's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: u64,
    /// ISO-8601 creation time, if the record carries one.
    pub timestamp: Option<String>,
}

/// Version bookkeeping for every service in one store.
#[derive(Clone)]
pub struct VersionLedger {
    store: Arc<dyn KvStore>,
}

impl std::fmt::Debug for VersionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionLedger")
            .field("store", &self.store.name())
            .finish()
    }
}

fn check_service(service: &str) -> Result<(), StrongboxError> {
    if service.trim().is_empty() {
        return Err(StrongboxError::InvalidInput(
            "service name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The `version` attribute is a signed 64-bit number on every backend.
fn stored_number(version: u64) -> Result<i64, StrongboxError> {
    i64::try_from(version)
        .map_err(|_| StrongboxError::Internal(format!("version {version} does not fit a stored number")))
}

/// Pull the ciphertext out of a record, rejecting records without one.
fn password_of(
    service: &str,
    sort_key: &str,
    attributes: &Attributes,
) -> Result<String, StrongboxError> {
    attributes
        .get(PASSWORD_ATTR)
        .and_then(AttributeValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| StrongboxError::MalformedRecord {
            service: service.to_string(),
            sort_key: sort_key.to_string(),
            reason: format!("missing string attribute `{PASSWORD_ATTR}`"),
        })
}

impl VersionLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Name of the backing store.
    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    /// Parse versioned sort keys, skipping any that do not parse.
    fn parse_versions<'a>(
        service: &str,
        rows: impl IntoIterator<Item = &'a (String, Attributes)>,
    ) -> Vec<(u64, &'a Attributes)> {
        rows.into_iter()
            .filter_map(|(sort_key, attributes)| match sort_key.parse::<SortKey>() {
                Ok(SortKey::Version(v)) => Some((v, attributes)),
                _ => {
                    warn!(service = %service, sort_key = %sort_key, "skipping unrecognized version record");
                    None
                }
            })
            .collect()
    }

    /// `max(existing version) + 1`, or 1 for a service with no history.
    ///
    /// A backend failure here degrades to 1 instead of failing. While the
    /// backend is unreachable this can hand out a version that already exists,
    /// and the following write then overwrites that versioned record. Any
    /// other error, such as a malformed record, is returned.
    pub async fn next_version(&self, service: &str) -> Result<u64, StrongboxError> {
        let rows = match self.store.query(service, VERSION_PREFIX).await {
            Ok(rows) => rows,
            Err(e) if e.is_backend() => {
                warn!(
                    service = %service,
                    error = %e,
                    "version scan failed, assuming no prior versions"
                );
                return Ok(1);
            }
            Err(e) => return Err(e),
        };

        let Some(max) = Self::parse_versions(service, &rows)
            .into_iter()
            .map(|(v, _)| v)
            .max()
        else {
            return Ok(1);
        };
        max.checked_add(1).ok_or_else(|| StrongboxError::MalformedRecord {
            service: service.to_string(),
            sort_key: SortKey::Version(max).to_string(),
            reason: "no version number follows this one".to_string(),
        })
    }

    /// Write `ciphertext` as a new version and repoint `current` at it.
    ///
    /// Returns the new version number.
    pub async fn write_version(&self, service: &str, ciphertext: &str) -> Result<u64, StrongboxError> {
        check_service(service)?;
        let version = self.next_version(service).await?;
        let number = stored_number(version)?;
        let sort_key = SortKey::Version(version).to_string();

        let versioned = Attributes::from([
            (PASSWORD_ATTR.to_string(), AttributeValue::Str(ciphertext.to_string())),
            (TIMESTAMP_ATTR.to_string(), AttributeValue::Str(now_iso8601())),
        ]);
        debug!(service = %service, version, sort_key = %sort_key, "writing versioned record");
        self.store.put(service, &sort_key, versioned).await?;

        debug!(service = %service, version, "updating current pointer");
        if let Err(e) = self.put_current(service, ciphertext, number).await {
            error!(
                service = %service,
                version,
                error = %e,
                "versioned record written but current pointer update failed; history and current have diverged"
            );
            return Err(e);
        }

        info!(service = %service, version, backend = self.store.name(), "secret version stored");
        Ok(version)
    }

    async fn put_current(
        &self,
        service: &str,
        ciphertext: &str,
        version: i64,
    ) -> Result<(), StrongboxError> {
        let current = Attributes::from([
            (PASSWORD_ATTR.to_string(), AttributeValue::Str(ciphertext.to_string())),
            (VERSION_ATTR.to_string(), AttributeValue::Num(version)),
        ]);
        self.store.put(service, CURRENT_SORT_KEY, current).await
    }

    /// Ciphertext of the current record.
    pub async fn read_current(&self, service: &str) -> Result<String, StrongboxError> {
        check_service(service)?;
        let attributes = self
            .store
            .get(service, CURRENT_SORT_KEY)
            .await?
            .ok_or_else(|| StrongboxError::not_found(service, CURRENT_SORT_KEY))?;
        password_of(service, CURRENT_SORT_KEY, &attributes)
    }

    /// Version number the current record points at.
    pub async fn current_version(&self, service: &str) -> Result<u64, StrongboxError> {
        check_service(service)?;
        let attributes = self
            .store
            .get(service, CURRENT_SORT_KEY)
            .await?
            .ok_or_else(|| StrongboxError::not_found(service, CURRENT_SORT_KEY))?;
        attributes
            .get(VERSION_ATTR)
            .and_then(AttributeValue::as_num)
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| StrongboxError::MalformedRecord {
                service: service.to_string(),
                sort_key: CURRENT_SORT_KEY.to_string(),
                reason: format!("missing numeric attribute `{VERSION_ATTR}`"),
            })
    }

    /// Ciphertext of one versioned record.
    pub async fn read_version(&self, service: &str, version: u64) -> Result<String, StrongboxError> {
        check_service(service)?;
        let sort_key = SortKey::Version(version).to_string();
        let attributes = self
            .store
            .get(service, &sort_key)
            .await?
            .ok_or_else(|| StrongboxError::not_found(service, sort_key.clone()))?;
        password_of(service, &sort_key, &attributes)
    }

    /// Repoint `current` at an existing version. Creates no new version.
    pub async fn set_current(&self, service: &str, version: u64) -> Result<(), StrongboxError> {
        let number = stored_number(version)?;
        let ciphertext = self.read_version(service, version).await?;
        self.put_current(service, &ciphertext, number).await?;
        info!(service = %service, version, "current pointer moved");
        Ok(())
    }

    /// History of a service, newest first. Empty when the service is unknown.
    pub async fn list_versions(&self, service: &str) -> Result<Vec<VersionEntry>, StrongboxError> {
        check_service(service)?;
        let rows = self.store.query(service, VERSION_PREFIX).await?;

        let mut entries: Vec<VersionEntry> = Self::parse_versions(service, &rows)
            .into_iter()
            .map(|(version, attributes)| VersionEntry {
                version,
                timestamp: attributes
                    .get(TIMESTAMP_ATTR)
                    .and_then(AttributeValue::as_str)
                    .map(str::to_string),
            })
            .collect();
        entries.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(entries)
    }

    /// Every service that has a current record.
    pub async fn list_services(&self) -> Result<BTreeSet<String>, StrongboxError> {
        let records = self
            .store
            .scan(&ScanFilter::SortKeyEquals(CURRENT_SORT_KEY.to_string()))
            .await?;
        Ok(records.into_iter().map(|r| r.partition_key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_test_utils::MockKvStore;
    use tracing_test::traced_test;

    fn ledger() -> (VersionLedger, MockKvStore) {
        let store = MockKvStore::new();
        (VersionLedger::new(Arc::new(store.clone())), store)
    }

    fn versioned(ciphertext: &str) -> Attributes {
        Attributes::from([
            (PASSWORD_ATTR.to_string(), AttributeValue::Str(ciphertext.to_string())),
            (TIMESTAMP_ATTR.to_string(), AttributeValue::Str("2024-01-01T00:00:00.000Z".to_string())),
        ])
    }

    #[tokio::test]
    async fn next_version_starts_at_one() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.next_version("db").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn next_version_tolerates_gaps() {
        let (ledger, store) = ledger();
        store.insert_raw("db", "version#1", versioned("a")).await;
        store.insert_raw("db", "version#7", versioned("b")).await;
        store.insert_raw("other", "version#40", versioned("c")).await;
        assert_eq!(ledger.next_version("db").await.unwrap(), 8);
    }

    #[tokio::test]
    async fn next_version_compares_numerically() {
        let (ledger, store) = ledger();
        store.insert_raw("db", "version#9", versioned("a")).await;
        store.insert_raw("db", "version#10", versioned("b")).await;
        assert_eq!(ledger.next_version("db").await.unwrap(), 11);
    }

    #[tokio::test]
    #[traced_test]
    async fn next_version_degrades_to_one_on_backend_failure() {
        let (ledger, store) = ledger();
        store.insert_raw("db", "version#3", versioned("a")).await;
        store.fail_queries().await;

        assert_eq!(ledger.next_version("db").await.unwrap(), 1);
        assert!(logs_contain("assuming no prior versions"));
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_history_blocks_new_versions() {
        let (ledger, store) = ledger();
        ledger.write_version("db", "c1").await.unwrap();
        store.malform_queries().await;

        let err = ledger.write_version("db", "c2").await.unwrap_err();
        assert!(matches!(err, StrongboxError::MalformedRecord { .. }), "got {err:?}");
        assert!(!logs_contain("assuming no prior versions"));

        store.heal().await;
        assert_eq!(ledger.read_version("db", 1).await.unwrap(), "c1");
        assert_eq!(ledger.read_current("db").await.unwrap(), "c1");
        assert_eq!(store.put_count().await, 2);
    }

    #[tokio::test]
    async fn exhausted_version_numbers_are_an_error() {
        let (ledger, store) = ledger();
        store.insert_raw("db", &format!("version#{}", u64::MAX), versioned("a")).await;

        let err = ledger.next_version("db").await.unwrap_err();
        assert!(matches!(err, StrongboxError::MalformedRecord { .. }), "got {err:?}");
        assert!(ledger.write_version("db", "c1").await.is_err());
        assert_eq!(store.put_count().await, 0);
    }

    #[tokio::test]
    async fn version_beyond_stored_range_writes_nothing() {
        let (ledger, store) = ledger();
        store.insert_raw("db", &format!("version#{}", i64::MAX), versioned("a")).await;

        let err = ledger.write_version("db", "c1").await.unwrap_err();
        assert!(matches!(err, StrongboxError::Internal(_)), "got {err:?}");
        assert_eq!(store.put_count().await, 0);
        assert!(ledger.read_current("db").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn write_version_writes_versioned_and_current() {
        let (ledger, store) = ledger();
        let v1 = ledger.write_version("db", "c1").await.unwrap();
        let v2 = ledger.write_version("db", "c2").await.unwrap();
        assert_eq!((v1, v2), (1, 2));

        assert_eq!(ledger.read_current("db").await.unwrap(), "c2");
        assert_eq!(ledger.read_version("db", 1).await.unwrap(), "c1");
        assert_eq!(ledger.read_version("db", 2).await.unwrap(), "c2");
        assert_eq!(ledger.current_version("db").await.unwrap(), 2);
        assert_eq!(store.records().await.len(), 3);
    }

    #[tokio::test]
    async fn versioned_record_encoding() {
        let (ledger, store) = ledger();
        ledger.write_version("db", "aa:bb").await.unwrap();

        let records = store.records().await;
        let current = records.iter().find(|r| r.sort_key == "current").unwrap();
        assert_eq!(current.attributes.get("version"), Some(&AttributeValue::Num(1)));
        assert_eq!(
            current.attributes.get("password"),
            Some(&AttributeValue::Str("aa:bb".into()))
        );

        let versioned = records.iter().find(|r| r.sort_key == "version#1").unwrap();
        let timestamp = versioned.attributes.get("timestamp").and_then(AttributeValue::as_str).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
        assert_eq!(timestamp.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_current_update_is_logged_and_returned() {
        let (ledger, store) = ledger();
        ledger.write_version("db", "c1").await.unwrap();

        // Puts so far: version#1, current. The next write's second put fails.
        store.fail_nth_put(2).await;
        let err = ledger.write_version("db", "c2").await.unwrap_err();
        assert!(err.is_backend());
        assert!(logs_contain("history and current have diverged"));

        // The versioned record landed; the pointer still names version 1.
        assert_eq!(ledger.read_version("db", 2).await.unwrap(), "c2");
        assert_eq!(ledger.read_current("db").await.unwrap(), "c1");
    }

    #[tokio::test]
    async fn failed_first_put_writes_nothing() {
        let (ledger, store) = ledger();
        store.fail_nth_put(1).await;
        assert!(ledger.write_version("db", "c1").await.is_err());
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn reads_of_missing_records_are_not_found() {
        let (ledger, _) = ledger();
        assert!(ledger.read_current("db").await.unwrap_err().is_not_found());
        assert!(ledger.read_version("db", 1).await.unwrap_err().is_not_found());
        assert!(ledger.set_current("db", 1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn record_without_password_is_malformed() {
        let (ledger, store) = ledger();
        store
            .insert_raw("db", "current", Attributes::from([(VERSION_ATTR.to_string(), AttributeValue::Num(1))]))
            .await;
        let err = ledger.read_current("db").await.unwrap_err();
        assert!(matches!(err, StrongboxError::MalformedRecord { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn set_current_repoints_without_new_version() {
        let (ledger, _) = ledger();
        ledger.write_version("db", "c1").await.unwrap();
        ledger.write_version("db", "c2").await.unwrap();

        ledger.set_current("db", 1).await.unwrap();
        assert_eq!(ledger.read_current("db").await.unwrap(), "c1");
        assert_eq!(ledger.current_version("db").await.unwrap(), 1);
        assert_eq!(ledger.list_versions("db").await.unwrap().len(), 2);
        assert_eq!(ledger.next_version("db").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_versions_is_newest_first_and_skips_junk() {
        let (ledger, store) = ledger();
        store.insert_raw("db", "version#2", versioned("b")).await;
        store.insert_raw("db", "version#10", versioned("c")).await;
        store.insert_raw("db", "version#1", versioned("a")).await;
        store.insert_raw("db", "version#oops", versioned("x")).await;

        let versions: Vec<u64> = ledger
            .list_versions("db")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.version)
            .collect();
        assert_eq!(versions, vec![10, 2, 1]);
    }

    #[tokio::test]
    async fn list_versions_of_unknown_service_is_empty() {
        let (ledger, _) = ledger();
        assert!(ledger.list_versions("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_propagate_backend_failures() {
        let (ledger, store) = ledger();
        store.fail_queries().await;
        store.fail_scans().await;
        assert!(ledger.list_versions("db").await.unwrap_err().is_backend());
        assert!(ledger.list_services().await.unwrap_err().is_backend());
    }

    #[tokio::test]
    async fn list_services_only_counts_current_records() {
        let (ledger, store) = ledger();
        ledger.write_version("db", "c1").await.unwrap();
        ledger.write_version("web", "c2").await.unwrap();
        store.insert_raw("orphan", "version#1", versioned("x")).await;

        let services: Vec<String> = ledger.list_services().await.unwrap().into_iter().collect();
        assert_eq!(services, vec!["db".to_string(), "web".to_string()]);
    }

    #[tokio::test]
    async fn empty_service_is_rejected() {
        let (ledger, store) = ledger();
        let err = ledger.write_version("  ", "c1").await.unwrap_err();
        assert!(matches!(err, StrongboxError::InvalidInput(_)));
        assert_eq!(store.put_count().await, 0);
    }
}
