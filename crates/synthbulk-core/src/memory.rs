//! In-memory monitor store
//!
//! [`MonitorClient`] over a concurrent map, with per-entity failure and
//! latency injection. Backs the CLI's file store and the test suites.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use synthbulk_model::{MonitorRecord, MonitorUpdate};

use crate::client::{MonitorClient, MonitorFilter};
use crate::error::ClientError;

/// Concurrent in-memory store
#[derive(Debug, Default)]
pub struct InMemoryClient {
    records: DashMap<String, MonitorRecord>,
    failing_gets: DashMap<String, ClientError>,
    failing_replaces: DashMap<String, String>,
    latency: DashMap<String, Duration>,
    replace_calls: AtomicUsize,
}

impl InMemoryClient {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding `records`
    #[must_use]
    pub fn from_records<I: IntoIterator<Item = MonitorRecord>>(records: I) -> Self {
        let client = Self::new();
        for record in records {
            client.insert(record);
        }
        client
    }

    /// Insert or overwrite a record
    pub fn insert(&self, record: MonitorRecord) {
        self.records.insert(record.entity_id.clone(), record);
    }

    /// Current state of one record
    #[must_use]
    pub fn record(&self, entity_id: &str) -> Option<MonitorRecord> {
        self.records.get(entity_id).map(|r| r.value().clone())
    }

    /// Every record, ordered by entity id
    #[must_use]
    pub fn records(&self) -> Vec<MonitorRecord> {
        let mut records: Vec<_> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        records
    }

    /// Make `get` fail for one entity
    pub fn fail_get(&self, entity_id: impl Into<String>, error: ClientError) {
        self.failing_gets.insert(entity_id.into(), error);
    }

    /// Make `replace` fail for one entity
    pub fn fail_replace(&self, entity_id: impl Into<String>, message: impl Into<String>) {
        self.failing_replaces.insert(entity_id.into(), message.into());
    }

    /// Delay every call touching one entity
    pub fn set_latency(&self, entity_id: impl Into<String>, latency: Duration) {
        self.latency.insert(entity_id.into(), latency);
    }

    /// Number of `replace` calls received, failed ones included
    #[inline]
    #[must_use]
    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self, entity_id: &str) {
        let latency = self.latency.get(entity_id).map(|l| *l.value());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MonitorClient for InMemoryClient {
    async fn get(&self, entity_id: &str) -> Result<MonitorRecord, ClientError> {
        self.delay(entity_id).await;
        if let Some(error) = self.failing_gets.get(entity_id) {
            return Err(error.value().clone());
        }
        self.record(entity_id)
            .ok_or_else(|| ClientError::NotFound(entity_id.to_string()))
    }

    async fn get_collection(&self, filter: &MonitorFilter) -> Result<Vec<MonitorRecord>, ClientError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    async fn replace(&self, entity_id: &str, update: MonitorUpdate) -> Result<(), ClientError> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        self.delay(entity_id).await;
        if let Some(message) = self.failing_replaces.get(entity_id) {
            return Err(ClientError::Rejected {
                entity_id: entity_id.to_string(),
                message: message.value().clone(),
            });
        }
        let mut record = self
            .records
            .get_mut(entity_id)
            .ok_or_else(|| ClientError::NotFound(entity_id.to_string()))?;
        record.apply_update(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthbulk_test_utils::{browser_monitor, http_monitor};

    #[tokio::test]
    async fn get_and_replace() {
        let client = InMemoryClient::from_records([browser_monitor("SYNTHETIC_TEST-1")]);
        let record = client.get("SYNTHETIC_TEST-1").await.unwrap();

        let mut update = MonitorUpdate::from(&record);
        update.frequency_min = 60;
        client.replace("SYNTHETIC_TEST-1", update).await.unwrap();

        assert_eq!(client.record("SYNTHETIC_TEST-1").unwrap().frequency_min, 60);
        assert_eq!(client.replace_calls(), 1);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let client = InMemoryClient::new();
        let err = client.get("SYNTHETIC_TEST-9").await.unwrap_err();
        assert_eq!(err, ClientError::NotFound("SYNTHETIC_TEST-9".to_string()));
    }

    #[tokio::test]
    async fn injected_failures() {
        let client = InMemoryClient::from_records([http_monitor("HTTP_CHECK-1")]);
        client.fail_get("HTTP_CHECK-1", ClientError::Unavailable("down".to_string()));
        client.fail_replace("HTTP_CHECK-1", "quota exceeded");

        assert!(client.get("HTTP_CHECK-1").await.unwrap_err().is_transient());
        let update = MonitorUpdate::from(&http_monitor("HTTP_CHECK-1"));
        let err = client.replace("HTTP_CHECK-1", update).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn collection_applies_filter() {
        let client = InMemoryClient::from_records([
            http_monitor("HTTP_CHECK-1"),
            browser_monitor("SYNTHETIC_TEST-1"),
        ]);
        let filter = MonitorFilter::from_filter_values("HTTP", "", "", &[]).unwrap();
        let records = client.get_collection(&filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_id, "HTTP_CHECK-1");
    }
}
