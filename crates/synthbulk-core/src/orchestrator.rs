//! Batch orchestrator
//!
//! Fetches a selection, submits one replace per record and aggregates the
//! per-record outcomes:
//! - Fetches and replaces run concurrently, one future per record
//! - A failed replace never stops its siblings
//! - Progress is observable through a watch channel

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use synthbulk_model::{MonitorRecord, MonitorSummary, MonitorUpdate};
use tokio::sync::watch;

use crate::client::{MonitorClient, MonitorFilter};
use crate::error::{BulkError, ClientError};
use crate::sequencer::RequestSequencer;
use crate::session::{BatchId, EditSession};

/// Replace progress for the running batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchProgress {
    /// Replaces finished, failed ones included
    pub completed: usize,
    /// Replaces issued
    pub total: usize,
}

/// Operator-facing batch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Updating,
    Failed,
    Succeeded,
}

impl BatchStatus {
    /// Notice text
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Updating => "Updating...",
            Self::Failed => "Error! At least one configuration was not updated.",
            Self::Succeeded => "Success! Updated configurations.",
        }
    }

    /// Notice severity
    #[inline]
    #[must_use]
    pub fn variant(self) -> &'static str {
        match self {
            Self::Updating => "info",
            Self::Failed => "critical",
            Self::Succeeded => "success",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Updating)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregated result of one submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub batch_id: BatchId,
    pub total: usize,
    /// Entity ids replaced successfully, in selection order
    pub succeeded: Vec<String>,
    /// Entity ids whose replace failed, with the reason, in selection order
    pub failed: Vec<(String, String)>,
    /// First failure in completion order
    pub first_error: Option<String>,
}

impl BatchOutcome {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> BatchStatus {
        if self.is_success() {
            BatchStatus::Succeeded
        } else {
            BatchStatus::Failed
        }
    }
}

/// Drives fetch and replace over a [`MonitorClient`]
pub struct BatchOrchestrator {
    client: Arc<dyn MonitorClient>,
    sequencer: RequestSequencer,
    progress: watch::Sender<BatchProgress>,
}

impl BatchOrchestrator {
    /// Create orchestrator over a client
    #[must_use]
    pub fn new(client: Arc<dyn MonitorClient>) -> Self {
        let (progress, _) = watch::channel(BatchProgress::default());
        Self {
            client,
            sequencer: RequestSequencer::new(),
            progress,
        }
    }

    /// Observe replace progress
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.subscribe()
    }

    /// List monitors matching `filter`, sorted by name
    ///
    /// # Errors
    /// `BulkError::Client` if the listing fails
    pub async fn collection(&self, filter: &MonitorFilter) -> Result<Vec<MonitorSummary>, BulkError> {
        let records = self.client.get_collection(filter).await?;
        let mut summaries: Vec<MonitorSummary> = records.iter().map(MonitorSummary::from).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// Fetch every selected record concurrently
    ///
    /// All fetches run to completion; the batch fails if any one failed.
    ///
    /// # Errors
    /// `BulkError::Fetch` carrying the failure count and the first failure in
    /// selection order
    pub async fn fetch_all<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<MonitorRecord>, BulkError> {
        let fetches = ids.iter().map(|id| self.client.get(id.as_ref()));
        let results = join_all(fetches).await;

        let mut records = Vec::with_capacity(results.len());
        let mut errors: Vec<ClientError> = Vec::new();
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => errors.push(e),
            }
        }

        let failed = errors.len();
        match errors.into_iter().next() {
            None => {
                tracing::debug!(records = records.len(), "fetched selection");
                Ok(records)
            }
            Some(source) => {
                tracing::error!(failed, "fetch failed: {}", source);
                Err(BulkError::Fetch { failed, source })
            }
        }
    }

    /// Fetch a selection unless a newer fetch starts before this one ends
    ///
    /// `Ok(None)` means the result was superseded and discarded.
    ///
    /// # Errors
    /// Same as [`fetch_all`](Self::fetch_all), for the current fetch only
    pub async fn fetch_latest<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Option<Vec<MonitorRecord>>, BulkError> {
        let token = self.sequencer.issue();
        let result = self.fetch_all(ids).await;
        match self.sequencer.accept(token, result) {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }

    /// Submit one replace per update concurrently
    ///
    /// Never fails as a whole; per-record failures are collected in the
    /// outcome.
    pub async fn submit(&self, batch_id: BatchId, updates: Vec<(String, MonitorUpdate)>) -> BatchOutcome {
        let total = updates.len();
        tracing::info!(%batch_id, total, "submitting batch");
        self.progress.send_replace(BatchProgress { completed: 0, total });

        let completed = AtomicUsize::new(0);
        let first_error: Mutex<Option<String>> = Mutex::new(None);

        let replaces = updates.into_iter().map(|(entity_id, update)| {
            let completed = &completed;
            let first_error = &first_error;
            async move {
                let result = self.client.replace(&entity_id, update).await;
                if let Err(e) = &result {
                    tracing::warn!(%batch_id, %entity_id, "replace failed: {}", e);
                    first_error.lock().get_or_insert_with(|| e.to_string());
                }
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                self.progress.send_replace(BatchProgress { completed: done, total });
                (entity_id, result)
            }
        });
        let results = join_all(replaces).await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (entity_id, result) in results {
            match result {
                Ok(()) => succeeded.push(entity_id),
                Err(e) => failed.push((entity_id, e.to_string())),
            }
        }

        let outcome = BatchOutcome {
            batch_id,
            total,
            succeeded,
            failed,
            first_error: first_error.into_inner(),
        };
        match outcome.status() {
            BatchStatus::Succeeded => tracing::info!(%batch_id, total, "batch updated"),
            status => tracing::error!(%batch_id, failed = outcome.failed.len(), "{}", status),
        }
        outcome
    }

    /// Merge the session into every record and submit the result
    pub async fn apply(&self, session: &EditSession, records: &[MonitorRecord]) -> BatchOutcome {
        self.submit(session.batch_id(), session.updates(records)).await
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("sequencer", &self.sequencer)
            .field("progress", &*self.progress.borrow())
            .finish_non_exhaustive()
    }
}
