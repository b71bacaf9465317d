//! Subcommand implementations
//!
//! Each command returns its printable output; the binary decides where it
//! goes and which exit code follows.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use synthbulk_core::{
    BatchOrchestrator, BatchOutcome, BulkSettings, DebouncedEditor, EditSession, InMemoryClient,
};
use synthbulk_model::{FieldGroup, MonitorRecord};

use crate::store;

/// Where an edit's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSource {
    Inline(String),
    File(PathBuf),
}

/// One `--edit GROUP=TEXT|PATH` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditArg {
    pub group: FieldGroup,
    pub source: EditSource,
}

impl EditArg {
    /// Editor text for this edit
    pub fn text(&self) -> anyhow::Result<String> {
        match &self.source {
            EditSource::Inline(text) => Ok(text.clone()),
            EditSource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading edit for {} from {}", self.group, path.display())),
        }
    }
}

impl FromStr for EditArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected GROUP=TEXT or GROUP=PATH, got `{s}`"))?;
        let group: FieldGroup = group.trim().parse().map_err(|e| format!("{e}"))?;
        let value = value.trim();
        // Inline JSON objects start with a brace; anything else is a path.
        let source = if value.starts_with('{') {
            EditSource::Inline(value.to_string())
        } else {
            EditSource::File(PathBuf::from(value))
        };
        Ok(Self { group, source })
    }
}

/// Inputs shared by `plan` and `apply`
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub store: PathBuf,
    pub ids: Vec<String>,
    pub edits: Vec<EditArg>,
    pub save_current_only: Option<bool>,
}

async fn fetch_selection(
    orchestrator: &BatchOrchestrator,
    records: &[MonitorRecord],
    ids: &[String],
) -> anyhow::Result<Vec<MonitorRecord>> {
    let selection = store::selection(records, ids);
    if selection.is_empty() {
        bail!("no monitors selected");
    }
    Ok(orchestrator.fetch_all(selection.as_slice()).await?)
}

fn build_session(
    records: &[MonitorRecord],
    request: &BatchRequest,
    settings: &BulkSettings,
) -> anyhow::Result<EditSession> {
    let mut session = EditSession::with_settings(records, settings);
    if let Some(save_current_only) = request.save_current_only {
        session.set_save_current_only(save_current_only);
    }
    for edit in &request.edits {
        session.select(edit.group)?;
        let text = edit.text()?;
        session
            .submit_text(&text)
            .with_context(|| format!("edit for {}", edit.group))?;
    }
    Ok(session)
}

/// Print the common view of the selection
pub async fn project(store_path: &Path, ids: &[String]) -> anyhow::Result<String> {
    let records = store::load(store_path)?;
    let orchestrator = BatchOrchestrator::new(Arc::new(InMemoryClient::from_records(records.clone())));
    let selected = fetch_selection(&orchestrator, &records, ids).await?;
    let session = EditSession::new(&selected);
    Ok(serde_json::to_string_pretty(session.common())?)
}

/// Validate editor text for one group and print the normalized delta
///
/// Goes through the same debounced path as interactive edits; closing the
/// editor flushes the edit without waiting out the window.
pub async fn validate_text(
    group: FieldGroup,
    text: &str,
    settings: &BulkSettings,
) -> anyhow::Result<String> {
    let editor = DebouncedEditor::from_settings(settings);
    editor.edit(group, text);
    let Some(result) = editor.close().await.pop() else {
        bail!("edit for {group} was not validated");
    };
    let delta = result.outcome?;
    Ok(serde_json::to_string_pretty(&delta)?)
}

/// Print the update record each selected monitor would receive
pub async fn plan(request: &BatchRequest, settings: &BulkSettings) -> anyhow::Result<String> {
    let records = store::load(&request.store)?;
    let orchestrator = BatchOrchestrator::new(Arc::new(InMemoryClient::from_records(records.clone())));
    let selected = fetch_selection(&orchestrator, &records, &request.ids).await?;
    let session = build_session(&selected, request, settings)?;

    let mut updates = serde_json::Map::new();
    for (entity_id, update) in session.updates(&selected) {
        updates.insert(entity_id, serde_json::to_value(update)?);
    }
    Ok(serde_json::to_string_pretty(&updates)?)
}

/// Submit the edits and write the store back
///
/// The store is rewritten even on partial failure; failed monitors keep
/// their previous configuration.
pub async fn apply(request: &BatchRequest, settings: &BulkSettings) -> anyhow::Result<BatchOutcome> {
    let records = store::load(&request.store)?;
    let client = Arc::new(InMemoryClient::from_records(records.clone()));
    let orchestrator = BatchOrchestrator::new(client.clone());

    let selected = fetch_selection(&orchestrator, &records, &request.ids).await?;
    let session = build_session(&selected, request, settings)?;
    if !session.is_dirty() {
        tracing::warn!(batch_id = %session.batch_id(), "no edits given; submitting unchanged configurations");
    }

    let mut progress = orchestrator.progress();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            tracing::debug!(completed = current.completed, total = current.total, "batch progress");
        }
    });

    let outcome = orchestrator.apply(&session, &selected).await;
    drop(orchestrator);
    if let Err(e) = watcher.await {
        tracing::warn!("progress watcher failed: {}", e);
    }

    let written: Vec<MonitorRecord> = records
        .into_iter()
        .map(|r| client.record(&r.entity_id).unwrap_or(r))
        .collect();
    store::save(&request.store, &written)?;
    Ok(outcome)
}

/// Status line followed by one line per failed monitor
#[must_use]
pub fn render_outcome(outcome: &BatchOutcome) -> String {
    let mut out = outcome.status().label().to_string();
    for (entity_id, reason) in &outcome.failed {
        let _ = write!(out, "\n  {entity_id}: {reason}");
    }
    out
}
