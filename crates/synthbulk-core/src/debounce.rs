//! Debounced validation
//!
//! Operator keystrokes arrive as full-text edits; only the last edit of a
//! burst is validated, once the quiet window has elapsed.

use std::time::Duration;

use synthbulk_model::{BulkDelta, FieldGroup};
use synthbulk_reconcile::{validate, ValidationError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::BulkSettings;

/// Validation outcome for the last edit of a burst
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebouncedResult {
    /// Group the text was edited under
    pub group: FieldGroup,
    /// Edited text
    pub text: String,
    /// Normalized delta or the rejection
    pub outcome: Result<BulkDelta, ValidationError>,
}

#[derive(Debug)]
struct PendingEdit {
    group: FieldGroup,
    text: String,
}

/// Validates edited text after a quiet window
#[derive(Debug)]
pub struct DebouncedEditor {
    input: mpsc::UnboundedSender<PendingEdit>,
    results: mpsc::UnboundedReceiver<DebouncedResult>,
    worker: JoinHandle<()>,
}

impl DebouncedEditor {
    /// Spawn the worker on the current runtime
    #[must_use]
    pub fn spawn(window: Duration) -> Self {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (results_tx, results) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(window, input_rx, results_tx));
        Self {
            input,
            results,
            worker,
        }
    }

    /// Spawn with the quiet window from `settings`
    #[must_use]
    pub fn from_settings(settings: &BulkSettings) -> Self {
        Self::spawn(settings.debounce_window())
    }

    /// Record an edit; restarts the quiet window
    pub fn edit(&self, group: FieldGroup, text: impl Into<String>) {
        let edit = PendingEdit {
            group,
            text: text.into(),
        };
        if self.input.send(edit).is_err() {
            tracing::warn!("debounce worker stopped; edit dropped");
        }
    }

    /// Next validation outcome; `None` once the editor is closed and drained
    pub async fn next(&mut self) -> Option<DebouncedResult> {
        self.results.recv().await
    }

    /// Stop accepting edits, flush the pending one and collect what remains
    pub async fn close(self) -> Vec<DebouncedResult> {
        let Self {
            input,
            mut results,
            worker,
        } = self;
        drop(input);
        if let Err(e) = worker.await {
            tracing::error!("debounce worker failed: {}", e);
        }
        let mut remaining = Vec::new();
        while let Ok(result) = results.try_recv() {
            remaining.push(result);
        }
        remaining
    }
}

async fn run(
    window: Duration,
    mut input: mpsc::UnboundedReceiver<PendingEdit>,
    results: mpsc::UnboundedSender<DebouncedResult>,
) {
    let mut pending: Option<PendingEdit> = None;
    loop {
        let Some(current) = pending.take() else {
            match input.recv().await {
                Some(edit) => pending = Some(edit),
                None => break,
            }
            continue;
        };

        tokio::select! {
            next = input.recv() => match next {
                Some(edit) => pending = Some(edit),
                None => {
                    emit(&results, current);
                    break;
                }
            },
            () = tokio::time::sleep(window) => {
                if !emit(&results, current) {
                    break;
                }
            }
        }
    }
}

fn emit(results: &mpsc::UnboundedSender<DebouncedResult>, edit: PendingEdit) -> bool {
    let outcome = validate(&edit.text, edit.group);
    tracing::debug!(group = %edit.group, valid = outcome.is_ok(), "validated debounced edit");
    results
        .send(DebouncedResult {
            group: edit.group,
            text: edit.text,
            outcome,
        })
        .is_ok()
}
