//! Edit session
//!
//! Holds one batch's common view, the operator's accumulated delta and the
//! currently selected field group. The session owns its delta exclusively;
//! it is dropped on submit or cancel.

use serde::{Deserialize, Serialize};
use synthbulk_model::{
    BatchMode, BulkDelta, CommonConfig, EditableGroups, FieldGroup, MonitorRecord, MonitorUpdate,
};
use synthbulk_reconcile::{project, track, validate, FieldEdit, MergeScope};
use ulid::Ulid;

use crate::config::BulkSettings;
use crate::error::BulkError;

/// Batch identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(Ulid);

impl BatchId {
    /// Generate new batch ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batch-{}", self.0)
    }
}

/// One operator's bulk edit over a fetched selection
#[derive(Debug, Clone)]
pub struct EditSession {
    batch_id: BatchId,
    mode: BatchMode,
    editable: EditableGroups,
    common: CommonConfig,
    delta: BulkDelta,
    selected: Option<FieldGroup>,
    save_current_only: bool,
}

impl EditSession {
    /// Start a session over fetched records, mode derived from their types
    #[must_use]
    pub fn new(records: &[MonitorRecord]) -> Self {
        Self::with_mode(records, BatchMode::from_records(records))
    }

    /// Start a session with an explicit batch mode
    #[must_use]
    pub fn with_mode(records: &[MonitorRecord], mode: BatchMode) -> Self {
        let batch_id = BatchId::new();
        tracing::info!(%batch_id, records = records.len(), ?mode, "starting edit session");
        Self {
            batch_id,
            mode,
            editable: mode.editable_groups(),
            common: project(records),
            delta: BulkDelta::default(),
            selected: None,
            save_current_only: false,
        }
    }

    /// Start a session using settings
    ///
    /// The batch is mixed when either the record types or the entity id
    /// prefixes say so.
    #[must_use]
    pub fn with_settings(records: &[MonitorRecord], settings: &BulkSettings) -> Self {
        let ids: Vec<&str> = records.iter().map(|r| r.entity_id.as_str()).collect();
        let by_id = BatchMode::from_ids(&ids, &settings.http_id_prefix);
        let by_type = BatchMode::from_records(records);
        if by_id != by_type {
            tracing::debug!(?by_id, ?by_type, "entity ids and monitor types disagree on batch mode");
        }
        let mode = if by_id == BatchMode::Mixed || by_type == BatchMode::Mixed {
            BatchMode::Mixed
        } else {
            BatchMode::SameType
        };
        let mut session = Self::with_mode(records, mode);
        session.save_current_only = settings.save_current_only;
        session
    }

    #[inline]
    #[must_use]
    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    /// Groups offered for editing
    #[inline]
    #[must_use]
    pub fn editable_groups(&self) -> EditableGroups {
        self.editable
    }

    #[inline]
    #[must_use]
    pub fn common(&self) -> &CommonConfig {
        &self.common
    }

    #[inline]
    #[must_use]
    pub fn delta(&self) -> &BulkDelta {
        &self.delta
    }

    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<FieldGroup> {
        self.selected
    }

    #[inline]
    #[must_use]
    pub fn save_current_only(&self) -> bool {
        self.save_current_only
    }

    pub fn set_save_current_only(&mut self, save_current_only: bool) {
        self.save_current_only = save_current_only;
    }

    /// Select a field group and render its editor content
    ///
    /// Content comes from the delta if the group was edited, else from the
    /// common view. `other` renders `{}`.
    ///
    /// # Errors
    /// - `BulkError::GroupNotEditable` if the batch mode excludes `group`
    /// - `BulkError::Render` if serialization fails
    pub fn select(&mut self, group: FieldGroup) -> Result<String, BulkError> {
        if group != FieldGroup::Other && !self.editable.contains(group) {
            return Err(BulkError::GroupNotEditable {
                group,
                mode: self.mode,
            });
        }
        self.selected = Some(group);

        let content = if self.delta.touches(group) {
            self.delta.slice(group)
        } else {
            self.common.slice(group)
        };
        Ok(serde_json::to_string_pretty(&content)?)
    }

    /// Validate edited text for the selected group and track it
    ///
    /// On failure the delta is left as it was.
    ///
    /// # Errors
    /// - `BulkError::NoGroupSelected` if no group is selected
    /// - `BulkError::Validation` if the text is rejected
    pub fn submit_text(&mut self, text: &str) -> Result<(), BulkError> {
        let group = self.selected.ok_or(BulkError::NoGroupSelected)?;
        let value = validate(text, group)?;
        self.apply_edit(FieldEdit::new(group, value));
        Ok(())
    }

    /// Track an already validated edit
    pub fn apply_edit(&mut self, edit: FieldEdit) {
        tracing::debug!(batch_id = %self.batch_id, group = %edit.group, "tracking edit");
        let delta = std::mem::take(&mut self.delta);
        self.delta = track(delta, edit);
    }

    /// Whether any group has been edited
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.delta.is_empty()
    }

    /// Merge scope implied by the save-current-only switch
    #[must_use]
    pub fn scope(&self) -> MergeScope {
        if self.save_current_only {
            MergeScope::Selected(self.selected)
        } else {
            MergeScope::All(self.editable)
        }
    }

    /// Update record for every fetched record, keyed by entity id
    #[must_use]
    pub fn updates(&self, records: &[MonitorRecord]) -> Vec<(String, MonitorUpdate)> {
        let scope = self.scope();
        records
            .iter()
            .map(|record| {
                (
                    record.entity_id.clone(),
                    scope.update(record, &self.common, &self.delta),
                )
            })
            .collect()
    }
}
