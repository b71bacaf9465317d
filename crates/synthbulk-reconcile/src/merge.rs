//! Merge engine
//!
//! Merges the session's delta back into one monitor record, producing the
//! [`MonitorUpdate`] to submit for it.
//!
//! # Invariants
//! - Every update starts as a copy of the existing record
//! - A field whose delta is absent keeps the record's value
//! - System-derived tags are always carried over unchanged

use std::hash::Hash;

use indexmap::IndexSet;
use synthbulk_model::{
    AnomalyDetection, BatchMode, BulkDelta, CommonConfig, EditableGroups, FieldGroup,
    GlobalOutagePolicy, MarkedList, MonitorRecord, MonitorUpdate, OutageParam, Projected, Tag,
    TagParam,
};

/// Which delta fields a merge applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeScope {
    /// Every tracked field whose group is editable for the batch
    All(EditableGroups),
    /// Only the currently selected group; `None` applies nothing
    Selected(Option<FieldGroup>),
}

impl MergeScope {
    /// Full-apply scope for a batch mode
    #[inline]
    #[must_use]
    pub fn for_mode(mode: BatchMode) -> Self {
        Self::All(mode.editable_groups())
    }

    /// Build the update for one record
    #[must_use]
    pub fn update(
        &self,
        existing: &MonitorRecord,
        common: &CommonConfig,
        delta: &BulkDelta,
    ) -> MonitorUpdate {
        match *self {
            Self::All(groups) => update_all(existing, common, delta, groups),
            Self::Selected(group) => update_selected(existing, common, delta, group),
        }
    }
}

/// Full-apply merge over the editable groups
///
/// Groups outside `editable` are never touched, whatever the delta holds.
#[must_use]
pub fn update_all(
    existing: &MonitorRecord,
    common: &CommonConfig,
    delta: &BulkDelta,
    editable: EditableGroups,
) -> MonitorUpdate {
    let mut update = MonitorUpdate::from(existing);
    for group in editable.iter() {
        apply_group(&mut update, existing, common, delta, group);
    }
    update
}

/// Full-apply merge with editable groups derived from the batch mode
#[inline]
#[must_use]
pub fn update_for_mode(
    existing: &MonitorRecord,
    common: &CommonConfig,
    delta: &BulkDelta,
    mode: BatchMode,
) -> MonitorUpdate {
    update_all(existing, common, delta, mode.editable_groups())
}

/// Single-field merge
///
/// Applies only `selected`; `None` or `other` yields an unmodified copy.
#[must_use]
pub fn update_selected(
    existing: &MonitorRecord,
    common: &CommonConfig,
    delta: &BulkDelta,
    selected: Option<FieldGroup>,
) -> MonitorUpdate {
    let mut update = MonitorUpdate::from(existing);
    if let Some(group) = selected {
        apply_group(&mut update, existing, common, delta, group);
    }
    update
}

fn apply_group(
    update: &mut MonitorUpdate,
    existing: &MonitorRecord,
    common: &CommonConfig,
    delta: &BulkDelta,
    group: FieldGroup,
) {
    if !delta.touches(group) {
        return;
    }
    tracing::debug!(entity_id = %existing.entity_id, %group, "applying tracked edit");

    match group {
        FieldGroup::Frequency => {
            update.frequency_min = reconcile_frequency(existing.frequency_min, delta.frequency_min);
        }
        FieldGroup::Locations => {
            update.locations =
                reconcile_list(&existing.locations, &common.locations, delta.locations.as_ref());
        }
        FieldGroup::Applications => {
            update.manually_assigned_apps = reconcile_list(
                &existing.manually_assigned_apps,
                &common.manually_assigned_apps,
                delta.manually_assigned_apps.as_ref(),
            );
        }
        FieldGroup::OutageHandling => {
            update.anomaly_detection = reconcile_outage(
                existing.anomaly_detection.as_ref(),
                delta.outage_handling.as_ref(),
            );
        }
        FieldGroup::Tags => {
            update.tags = reconcile_tags(&existing.tags, &common.tags, delta.tags.as_ref());
        }
        FieldGroup::Other => {}
    }
}

/// Reconcile one list field
///
/// - `edited` absent: `existing` unchanged
/// - `edited` without the marker: `edited` verbatim
/// - `edited` with the marker: `existing` plus the edited items, minus every
///   item of `initial` the operator removed from the common view. Items that
///   only some records carry, and that the operator never mentioned, stay.
#[must_use]
pub fn reconcile_list<T>(existing: &[T], initial: &MarkedList<T>, edited: Option<&MarkedList<T>>) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let Some(edited) = edited else {
        return existing.to_vec();
    };
    if !edited.is_divergent() {
        return edited.items().to_vec();
    }

    let kept: IndexSet<&T> = edited.iter().collect();
    let mut merged: IndexSet<T> = existing.iter().chain(edited.iter()).cloned().collect();
    for removed in initial.iter().filter(|item| !kept.contains(item)) {
        merged.shift_remove(removed);
    }
    merged.into_iter().collect()
}

/// Reconcile tags
///
/// User-authored tags follow [`reconcile_list`] on their canonical key/value
/// form and are written back as user-authored, contextless tags.
/// System-derived tags come first, unchanged.
#[must_use]
pub fn reconcile_tags(
    existing: &[Tag],
    initial: &MarkedList<TagParam>,
    edited: Option<&MarkedList<TagParam>>,
) -> Vec<Tag> {
    let Some(edited) = edited else {
        return existing.to_vec();
    };

    let (user, system): (Vec<&Tag>, Vec<&Tag>) =
        existing.iter().partition(|tag| tag.is_user_authored());
    let user: Vec<TagParam> = user.into_iter().map(|t| t.param().canonical()).collect();
    let initial = initial.map(|t| t.clone().canonical());
    let edited = edited.map(|t| t.clone().canonical());

    let merged = reconcile_list(&user, &initial, Some(&edited));
    system
        .into_iter()
        .cloned()
        .chain(merged.into_iter().map(Tag::from))
        .collect()
}

/// Reconcile frequency: only a concrete value overrides
#[inline]
#[must_use]
pub fn reconcile_frequency(existing: u32, edited: Option<Projected<u32>>) -> u32 {
    match edited {
        Some(Projected::Value(minutes)) => minutes,
        _ => existing,
    }
}

/// Reconcile the outage handling block
///
/// A concrete flag overrides the global outage flag; a concrete run count
/// replaces the global outage policy. Marker and empty sentinel are no-ops.
/// A record without anomaly detection gets [`AnomalyDetection::basic`] only
/// when something concrete is applied.
#[must_use]
pub fn reconcile_outage(
    existing: Option<&AnomalyDetection>,
    edited: Option<&OutageParam>,
) -> Option<AnomalyDetection> {
    let Some(edited) = edited else {
        return existing.cloned();
    };
    let flag = edited.global_outage.value().copied();
    let runs = edited.consecutive_runs().value().copied();
    if flag.is_none() && runs.is_none() {
        return existing.cloned();
    }

    let mut detection = existing.cloned().unwrap_or_else(AnomalyDetection::basic);
    if let Some(flag) = flag {
        detection.outage_handling.global_outage = flag;
    }
    if let Some(consecutive_runs) = runs {
        detection.outage_handling.global_outage_policy = Some(GlobalOutagePolicy { consecutive_runs });
    }
    Some(detection)
}
