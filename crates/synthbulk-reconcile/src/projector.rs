//! Field projector
//!
//! Collapses a selection of records into the [`CommonConfig`] shown to the
//! operator.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use synthbulk_model::{
    CommonConfig, MarkedList, MonitorRecord, OutageParam, Projected, Tag, TagParam,
};

/// Project records onto their common view
///
/// Scalars resolve to the shared value, the empty sentinel (nothing to
/// compare, or no record has the field) or the divergence marker. Lists keep
/// the items found in every record and carry the marker when any record
/// holds an item outside that set. Only user-authored tags are considered.
///
/// Never fails. Result lists follow first-visit order.
#[must_use]
pub fn project(records: &[MonitorRecord]) -> CommonConfig {
    let total = records.len();

    let mut locations = Occurrences::default();
    let mut apps = Occurrences::default();
    let mut tags = Occurrences::default();

    for record in records {
        locations.record(record.locations.iter().cloned());
        apps.record(record.manually_assigned_apps.iter().cloned());
        tags.record(record.user_tags().map(canonical_tag));
    }

    let common = CommonConfig {
        frequency_min: unanimous(records.iter().map(|r| Some(r.frequency_min))),
        locations: locations.common(total),
        manually_assigned_apps: apps.common(total),
        outage_handling: OutageParam::new(
            unanimous(records.iter().map(MonitorRecord::global_outage)),
            unanimous(records.iter().map(MonitorRecord::consecutive_runs)),
        ),
        tags: tags.common(total),
    };

    tracing::debug!(
        records = total,
        divergent_locations = common.locations.is_divergent(),
        divergent_tags = common.tags.is_divergent(),
        "projected common configuration"
    );

    common
}

fn canonical_tag(tag: &Tag) -> TagParam {
    tag.param().canonical()
}

/// Shared value of a scalar across records
///
/// A missing value compares as the empty sentinel.
fn unanimous<T, I>(values: I) -> Projected<T>
where
    T: PartialEq,
    I: IntoIterator<Item = Option<T>>,
{
    let mut values = values.into_iter();
    let Some(base) = values.next() else {
        return Projected::Empty;
    };
    if values.any(|v| v != base) {
        return Projected::Divergent;
    }
    Projected::from(base)
}

/// Per-item count of records containing the item
#[derive(Debug)]
struct Occurrences<T: Hash + Eq> {
    counts: IndexMap<T, usize>,
}

impl<T: Hash + Eq> Default for Occurrences<T> {
    fn default() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }
}

impl<T: Hash + Eq> Occurrences<T> {
    /// Count one record's items; repeats within a record count once
    fn record<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let unique: IndexSet<T> = items.into_iter().collect();
        for item in unique {
            *self.counts.entry(item).or_insert(0) += 1;
        }
    }

    fn common(self, total: usize) -> MarkedList<T> {
        let mut divergent = false;
        let mut items = Vec::new();
        for (item, count) in self.counts {
            if count == total {
                items.push(item);
            } else {
                divergent = true;
            }
        }
        MarkedList::new(items, divergent)
    }
}
