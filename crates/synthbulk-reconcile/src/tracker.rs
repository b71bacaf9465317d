//! Change tracker
//!
//! Pure reducer folding validated edits into the session's [`BulkDelta`].

use synthbulk_model::{BulkDelta, FieldGroup};

/// A validated edit for one field group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    /// Group the edit was made for
    pub group: FieldGroup,
    /// Normalized value, as returned by [`validate`](crate::validate)
    pub value: BulkDelta,
}

impl FieldEdit {
    /// Create edit
    #[inline]
    #[must_use]
    pub fn new(group: FieldGroup, value: BulkDelta) -> Self {
        Self { group, value }
    }
}

/// Fold one edit into the delta
///
/// The edit replaces the group's slice wholesale; other groups are kept.
/// `other` leaves the state unchanged.
#[must_use]
pub fn track(state: BulkDelta, edit: FieldEdit) -> BulkDelta {
    let FieldEdit { group, value } = edit;
    match group {
        FieldGroup::Frequency => BulkDelta {
            frequency_min: value.frequency_min,
            ..state
        },
        FieldGroup::Locations => BulkDelta {
            locations: value.locations,
            ..state
        },
        FieldGroup::Applications => BulkDelta {
            manually_assigned_apps: value.manually_assigned_apps,
            ..state
        },
        FieldGroup::OutageHandling => BulkDelta {
            outage_handling: value.outage_handling,
            ..state
        },
        FieldGroup::Tags => BulkDelta {
            tags: value.tags,
            ..state
        },
        FieldGroup::Other => state,
    }
}

/// Fold a sequence of edits, in order
#[must_use]
pub fn track_all<I: IntoIterator<Item = FieldEdit>>(state: BulkDelta, edits: I) -> BulkDelta {
    edits.into_iter().fold(state, track)
}
