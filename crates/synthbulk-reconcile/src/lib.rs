//! synthbulk Reconciliation
//!
//! Three-way reconciliation between a selection of monitor records, the
//! common view an operator edits, and the edits themselves.
//!
//! # Core Concepts
//!
//! - [`project`]: Collapse records into a [`CommonConfig`](synthbulk_model::CommonConfig)
//! - [`validate`]: Check edited text for one field group
//! - [`track`]: Fold a validated edit into the session's delta
//! - [`MergeScope`]: Merge the delta back into each record
//!
//! # Example
//!
//! ```rust,ignore
//! use synthbulk_reconcile::{project, track, validate, FieldEdit, MergeScope};
//! use synthbulk_model::{BatchMode, BulkDelta, FieldGroup};
//!
//! let common = project(&records);
//! let edit = validate(r#"{"tags":[{"key":"team","value":"web"},"*"]}"#, FieldGroup::Tags)?;
//! let delta = track(BulkDelta::default(), FieldEdit::new(FieldGroup::Tags, edit));
//!
//! let scope = MergeScope::for_mode(BatchMode::SameType);
//! let updates: Vec<_> = records.iter().map(|r| scope.update(r, &common, &delta)).collect();
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod merge;
mod projector;
mod tracker;
mod validator;

pub use merge::{
    reconcile_frequency, reconcile_list, reconcile_outage, reconcile_tags, update_all,
    update_for_mode, update_selected, MergeScope,
};
pub use projector::project;
pub use tracker::{track, track_all, FieldEdit};
pub use validator::{validate, ValidationError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use synthbulk_model::{
        BatchMode, BulkDelta, FieldGroup, MarkedList, MonitorRecord, MonitorType, Projected, Tag,
        TagParam,
    };

    fn record(id: &str, tag: Tag) -> MonitorRecord {
        MonitorRecord {
            entity_id: id.to_string(),
            name: id.to_lowercase(),
            monitor_type: MonitorType::Browser,
            enabled: true,
            frequency_min: 10,
            locations: vec![],
            tags: vec![tag],
            manually_assigned_apps: vec![],
            anomaly_detection: None,
            script: serde_json::Value::Null,
            key_performance_metrics: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn divergent_tags_gain_common_addition() {
        let records = vec![
            record("SYNTHETIC_TEST-1", Tag::user("key1", Some("value1"))),
            record("SYNTHETIC_TEST-2", Tag::user("key2", Some("value2"))),
        ];

        let common = project(&records);
        assert_eq!(common.frequency_min, Projected::Value(10));
        assert_eq!(common.tags, MarkedList::divergent(vec![]));

        let edit = validate(
            r#"{"tags":[{"key":"new","value":"v"},"*"]}"#,
            FieldGroup::Tags,
        )
        .unwrap();
        let delta = track(BulkDelta::default(), FieldEdit::new(FieldGroup::Tags, edit));

        let scope = MergeScope::for_mode(BatchMode::SameType);
        let first = scope.update(&records[0], &common, &delta);
        let second = scope.update(&records[1], &common, &delta);

        let params = |tags: &[Tag]| tags.iter().map(Tag::param).collect::<Vec<_>>();
        assert_eq!(
            params(&first.tags),
            vec![TagParam::new("key1", Some("value1")), TagParam::new("new", Some("v"))]
        );
        assert_eq!(
            params(&second.tags),
            vec![TagParam::new("key2", Some("value2")), TagParam::new("new", Some("v"))]
        );
    }
}
