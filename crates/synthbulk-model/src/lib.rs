//! synthbulk Model
//!
//! Typed records and bulk-edit views for synthetic monitor configurations.
//!
//! # Core Concepts
//!
//! - [`MonitorRecord`]: Full configuration of one monitor as fetched
//! - [`MonitorUpdate`]: Replacement body submitted for one monitor
//! - [`Projected<T>`]: Scalar that is shared, unset or divergent across a selection
//! - [`MarkedList<T>`]: Common list items plus an optional divergence marker
//! - [`CommonConfig`]: The common view over every selected record
//! - [`BulkDelta`]: Operator edits, absent-means-untouched
//! - [`FieldGroup`]: Unit of independent editing and merging
//!
//! # Example
//!
//! ```rust,ignore
//! use synthbulk_model::{BulkDelta, MarkedList};
//!
//! let delta = BulkDelta::default().with_locations(MarkedList::divergent(vec!["GEOLOCATION-1".into()]));
//! assert!(delta.locations.unwrap().is_divergent());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bulk;
mod error;
mod projected;
mod record;

pub use bulk::{
    BatchMode, BulkDelta, CommonConfig, EditableGroups, FieldGroup, OutageParam,
    OutagePolicyParam, TagParam, DEFAULT_HTTP_ID_PREFIX,
};
pub use error::ModelError;
pub use projected::{MarkedList, Projected, DIVERGENCE_MARKER, EMPTY_SENTINEL};
pub use record::{
    AnomalyDetection, GlobalOutagePolicy, LoadingTimeThresholds, LocalOutagePolicy,
    MonitorRecord, MonitorSummary, MonitorType, MonitorUpdate, OutageHandling, Tag, TagSource,
    CONTEXTLESS,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
