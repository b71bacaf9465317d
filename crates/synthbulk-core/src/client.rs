//! Monitor store capability
//!
//! The async read/write interface the orchestrator drives, and the filter
//! used to list monitors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use synthbulk_model::{ModelError, MonitorRecord, MonitorType, MonitorUpdate};

use crate::error::ClientError;

/// Filter value meaning "any monitor type"
pub const ANY_TYPE: &str = "ALL";

/// Fetch and replace capability for monitor records
///
/// Every call is independently failable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonitorClient: Send + Sync {
    /// Fetch one record
    async fn get(&self, entity_id: &str) -> Result<MonitorRecord, ClientError>;

    /// Fetch every record matching `filter`
    async fn get_collection(&self, filter: &MonitorFilter) -> Result<Vec<MonitorRecord>, ClientError>;

    /// Replace one record
    async fn replace(&self, entity_id: &str, update: MonitorUpdate) -> Result<(), ClientError>;
}

/// Constraints on a collection listing; `None`/empty means unconstrained
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_type: Option<MonitorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_app: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl MonitorFilter {
    /// Build from raw filter values
    ///
    /// Type [`ANY_TYPE`] and empty strings mean no constraint. Tags are
    /// `key` or `key:value`.
    ///
    /// # Errors
    /// `ModelError::UnknownMonitorType` for an unrecognized type
    pub fn from_filter_values(
        monitor_type: &str,
        location: &str,
        assigned_app: &str,
        tags: &[&str],
    ) -> Result<Self, ModelError> {
        let monitor_type = match monitor_type {
            "" | ANY_TYPE => None,
            other => Some(other.parse()?),
        };
        Ok(Self {
            monitor_type,
            location: non_empty(location),
            assigned_app: non_empty(assigned_app),
            tags: tags
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| (*t).to_string())
                .collect(),
        })
    }

    /// Whether `record` satisfies every constraint
    #[must_use]
    pub fn matches(&self, record: &MonitorRecord) -> bool {
        if self.monitor_type.is_some_and(|t| t != record.monitor_type) {
            return false;
        }
        if let Some(location) = &self.location {
            if !record.locations.contains(location) {
                return false;
            }
        }
        if let Some(app) = &self.assigned_app {
            if !record.manually_assigned_apps.contains(app) {
                return false;
            }
        }
        self.tags.iter().all(|wanted| {
            record
                .tags
                .iter()
                .any(|tag| tag.key == *wanted || tag.param().to_string() == *wanted)
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthbulk_model::Tag;
    use synthbulk_test_utils::{browser_monitor, http_monitor, with_user_tags};

    #[test]
    fn all_type_and_empty_values_mean_unconstrained() {
        let filter = MonitorFilter::from_filter_values("ALL", "", "", &[""]).unwrap();
        assert_eq!(filter, MonitorFilter::default());
        assert!(filter.matches(&http_monitor("HTTP_CHECK-1")));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(MonitorFilter::from_filter_values("FTP", "", "", &[]).is_err());
    }

    #[test]
    fn type_and_location_constraints() {
        let filter = MonitorFilter::from_filter_values("BROWSER", "GEOLOCATION-1", "", &[]).unwrap();
        assert!(filter.matches(&browser_monitor("SYNTHETIC_TEST-1")));
        assert!(!filter.matches(&http_monitor("HTTP_CHECK-1")));

        let elsewhere = MonitorFilter::from_filter_values("ALL", "GEOLOCATION-2", "", &[]).unwrap();
        assert!(!elsewhere.matches(&browser_monitor("SYNTHETIC_TEST-1")));
    }

    #[test]
    fn tag_constraint_by_key_or_key_value() {
        let record = with_user_tags(browser_monitor("SYNTHETIC_TEST-1"), &[("env", Some("prod"))]);
        let by_key = MonitorFilter::from_filter_values("ALL", "", "", &["env"]).unwrap();
        let by_pair = MonitorFilter::from_filter_values("ALL", "", "", &["env:prod"]).unwrap();
        let wrong = MonitorFilter::from_filter_values("ALL", "", "", &["env:dev"]).unwrap();
        assert!(by_key.matches(&record));
        assert!(by_pair.matches(&record));
        assert!(!wrong.matches(&record));

        let mut untagged = record;
        untagged.tags = vec![Tag::user("team", None)];
        assert!(!by_key.matches(&untagged));
    }
}
