//! Monitor records
//!
//! Wire shapes for fetched monitor configurations and their replacement
//! bodies. Unknown fields are carried in `extra` so a replace never drops
//! data this crate does not model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::bulk::TagParam;

/// Tag context assigned to tags written by bulk updates
pub const CONTEXTLESS: &str = "CONTEXTLESS";

/// Monitor variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorType {
    /// HTTP check
    Http,
    /// Browser (clickpath) monitor
    Browser,
}

impl std::fmt::Display for MonitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::Browser => write!(f, "BROWSER"),
        }
    }
}

impl std::str::FromStr for MonitorType {
    type Err = crate::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(Self::Http),
            "BROWSER" => Ok(Self::Browser),
            _ => Err(crate::ModelError::UnknownMonitorType(s.to_string())),
        }
    }
}

/// Tag provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagSource {
    /// Written by an operator
    User,
    /// Attached by an auto-tagging rule
    RuleBased,
    /// Attached automatically by the platform
    Auto,
}

/// Tag attached to a monitor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub source: TagSource,
    #[serde(default = "default_context")]
    pub context: String,
}

fn default_context() -> String {
    CONTEXTLESS.to_string()
}

impl Tag {
    /// Create a user-authored contextless tag
    #[inline]
    #[must_use]
    pub fn user(key: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
            source: TagSource::User,
            context: default_context(),
        }
    }

    /// Create a system-derived tag
    #[inline]
    #[must_use]
    pub fn system(key: impl Into<String>, value: Option<&str>, source: TagSource) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
            source,
            context: default_context(),
        }
    }

    /// Whether this tag takes part in reconciliation
    #[inline]
    #[must_use]
    pub fn is_user_authored(&self) -> bool {
        self.source == TagSource::User
    }

    /// Canonical key/value form
    #[inline]
    #[must_use]
    pub fn param(&self) -> TagParam {
        TagParam::new(self.key.clone(), self.value.as_deref())
    }
}

impl From<TagParam> for Tag {
    fn from(param: TagParam) -> Self {
        let param = param.canonical();
        Self {
            key: param.key,
            value: param.value,
            source: TagSource::User,
            context: default_context(),
        }
    }
}

/// Global outage policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalOutagePolicy {
    pub consecutive_runs: u32,
}

/// Local outage policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalOutagePolicy {
    pub affected_locations: u32,
    pub consecutive_runs: u32,
}

/// Outage handling block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageHandling {
    pub global_outage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_outage_policy: Option<GlobalOutagePolicy>,
    #[serde(default)]
    pub local_outage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_outage_policy: Option<LocalOutagePolicy>,
}

/// Loading time thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingTimeThresholds {
    pub enabled: bool,
    #[serde(default)]
    pub thresholds: Vec<JsonValue>,
}

impl Default for LoadingTimeThresholds {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: Vec::new(),
        }
    }
}

/// Anomaly detection block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetection {
    pub outage_handling: OutageHandling,
    #[serde(default)]
    pub loading_time_thresholds: LoadingTimeThresholds,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl AnomalyDetection {
    /// Block used when an outage edit targets a monitor without one
    ///
    /// Global and local outage detection off, local policy of one location
    /// for one run, loading time thresholds enabled with none configured.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            outage_handling: OutageHandling {
                global_outage: false,
                global_outage_policy: None,
                local_outage: false,
                local_outage_policy: Some(LocalOutagePolicy {
                    affected_locations: 1,
                    consecutive_runs: 1,
                }),
            },
            loading_time_thresholds: LoadingTimeThresholds::default(),
            extra: Map::new(),
        }
    }

    /// Global outage consecutive runs, if a policy is set
    #[inline]
    #[must_use]
    pub fn consecutive_runs(&self) -> Option<u32> {
        self.outage_handling
            .global_outage_policy
            .map(|p| p.consecutive_runs)
    }
}

/// Full configuration of one monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRecord {
    pub entity_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    #[serde(default)]
    pub enabled: bool,
    pub frequency_min: u32,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub manually_assigned_apps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_detection: Option<AnomalyDetection>,
    #[serde(default)]
    pub script: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_performance_metrics: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl MonitorRecord {
    /// Global outage flag, if an outage block exists
    #[inline]
    #[must_use]
    pub fn global_outage(&self) -> Option<bool> {
        self.anomaly_detection
            .as_ref()
            .map(|a| a.outage_handling.global_outage)
    }

    /// Global outage consecutive runs, if a policy exists
    #[inline]
    #[must_use]
    pub fn consecutive_runs(&self) -> Option<u32> {
        self.anomaly_detection
            .as_ref()
            .and_then(AnomalyDetection::consecutive_runs)
    }

    /// User-authored tags
    pub fn user_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| t.is_user_authored())
    }

    /// Overwrite this record with a replacement body
    ///
    /// Models what the write capability does with a successful replace; the
    /// entity id is kept.
    pub fn apply_update(&mut self, update: MonitorUpdate) {
        self.name = update.name;
        self.monitor_type = update.monitor_type;
        self.enabled = update.enabled;
        self.frequency_min = update.frequency_min;
        self.locations = update.locations;
        self.tags = update.tags;
        self.manually_assigned_apps = update.manually_assigned_apps;
        self.anomaly_detection = update.anomaly_detection;
        self.script = update.script;
        self.key_performance_metrics = update.key_performance_metrics;
        self.extra = update.extra;
    }
}

/// Replacement body for one monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub enabled: bool,
    pub frequency_min: u32,
    pub locations: Vec<String>,
    pub tags: Vec<Tag>,
    pub manually_assigned_apps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_detection: Option<AnomalyDetection>,
    #[serde(default)]
    pub script: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_performance_metrics: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl From<&MonitorRecord> for MonitorUpdate {
    fn from(record: &MonitorRecord) -> Self {
        // Key performance metrics only exist on browser monitors.
        let key_performance_metrics = match record.monitor_type {
            MonitorType::Browser => record.key_performance_metrics.clone(),
            MonitorType::Http => None,
        };
        Self {
            name: record.name.clone(),
            monitor_type: record.monitor_type,
            enabled: record.enabled,
            frequency_min: record.frequency_min,
            locations: record.locations.clone(),
            tags: record.tags.clone(),
            manually_assigned_apps: record.manually_assigned_apps.clone(),
            anomaly_detection: record.anomaly_detection.clone(),
            script: record.script.clone(),
            key_performance_metrics,
            extra: record.extra.clone(),
        }
    }
}

/// Element of a monitor collection listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSummary {
    pub entity_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub enabled: bool,
}

impl From<&MonitorRecord> for MonitorSummary {
    fn from(record: &MonitorRecord) -> Self {
        Self {
            entity_id: record.entity_id.clone(),
            name: record.name.clone(),
            monitor_type: record.monitor_type,
            enabled: record.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http_record() -> MonitorRecord {
        serde_json::from_value(json!({
            "entityId": "HTTP_CHECK-1",
            "name": "api",
            "type": "HTTP",
            "enabled": true,
            "frequencyMin": 5,
            "keyPerformanceMetrics": { "ignored": true }
        }))
        .unwrap()
    }

    #[test]
    fn record_defaults_missing_collections() {
        let record = http_record();
        assert!(record.locations.is_empty());
        assert!(record.tags.is_empty());
        assert!(record.anomaly_detection.is_none());
        assert_eq!(record.global_outage(), None);
        assert_eq!(record.consecutive_runs(), None);
    }

    #[test]
    fn http_update_drops_browser_only_metrics() {
        let update = MonitorUpdate::from(&http_record());
        assert!(update.key_performance_metrics.is_none());
    }

    #[test]
    fn tag_context_defaults_to_contextless() {
        let tag: Tag = serde_json::from_value(json!({ "key": "a", "source": "RULE_BASED" })).unwrap();
        assert_eq!(tag.context, CONTEXTLESS);
        assert!(!tag.is_user_authored());
    }

    #[test]
    fn tag_from_param_is_user_authored() {
        let tag = Tag::from(TagParam::new("k", Some("")));
        assert!(tag.is_user_authored());
        assert_eq!(tag.value, None);
    }

    #[test]
    fn basic_anomaly_detection_shape() {
        let basic = AnomalyDetection::basic();
        assert!(!basic.outage_handling.global_outage);
        assert!(basic.loading_time_thresholds.enabled);
        assert_eq!(basic.consecutive_runs(), None);
    }

    #[test]
    fn apply_update_keeps_entity_id() {
        let mut record = http_record();
        let mut update = MonitorUpdate::from(&record);
        update.frequency_min = 60;
        record.apply_update(update);
        assert_eq!(record.entity_id, "HTTP_CHECK-1");
        assert_eq!(record.frequency_min, 60);
    }

    #[test]
    fn monitor_type_parse() {
        assert_eq!("browser".parse::<MonitorType>().unwrap(), MonitorType::Browser);
        assert!("ftp".parse::<MonitorType>().is_err());
    }
}
