//! Testing utilities for synthbulk workspace
//!
//! Shared monitor fixtures and builders.

#![allow(missing_docs)]

use serde_json::{json, Map};
use synthbulk_model::{
    AnomalyDetection, GlobalOutagePolicy, MonitorRecord, MonitorType, Tag, TagSource,
};

pub const DEFAULT_FREQUENCY_MIN: u32 = 15;

fn monitor(id: &str, monitor_type: MonitorType) -> MonitorRecord {
    MonitorRecord {
        entity_id: id.to_string(),
        name: id.to_lowercase(),
        monitor_type,
        enabled: true,
        frequency_min: DEFAULT_FREQUENCY_MIN,
        locations: vec!["GEOLOCATION-1".to_string()],
        tags: vec![Tag::system("synthetic", None, TagSource::Auto)],
        manually_assigned_apps: vec!["APPLICATION-1".to_string()],
        anomaly_detection: None,
        script: json!({ "version": "1.0", "type": "clickpath" }),
        key_performance_metrics: None,
        extra: Map::new(),
    }
}

/// Browser monitor with one location, one app and one auto tag
pub fn browser_monitor(id: &str) -> MonitorRecord {
    let mut record = monitor(id, MonitorType::Browser);
    record.key_performance_metrics = Some(json!({ "loadActionKpm": "VISUALLY_COMPLETE" }));
    record
}

/// HTTP monitor with one location, one app and one auto tag
pub fn http_monitor(id: &str) -> MonitorRecord {
    let mut record = monitor(id, MonitorType::Http);
    record.script = json!({ "version": "1.0", "requests": [] });
    record
}

/// Set the global outage flag and policy, creating the block if needed
pub fn with_outage(mut record: MonitorRecord, global_outage: bool, consecutive_runs: Option<u32>) -> MonitorRecord {
    let mut detection = record
        .anomaly_detection
        .take()
        .unwrap_or_else(AnomalyDetection::basic);
    detection.outage_handling.global_outage = global_outage;
    detection.outage_handling.global_outage_policy =
        consecutive_runs.map(|consecutive_runs| GlobalOutagePolicy { consecutive_runs });
    record.anomaly_detection = Some(detection);
    record
}

/// Replace user-authored tags, keeping system-derived ones
pub fn with_user_tags(mut record: MonitorRecord, tags: &[(&str, Option<&str>)]) -> MonitorRecord {
    record.tags.retain(|t| !t.is_user_authored());
    record
        .tags
        .extend(tags.iter().map(|(key, value)| Tag::user(*key, *value)));
    record
}

pub fn with_locations(mut record: MonitorRecord, locations: &[&str]) -> MonitorRecord {
    record.locations = locations.iter().map(|l| (*l).to_string()).collect();
    record
}

pub fn with_apps(mut record: MonitorRecord, apps: &[&str]) -> MonitorRecord {
    record.manually_assigned_apps = apps.iter().map(|a| (*a).to_string()).collect();
    record
}

pub fn with_frequency(mut record: MonitorRecord, frequency_min: u32) -> MonitorRecord {
    record.frequency_min = frequency_min;
    record
}

/// `count` browser monitors named `SYNTHETIC_TEST-1..=count`
pub fn browser_fleet(count: usize) -> Vec<MonitorRecord> {
    (1..=count)
        .map(|i| browser_monitor(&format!("SYNTHETIC_TEST-{i}")))
        .collect()
}
