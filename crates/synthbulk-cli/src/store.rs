//! JSON record store
//!
//! A store file is a JSON array of monitor records.

use std::path::Path;

use anyhow::Context;
use synthbulk_model::MonitorRecord;

/// Read every record from a store file
pub fn load(path: &Path) -> anyhow::Result<Vec<MonitorRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading store {}", path.display()))?;
    let records: Vec<MonitorRecord> = serde_json::from_str(&text)
        .with_context(|| format!("parsing store {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded store");
    Ok(records)
}

/// Overwrite a store file with `records`
pub fn save(path: &Path, records: &[MonitorRecord]) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(records)?;
    std::fs::write(path, text).with_context(|| format!("writing store {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "saved store");
    Ok(())
}

/// Ids to operate on: the explicit selection, or every record in the store
#[must_use]
pub fn selection(records: &[MonitorRecord], ids: &[String]) -> Vec<String> {
    if ids.is_empty() {
        records.iter().map(|r| r.entity_id.clone()).collect()
    } else {
        ids.to_vec()
    }
}
