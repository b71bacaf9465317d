//! Settings
//!
//! [`BulkSettings`] with builder methods, loadable from TOML. Every key is
//! optional; missing keys take the default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use synthbulk_model::DEFAULT_HTTP_ID_PREFIX;

use crate::error::BulkError;

/// Orchestration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkSettings {
    /// Quiet window before edited text is validated, in milliseconds
    pub debounce_ms: u64,
    /// Apply only the selected field group on submit
    pub save_current_only: bool,
    /// Entity id prefix of HTTP monitors
    pub http_id_prefix: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl BulkSettings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With debounce window
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// With save-current-only default
    #[inline]
    #[must_use]
    pub fn with_save_current_only(mut self, save_current_only: bool) -> Self {
        self.save_current_only = save_current_only;
        self
    }

    /// With HTTP id prefix
    #[inline]
    #[must_use]
    pub fn with_http_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.http_id_prefix = prefix.into();
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// With JSON log output
    #[inline]
    #[must_use]
    pub fn with_json_logs(mut self, json_logs: bool) -> Self {
        self.json_logs = json_logs;
        self
    }

    /// Debounce window as a duration
    #[inline]
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    /// `BulkError::Config` if the text is not valid TOML for these settings
    pub fn from_toml_str(text: &str) -> Result<Self, BulkError> {
        toml::from_str(text).map_err(|e| BulkError::Config(e.to_string()))
    }

    /// Load settings from a TOML file
    ///
    /// # Errors
    /// `BulkError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BulkError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BulkError::Config(format!("{}: {e}", path.display())))?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            save_current_only: false,
            http_id_prefix: DEFAULT_HTTP_ID_PREFIX.to_string(),
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults() {
        let settings = BulkSettings::new();
        assert_eq!(settings.debounce_window(), Duration::from_millis(500));
        assert_eq!(settings.http_id_prefix, "HTTP_CHECK");
        assert!(!settings.save_current_only);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = BulkSettings::from_toml_str("save_current_only = true\ndebounce_ms = 50\n").unwrap();
        assert_eq!(
            settings,
            BulkSettings::new().with_save_current_only(true).with_debounce_ms(50)
        );
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = BulkSettings::from_toml_str("debounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, BulkError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_filter = \"synthbulk=debug\"").unwrap();
        let settings = BulkSettings::load(file.path()).unwrap();
        assert_eq!(settings.log_filter, "synthbulk=debug");
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(BulkSettings::load("/nonexistent/synthbulk.toml").is_err());
    }
}
