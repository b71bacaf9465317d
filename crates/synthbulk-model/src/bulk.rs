//! Bulk-edit views
//!
//! Defines the common view shown to the operator ([`CommonConfig`]), the
//! accumulated edits ([`BulkDelta`]) and the field groups that partition both.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::projected::{MarkedList, Projected};
use crate::record::{MonitorRecord, MonitorType};

/// Id prefix of HTTP monitors
pub const DEFAULT_HTTP_ID_PREFIX: &str = "HTTP_CHECK";

/// Tag as shown on the edit surface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagParam {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl TagParam {
    /// Create tag parameter
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
        }
    }

    /// Canonical form: an empty value is the same as no value
    #[inline]
    #[must_use]
    pub fn canonical(self) -> Self {
        Self {
            key: self.key,
            value: self.value.filter(|v| !v.is_empty()),
        }
    }
}

impl std::fmt::Display for TagParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Global outage policy as shown on the edit surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutagePolicyParam {
    pub consecutive_runs: Projected<u32>,
}

/// Outage handling as shown on the edit surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageParam {
    pub global_outage: Projected<bool>,
    pub global_outage_policy: OutagePolicyParam,
}

impl OutageParam {
    /// Create outage parameter
    #[inline]
    #[must_use]
    pub fn new(global_outage: Projected<bool>, consecutive_runs: Projected<u32>) -> Self {
        Self {
            global_outage,
            global_outage_policy: OutagePolicyParam { consecutive_runs },
        }
    }

    /// Consecutive runs threshold
    #[inline]
    #[must_use]
    pub fn consecutive_runs(&self) -> Projected<u32> {
        self.global_outage_policy.consecutive_runs
    }
}

/// Common view over every selected record
///
/// Computed once per fetched selection; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonConfig {
    pub frequency_min: Projected<u32>,
    pub locations: MarkedList<String>,
    pub manually_assigned_apps: MarkedList<String>,
    pub outage_handling: OutageParam,
    pub tags: MarkedList<TagParam>,
}

impl CommonConfig {
    /// The slice of this view owned by `group`, as a delta
    ///
    /// This is what the editor shows when nothing has been tracked yet.
    #[must_use]
    pub fn slice(&self, group: FieldGroup) -> BulkDelta {
        let delta = BulkDelta::default();
        match group {
            FieldGroup::Frequency => delta.with_frequency(self.frequency_min),
            FieldGroup::Locations => delta.with_locations(self.locations.clone()),
            FieldGroup::Applications => delta.with_applications(self.manually_assigned_apps.clone()),
            FieldGroup::OutageHandling => delta.with_outage_handling(self.outage_handling),
            FieldGroup::Tags => delta.with_tags(self.tags.clone()),
            FieldGroup::Other => delta,
        }
    }
}

/// Operator edits for one session
///
/// A field that was never edited is `None`; the merge engine reads that as
/// "leave the record's value alone".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_min: Option<Projected<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<MarkedList<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manually_assigned_apps: Option<MarkedList<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outage_handling: Option<OutageParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<MarkedList<TagParam>>,
}

impl BulkDelta {
    /// With frequency edit
    #[inline]
    #[must_use]
    pub fn with_frequency(mut self, frequency: Projected<u32>) -> Self {
        self.frequency_min = Some(frequency);
        self
    }

    /// With locations edit
    #[inline]
    #[must_use]
    pub fn with_locations(mut self, locations: MarkedList<String>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// With applications edit
    #[inline]
    #[must_use]
    pub fn with_applications(mut self, apps: MarkedList<String>) -> Self {
        self.manually_assigned_apps = Some(apps);
        self
    }

    /// With outage handling edit
    #[inline]
    #[must_use]
    pub fn with_outage_handling(mut self, outage: OutageParam) -> Self {
        self.outage_handling = Some(outage);
        self
    }

    /// With tags edit
    #[inline]
    #[must_use]
    pub fn with_tags(mut self, tags: MarkedList<TagParam>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Whether `group` has a tracked edit
    #[must_use]
    pub fn touches(&self, group: FieldGroup) -> bool {
        match group {
            FieldGroup::Frequency => self.frequency_min.is_some(),
            FieldGroup::Locations => self.locations.is_some(),
            FieldGroup::Applications => self.manually_assigned_apps.is_some(),
            FieldGroup::OutageHandling => self.outage_handling.is_some(),
            FieldGroup::Tags => self.tags.is_some(),
            FieldGroup::Other => false,
        }
    }

    /// No field has been edited
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FieldGroup::EDITABLE.iter().all(|g| !self.touches(*g))
    }

    /// Only the slice owned by `group`
    #[must_use]
    pub fn slice(&self, group: FieldGroup) -> Self {
        let delta = Self::default();
        match group {
            FieldGroup::Frequency => Self {
                frequency_min: self.frequency_min,
                ..delta
            },
            FieldGroup::Locations => Self {
                locations: self.locations.clone(),
                ..delta
            },
            FieldGroup::Applications => Self {
                manually_assigned_apps: self.manually_assigned_apps.clone(),
                ..delta
            },
            FieldGroup::OutageHandling => Self {
                outage_handling: self.outage_handling,
                ..delta
            },
            FieldGroup::Tags => Self {
                tags: self.tags.clone(),
                ..delta
            },
            FieldGroup::Other => delta,
        }
    }
}

/// Unit of independent editing and merging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldGroup {
    #[serde(rename = "frequency")]
    Frequency,
    #[serde(rename = "locations")]
    Locations,
    #[serde(rename = "manuallyAssignedApps")]
    Applications,
    #[serde(rename = "anomalyDetection.outageHandling")]
    OutageHandling,
    #[serde(rename = "tags")]
    Tags,
    /// No-op selection
    #[serde(rename = "other")]
    Other,
}

impl FieldGroup {
    /// Every group that owns a field
    pub const EDITABLE: [FieldGroup; 5] = [
        Self::Frequency,
        Self::Locations,
        Self::Applications,
        Self::OutageHandling,
        Self::Tags,
    ];

    /// Identifier used in selections and logs
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Locations => "locations",
            Self::Applications => "manuallyAssignedApps",
            Self::OutageHandling => "anomalyDetection.outageHandling",
            Self::Tags => "tags",
            Self::Other => "other",
        }
    }

    /// Key wrapping this group's value in edited text
    #[inline]
    #[must_use]
    pub fn json_key(&self) -> Option<&'static str> {
        match self {
            Self::Frequency => Some("frequencyMin"),
            Self::Locations => Some("locations"),
            Self::Applications => Some("manuallyAssignedApps"),
            Self::OutageHandling => Some("outageHandling"),
            Self::Tags => Some("tags"),
            Self::Other => None,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Frequency => 1,
            Self::Locations => 1 << 1,
            Self::Applications => 1 << 2,
            Self::OutageHandling => 1 << 3,
            Self::Tags => 1 << 4,
            Self::Other => 0,
        }
    }
}

impl std::fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldGroup {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frequency" | "frequencyMin" => Ok(Self::Frequency),
            "locations" => Ok(Self::Locations),
            "manuallyAssignedApps" | "applications" | "apps" => Ok(Self::Applications),
            "anomalyDetection.outageHandling" | "outageHandling" | "outage-handling" | "outage" => {
                Ok(Self::OutageHandling)
            }
            "tags" => Ok(Self::Tags),
            "other" => Ok(Self::Other),
            _ => Err(ModelError::UnknownFieldGroup(s.to_string())),
        }
    }
}

/// Set of field groups a batch may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditableGroups {
    bits: u8,
}

impl EditableGroups {
    /// No group editable
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Every group editable
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self::none()
            .with(FieldGroup::Frequency)
            .with(FieldGroup::Locations)
            .with(FieldGroup::Applications)
            .with(FieldGroup::OutageHandling)
            .with(FieldGroup::Tags)
    }

    /// Groups shared by every monitor variant
    #[inline]
    #[must_use]
    pub const fn common() -> Self {
        Self::none()
            .with(FieldGroup::OutageHandling)
            .with(FieldGroup::Locations)
            .with(FieldGroup::Tags)
    }

    /// Add a group
    #[inline]
    #[must_use]
    pub const fn with(self, group: FieldGroup) -> Self {
        Self {
            bits: self.bits | group.bit(),
        }
    }

    /// Remove a group
    #[inline]
    #[must_use]
    pub const fn without(self, group: FieldGroup) -> Self {
        Self {
            bits: self.bits & !group.bit(),
        }
    }

    /// Membership test; `Other` is never a member
    #[inline]
    #[must_use]
    pub const fn contains(self, group: FieldGroup) -> bool {
        let bit = group.bit();
        bit != 0 && self.bits & bit == bit
    }

    /// Iterate members in declaration order
    pub fn iter(self) -> impl Iterator<Item = FieldGroup> {
        FieldGroup::EDITABLE
            .into_iter()
            .filter(move |g| self.contains(*g))
    }
}

impl FromIterator<FieldGroup> for EditableGroups {
    fn from_iter<I: IntoIterator<Item = FieldGroup>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

/// Composition of a selection by monitor variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// Every selected monitor has the same variant
    SameType,
    /// Selection mixes HTTP and browser monitors
    Mixed,
}

impl BatchMode {
    /// Derive mode from entity ids
    ///
    /// Same-type when all or none of the ids carry `http_prefix`.
    #[must_use]
    pub fn from_ids<S: AsRef<str>>(ids: &[S], http_prefix: &str) -> Self {
        let http = ids
            .iter()
            .filter(|id| id.as_ref().starts_with(http_prefix))
            .count();
        if http == 0 || http == ids.len() {
            Self::SameType
        } else {
            Self::Mixed
        }
    }

    /// Derive mode from fetched records
    #[must_use]
    pub fn from_records(records: &[MonitorRecord]) -> Self {
        let http = records
            .iter()
            .filter(|r| r.monitor_type == MonitorType::Http)
            .count();
        if http == 0 || http == records.len() {
            Self::SameType
        } else {
            Self::Mixed
        }
    }

    /// Groups offered for editing in this mode
    #[inline]
    #[must_use]
    pub const fn editable_groups(self) -> EditableGroups {
        match self {
            Self::SameType => EditableGroups::all(),
            Self::Mixed => EditableGroups::common(),
        }
    }
}
