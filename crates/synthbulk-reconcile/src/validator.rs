//! Edit validator
//!
//! Checks operator-edited JSON for one field group and normalizes it into a
//! [`BulkDelta`] holding only that group's field.

use serde_json::{Map, Number, Value as JsonValue};
use synthbulk_model::{BulkDelta, FieldGroup, MarkedList, OutageParam, Projected, TagParam};

/// Errors from validating edited text
///
/// Parse and shape failures are reported the same way, by message; the
/// variants only let callers tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Text is not well-formed JSON
    #[error("Could not parse JSON: {0}")]
    Parse(String),

    /// Top-level value is not an object
    #[error("Content should be a JSON object with appropriate properties.")]
    NotAnObject,

    /// Group field missing or of the wrong shape
    #[error("{message}")]
    Shape {
        group: FieldGroup,
        message: &'static str,
    },
}

impl ValidationError {
    /// Text could not be read as a JSON object at all
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::NotAnObject)
    }

    /// Text parsed but the group's field is malformed
    #[inline]
    #[must_use]
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }

    fn shape(group: FieldGroup) -> Self {
        let message = match group {
            FieldGroup::Frequency => "Frequency should be a whole number of minutes or \"*\".",
            FieldGroup::OutageHandling => {
                "Global outage should be true, false or \"*\" and consecutive runs parameter \
                 should be a number, \"*\" or \"\"."
            }
            FieldGroup::Locations => "All location ids should be provided as strings.",
            FieldGroup::Applications => "All application ids should be provided as strings.",
            FieldGroup::Tags => {
                "All tags should contain a string key. If a value is provided it should also be a string."
            }
            FieldGroup::Other => "Unexpected content.",
        };
        Self::Shape { group, message }
    }
}

/// Validate edited text for `group`
///
/// The text must be a JSON object holding the group's key. Keys belonging to
/// other groups are ignored and not carried into the result. The `other`
/// group accepts any object and yields an empty delta.
///
/// # Errors
/// - [`ValidationError::Parse`] if the text is not JSON
/// - [`ValidationError::NotAnObject`] if the top-level value is not an object
/// - [`ValidationError::Shape`] if the group's field is missing or malformed
pub fn validate(text: &str, group: FieldGroup) -> Result<BulkDelta, ValidationError> {
    let parsed: JsonValue =
        serde_json::from_str(text).map_err(|e| ValidationError::Parse(e.to_string()))?;
    let JsonValue::Object(content) = parsed else {
        return Err(ValidationError::NotAnObject);
    };

    normalize(&content, group).ok_or_else(|| ValidationError::shape(group))
}

fn normalize(content: &Map<String, JsonValue>, group: FieldGroup) -> Option<BulkDelta> {
    let delta = BulkDelta::default();
    let Some(key) = group.json_key() else {
        return Some(delta);
    };
    let value = content.get(key)?;

    let delta = match group {
        FieldGroup::Frequency => delta.with_frequency(frequency(value)?),
        FieldGroup::Locations => delta.with_locations(string_list(value)?),
        FieldGroup::Applications => delta.with_applications(string_list(value)?),
        FieldGroup::OutageHandling => delta.with_outage_handling(outage(value)?),
        FieldGroup::Tags => delta.with_tags(tag_list(value)?),
        FieldGroup::Other => delta,
    };
    Some(delta)
}

/// Whole number in `u32` range; integral floats such as `5.0` count
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
fn whole_number(number: &Number) -> Option<u32> {
    if let Some(n) = number.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = number.as_f64()?;
    (n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n)).then_some(n as u32)
}

fn count(value: &JsonValue) -> Option<Projected<u32>> {
    match serde_json::from_value::<Projected<Number>>(value.clone()).ok()? {
        Projected::Value(n) => whole_number(&n).map(Projected::Value),
        Projected::Empty => Some(Projected::Empty),
        Projected::Divergent => Some(Projected::Divergent),
    }
}

fn frequency(value: &JsonValue) -> Option<Projected<u32>> {
    count(value).filter(|f| !f.is_empty())
}

fn global_outage(value: &JsonValue) -> Option<Projected<bool>> {
    serde_json::from_value::<Projected<bool>>(value.clone())
        .ok()
        .filter(|flag| !flag.is_empty())
}

fn outage(value: &JsonValue) -> Option<OutageParam> {
    let block = value.as_object()?;
    let flag = global_outage(block.get("globalOutage")?)?;
    let policy = block.get("globalOutagePolicy")?.as_object()?;
    let runs = count(policy.get("consecutiveRuns")?)?;
    Some(OutageParam::new(flag, runs))
}

fn string_list(value: &JsonValue) -> Option<MarkedList<String>> {
    serde_json::from_value(value.clone()).ok()
}

fn tag_param(item: &JsonValue) -> Option<TagParam> {
    let tag = item.as_object()?;
    let key = tag.get("key")?.as_str()?;
    let value = match tag.get("value") {
        None => None,
        Some(JsonValue::String(v)) => Some(v.as_str()),
        Some(_) => return None,
    };
    Some(TagParam::new(key, value))
}

fn tag_list(value: &JsonValue) -> Option<MarkedList<TagParam>> {
    let raw: MarkedList<JsonValue> = serde_json::from_value(value.clone()).ok()?;
    let (items, divergent) = raw.into_parts();
    let items = items.iter().map(tag_param).collect::<Option<Vec<_>>>()?;
    Some(MarkedList::new(items, divergent))
}
