//! Shared-or-divergent values
//!
//! Provides [`Projected`] for scalar fields and [`MarkedList`] for
//! list-shaped fields of the common view. The divergence marker is a variant
//! or flag here; it only becomes the `"*"` string on the JSON edit surface.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Rendering of the divergence marker on the edit surface
pub const DIVERGENCE_MARKER: &str = "*";

/// Rendering of the empty sentinel on the edit surface
pub const EMPTY_SENTINEL: &str = "";

/// Scalar value of the common view
///
/// # Invariants
/// - `Empty` is distinct from every legal value, including `false` and `0`
/// - `Divergent` is distinct from every legal value and from `Empty`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projected<T> {
    /// Every selected record holds this value
    Value(T),

    /// No selected record holds a value (or the selection is empty)
    Empty,

    /// Selected records disagree
    Divergent,
}

impl<T> Projected<T> {
    /// Concrete value, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Empty | Self::Divergent => None,
        }
    }

    /// Check for the divergence marker
    #[inline]
    #[must_use]
    pub fn is_divergent(&self) -> bool {
        matches!(self, Self::Divergent)
    }

    /// Check for the empty sentinel
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Map the concrete value
    #[inline]
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Projected<U> {
        match self {
            Self::Value(v) => Projected::Value(f(v)),
            Self::Empty => Projected::Empty,
            Self::Divergent => Projected::Divergent,
        }
    }
}

impl<T> Default for Projected<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> From<Option<T>> for Projected<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Self::Value)
    }
}

impl<T: Serialize> Serialize for Projected<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Empty => serializer.serialize_str(EMPTY_SENTINEL),
            Self::Divergent => serializer.serialize_str(DIVERGENCE_MARKER),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Projected<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;
        match raw.as_str() {
            Some(DIVERGENCE_MARKER) => Ok(Self::Divergent),
            Some(EMPTY_SENTINEL) => Ok(Self::Empty),
            _ => serde_json::from_value(raw)
                .map(Self::Value)
                .map_err(de::Error::custom),
        }
    }
}

/// List value of the common view
///
/// Holds the items present in every selected record. `divergent` is set when
/// at least one record carries an item outside `items`; on the edit surface
/// it means "keep per-record items I did not mention".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedList<T> {
    items: Vec<T>,
    divergent: bool,
}

impl<T> MarkedList<T> {
    /// Create list with explicit marker flag
    #[inline]
    #[must_use]
    pub fn new(items: Vec<T>, divergent: bool) -> Self {
        Self { items, divergent }
    }

    /// List that fully specifies the field
    #[inline]
    #[must_use]
    pub fn exact(items: Vec<T>) -> Self {
        Self::new(items, false)
    }

    /// List that carries the divergence marker
    #[inline]
    #[must_use]
    pub fn divergent(items: Vec<T>) -> Self {
        Self::new(items, true)
    }

    /// Explicit items (marker excluded)
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether the marker is present
    #[inline]
    #[must_use]
    pub fn is_divergent(&self) -> bool {
        self.divergent
    }

    /// Number of explicit items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No items and no marker
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && !self.divergent
    }

    /// Iterate explicit items
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Split into items and marker flag
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, bool) {
        (self.items, self.divergent)
    }

    /// Map every explicit item
    #[must_use]
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> MarkedList<U> {
        MarkedList {
            items: self.items.iter().map(f).collect(),
            divergent: self.divergent,
        }
    }
}

impl<T: PartialEq> MarkedList<T> {
    /// Check whether an explicit item is present
    #[inline]
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T> Default for MarkedList<T> {
    fn default() -> Self {
        Self::exact(Vec::new())
    }
}

impl<'a, T> IntoIterator for &'a MarkedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for MarkedList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.items.len() + usize::from(self.divergent);
        let mut seq = serializer.serialize_seq(Some(len))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        if self.divergent {
            seq.serialize_element(DIVERGENCE_MARKER)?;
        }
        seq.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for MarkedList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A literal "*" element is always the marker, even for string lists.
        let raw = Vec::<JsonValue>::deserialize(deserializer)?;
        let mut items = Vec::with_capacity(raw.len());
        let mut divergent = false;
        for value in raw {
            if value.as_str() == Some(DIVERGENCE_MARKER) {
                divergent = true;
            } else {
                items.push(serde_json::from_value(value).map_err(de::Error::custom)?);
            }
        }
        Ok(Self { items, divergent })
    }
}
