// crates/rct-config/src/ordered.rs
// ============================================================================
// Module: Ordered Config Maps
// Description: Map deserialization that keeps document order.
// Purpose: Preserve configured detector and data pass order for reports.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Detector columns appear in reports in the order they are written in the
//! configuration file. [`OrderedMap`] records entries as the deserializer
//! visits them and rejects duplicate keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error as _;
use serde::de::MapAccess;
use serde::de::Visitor;

// ============================================================================
// SECTION: Ordered Map
// ============================================================================

/// String-keyed map preserving insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    /// Entries in document order.
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    /// Creates a map from entries (later duplicates are kept as given).
    #[must_use]
    pub const fn from_entries(entries: Vec<(String, V)>) -> Self {
        Self {
            entries,
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(name, _)| name == key).map(|(_, value)| value)
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the map has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

/// Visitor collecting map entries in order.
struct OrderedMapVisitor<V> {
    /// Value type marker.
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(name, _)| *name == key) {
                return Err(A::Error::custom(format!("duplicate key: {key}")));
            }
            entries.push((key, value));
        }
        Ok(OrderedMap::from_entries(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: PhantomData,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
