//! Record types for identity-preserving merges
//!
//! This module defines the data model the merge evaluator operates on:
//! - Slot: per-key value state (present-with-value or present-but-empty)
//! - Record: an immutable string-keyed mapping with three states per key
//! - RecordError: conversion errors for JSON interop
//!
//! A key in a [`Record`] is in exactly one of three states: absent (no entry),
//! present with no value ([`Slot::Empty`]), or present with a value
//! ([`Slot::Value`]). The distinction between "absent" and "present but empty"
//! is load-bearing: merging `{b: <empty>}` into `{a: 1}` produces a new
//! record even though neither side has a value for `b`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The state of a key that is present on a record.
///
/// `Slot` is the value side of every record entry. Together with the absence
/// of an entry it encodes the three per-key states:
///
/// | State                 | Representation          |
/// |-----------------------|-------------------------|
/// | absent                | no entry in the record  |
/// | present, no value     | `Slot::Empty`           |
/// | present with a value  | `Slot::Value(v)`        |
///
/// # Serialization
///
/// `Slot::Value(v)` serializes as `v` itself and `Slot::Empty` as `null`.
/// Consequently, for `V = serde_json::Value` a round-trip canonicalizes
/// `Slot::Value(Value::Null)` to `Slot::Empty`: JSON `null` is the wire
/// representation of the empty slot.
///
/// # Examples
///
/// ```
/// use recmerge::Slot;
///
/// let filled: Slot<i64> = Slot::Value(42);
/// let empty: Slot<i64> = Slot::Empty;
///
/// assert_eq!(filled.value(), Some(&42));
/// assert_eq!(empty.value(), None);
/// assert!(empty.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<V> {
    /// Key is present but carries no value (the absent-marker).
    Empty,
    /// Key is present with a value.
    Value(V),
}

impl<V> Slot<V> {
    /// Get the contained value, if any.
    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::Empty => None,
        }
    }

    /// Check whether this slot is the empty marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Convert into an `Option`, discarding the present/absent distinction.
    pub fn into_value(self) -> Option<V> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::Empty => None,
        }
    }
}

impl<V> From<Option<V>> for Slot<V> {
    fn from(v: Option<V>) -> Self {
        match v {
            Some(v) => Slot::Value(v),
            None => Slot::Empty,
        }
    }
}

impl<V> From<V> for Slot<V> {
    fn from(v: V) -> Self {
        Slot::Value(v)
    }
}

impl<V: Serialize> Serialize for Slot<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Value(v) => v.serialize(serializer),
            Slot::Empty => serializer.serialize_none(),
        }
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Slot<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<V>::deserialize(deserializer).map(Slot::from)
    }
}

/// An immutable, string-keyed record with three states per key.
///
/// `Record` is the base type the merge evaluator works over: an associative,
/// key-unique mapping from `String` to [`Slot<V>`], generic over the value
/// type. Backed by a `BTreeMap` so iteration order is deterministic.
///
/// Records are plain values: building one mutates it in place, but the merge
/// evaluator itself never mutates or retains a record it is given.
///
/// # Examples
///
/// ```
/// use recmerge::{Record, Slot};
///
/// let mut record: Record<i64> = Record::new();
/// record.insert("a", 1);
/// record.insert_empty("b");
///
/// assert_eq!(record.get("a"), Some(&Slot::Value(1)));
/// assert_eq!(record.get("b"), Some(&Slot::Empty));
/// assert_eq!(record.get("c"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record<V> {
    entries: BTreeMap<String, Slot<V>>,
}

impl<V> Record<V> {
    /// Create an empty record.
    pub fn new() -> Self {
        Record {
            entries: BTreeMap::new(),
        }
    }

    /// Look up the slot for a key.
    ///
    /// The three per-key states are fully distinguishable from the return
    /// value: `None` (absent), `Some(&Slot::Empty)` (present, no value),
    /// `Some(&Slot::Value(_))` (present with a value).
    pub fn get(&self, key: &str) -> Option<&Slot<V>> {
        self.entries.get(key)
    }

    /// Look up the value for a key, ignoring the empty-slot state.
    ///
    /// Returns `None` both for absent keys and for keys present with an
    /// empty slot; use [`Record::get`] when the distinction matters.
    pub fn value(&self, key: &str) -> Option<&V> {
        self.entries.get(key).and_then(Slot::value)
    }

    /// Check whether a key is present (with or without a value).
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a key with a value, replacing any existing slot.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<V>) {
        self.entries.insert(key.into(), Slot::Value(value.into()));
    }

    /// Insert a key with no value (the empty slot), replacing any existing slot.
    pub fn insert_empty(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), Slot::Empty);
    }

    /// Insert a key with an explicit slot, replacing any existing slot.
    pub fn insert_slot(&mut self, key: impl Into<String>, slot: Slot<V>) {
        self.entries.insert(key.into(), slot);
    }

    /// Number of present keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the record has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Slot<V>)> {
        self.entries.iter()
    }

    /// Iterate over present keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

impl<V: Serialize> Record<V> {
    /// Serialize to a compact JSON string.
    ///
    /// Empty slots render as `null`.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| String::from("{}"))
    }
}

impl<V> Default for Record<V> {
    fn default() -> Self {
        Record::new()
    }
}

impl<V: Serialize> fmt::Display for Record<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

impl<V> FromIterator<(String, V)> for Record<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Record {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k, Slot::Value(v)))
                .collect(),
        }
    }
}

impl<V> FromIterator<(String, Slot<V>)> for Record<V> {
    fn from_iter<I: IntoIterator<Item = (String, Slot<V>)>>(iter: I) -> Self {
        Record {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<V> IntoIterator for Record<V> {
    type Item = (String, Slot<V>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Slot<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// JSON interop
// =============================================================================

/// Error type for record conversions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The JSON value was not an object
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record<serde_json::Value> {
    /// Convert a JSON object into a record.
    ///
    /// `null` members become empty slots: JSON null is the absent-marker.
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Record {
            entries: map
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::Null => (k, Slot::Empty),
                    v => (k, Slot::Value(v)),
                })
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Record<serde_json::Value> {
    type Error = RecordError;

    /// Convert a JSON value into a record.
    ///
    /// Only objects convert; any other JSON kind fails with
    /// [`RecordError::NotAnObject`].
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Record::from(map)),
            other => Err(RecordError::NotAnObject(json_kind(&other))),
        }
    }
}

impl From<Record<serde_json::Value>> for serde_json::Value {
    /// Convert a record back into a JSON object. Empty slots render as `null`.
    fn from(record: Record<serde_json::Value>) -> Self {
        serde_json::Value::Object(
            record
                .entries
                .into_iter()
                .map(|(k, slot)| match slot {
                    Slot::Value(v) => (k, v),
                    Slot::Empty => (k, serde_json::Value::Null),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slot_value() {
        let slot: Slot<i64> = Slot::Value(42);
        assert_eq!(slot.value(), Some(&42));
        assert!(!slot.is_empty());
    }

    #[test]
    fn test_slot_empty() {
        let slot: Slot<i64> = Slot::Empty;
        assert_eq!(slot.value(), None);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_slot_from_option() {
        assert_eq!(Slot::from(Some(1)), Slot::Value(1));
        assert_eq!(Slot::<i64>::from(None), Slot::Empty);
    }

    #[test]
    fn test_slot_into_value() {
        assert_eq!(Slot::Value(7).into_value(), Some(7));
        assert_eq!(Slot::<i64>::Empty.into_value(), None);
    }

    #[test]
    fn test_record_new_is_empty() {
        let record: Record<i64> = Record::new();
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
    }

    #[test]
    fn test_record_insert_and_get() {
        let mut record: Record<i64> = Record::new();
        record.insert("a", 1);
        assert_eq!(record.get("a"), Some(&Slot::Value(1)));
        assert_eq!(record.value("a"), Some(&1));
        assert!(record.contains_key("a"));
    }

    #[test]
    fn test_record_three_states() {
        let mut record: Record<i64> = Record::new();
        record.insert("present", 1);
        record.insert_empty("empty");

        assert_eq!(record.get("present"), Some(&Slot::Value(1)));
        assert_eq!(record.get("empty"), Some(&Slot::Empty));
        assert_eq!(record.get("absent"), None);

        // value() collapses empty and absent
        assert_eq!(record.value("empty"), None);
        assert_eq!(record.value("absent"), None);

        // contains_key does not
        assert!(record.contains_key("empty"));
        assert!(!record.contains_key("absent"));
    }

    #[test]
    fn test_record_insert_replaces() {
        let mut record: Record<i64> = Record::new();
        record.insert("a", 1);
        record.insert("a", 2);
        assert_eq!(record.value("a"), Some(&2));
        record.insert_empty("a");
        assert_eq!(record.get("a"), Some(&Slot::Empty));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_record_from_iterator() {
        let record: Record<i64> =
            [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.value("a"), Some(&1));
        assert_eq!(record.value("b"), Some(&2));
    }

    #[test]
    fn test_record_iteration_is_ordered() {
        let mut record: Record<i64> = Record::new();
        record.insert("b", 2);
        record.insert("a", 1);
        record.insert("c", 3);
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn test_record_equality() {
        let r1: Record<i64> = [("a".to_string(), 1)].into_iter().collect();
        let r2: Record<i64> = [("a".to_string(), 1)].into_iter().collect();
        let r3: Record<i64> = [("a".to_string(), 2)].into_iter().collect();
        assert_eq!(r1, r2);
        assert_ne!(r1, r3);
    }

    #[test]
    fn test_record_clone() {
        let mut record: Record<i64> = Record::new();
        record.insert("a", 1);
        let copy = record.clone();
        assert_eq!(record, copy);
    }

    #[test]
    fn test_record_default() {
        let record: Record<i64> = Record::default();
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_from_json_map() {
        let json = json!({"a": 1, "b": null, "c": "x"});
        let map = json.as_object().unwrap().clone();
        let record = Record::from(map);

        assert_eq!(record.get("a"), Some(&Slot::Value(json!(1))));
        assert_eq!(record.get("b"), Some(&Slot::Empty));
        assert_eq!(record.get("c"), Some(&Slot::Value(json!("x"))));
    }

    #[test]
    fn test_record_try_from_json_object() {
        let record = Record::try_from(json!({"a": 1})).unwrap();
        assert_eq!(record.value("a"), Some(&json!(1)));
    }

    #[test]
    fn test_record_try_from_json_non_object() {
        let err = Record::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject("an array"));

        let err = Record::try_from(json!(42)).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject("a number"));

        let err = Record::try_from(json!(null)).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject("null"));
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::NotAnObject("a string");
        assert_eq!(err.to_string(), "expected a JSON object, found a string");
    }

    #[test]
    fn test_record_into_json_value() {
        let mut record: Record<serde_json::Value> = Record::new();
        record.insert("a", json!(1));
        record.insert_empty("b");
        let value = serde_json::Value::from(record);
        assert_eq!(value, json!({"a": 1, "b": null}));
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let mut record: Record<serde_json::Value> = Record::new();
        record.insert("a", json!(1));
        record.insert_empty("b");

        let json = serde_json::to_string(&record).unwrap();
        let back: Record<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_slot_null_canonicalizes_to_empty() {
        // Value(Null) and Empty share a wire form; deserialization picks Empty.
        let mut record: Record<serde_json::Value> = Record::new();
        record.insert("a", serde_json::Value::Null);

        let json = serde_json::to_string(&record).unwrap();
        let back: Record<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("a"), Some(&Slot::Empty));
    }

    #[test]
    fn test_record_display() {
        let mut record: Record<i64> = Record::new();
        record.insert("a", 1);
        assert_eq!(format!("{}", record), r#"{"a":1}"#);
    }
}
