//! Partial-record updates with explicit key ownership
//!
//! An [`Update`] supplies replacement slots for a subset of a base record's
//! keys. It distinguishes keys that were explicitly set on the update (its
//! *own* entries) from keys visible only through an optional defaults record,
//! the analogue of delegation or prototype fallback. Only own entries ever
//! participate in a merge; defaults exist for lookup convenience and are
//! ignored by the evaluator as if they were not there.

use crate::record::{Record, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A partial record: replacement slots for a subset of a base record's keys.
///
/// Updates are built in place and applied left-to-right by
/// [`merge`](crate::merge); for keys set by more than one update in a
/// sequence, the rightmost update wins.
///
/// # Own entries vs defaults
///
/// Entries added with [`set`](Update::set) or [`unset`](Update::unset) are
/// *own* entries. A defaults record attached with
/// [`with_defaults`](Update::with_defaults) is consulted only by
/// [`get`](Update::get); the merge evaluator reads exclusively from the own
/// entries, so a defaults-only update is a no-op.
///
/// # Examples
///
/// ```
/// use recmerge::{Slot, Update};
///
/// let update: Update<i64> = Update::new().set("a", 3).unset("b");
///
/// assert_eq!(update.get("a"), Some(&Slot::Value(3)));
/// assert_eq!(update.get("b"), Some(&Slot::Empty));
/// assert!(update.is_own("a"));
/// assert!(!update.is_own("c"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update<V> {
    /// Explicitly-set entries; the only ones the merge evaluator reads.
    own: BTreeMap<String, Slot<V>>,
    /// Delegation target for lookups of keys not set on this update.
    #[serde(skip)]
    defaults: Option<Arc<Record<V>>>,
}

impl<V> Update<V> {
    /// Create an update with no entries.
    pub fn new() -> Self {
        Update {
            own: BTreeMap::new(),
            defaults: None,
        }
    }

    /// Set a key to a value (builder pattern).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<V>) -> Self {
        self.own.insert(key.into(), Slot::Value(value.into()));
        self
    }

    /// Set a key to the empty slot, i.e. "present with no value" (builder pattern).
    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.own.insert(key.into(), Slot::Empty);
        self
    }

    /// Set a key to an explicit slot (builder pattern).
    pub fn set_slot(mut self, key: impl Into<String>, slot: Slot<V>) -> Self {
        self.own.insert(key.into(), slot);
        self
    }

    /// Attach a defaults record consulted by [`get`](Update::get) for keys
    /// not set on this update (builder pattern).
    ///
    /// Defaults never participate in merging.
    pub fn with_defaults(mut self, defaults: Arc<Record<V>>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Look up a key, falling back to the defaults record.
    pub fn get(&self, key: &str) -> Option<&Slot<V>> {
        self.own
            .get(key)
            .or_else(|| self.defaults.as_ref().and_then(|d| d.get(key)))
    }

    /// Check whether a key was explicitly set on this update.
    pub fn is_own(&self, key: &str) -> bool {
        self.own.contains_key(key)
    }

    /// Iterate over the explicitly-set keys in order.
    pub fn own_keys(&self) -> impl Iterator<Item = &String> {
        self.own.keys()
    }

    /// Iterate over the explicitly-set entries in key order.
    pub fn own_entries(&self) -> impl Iterator<Item = (&String, &Slot<V>)> {
        self.own.iter()
    }

    /// Number of explicitly-set keys.
    pub fn len(&self) -> usize {
        self.own.len()
    }

    /// Check whether the update has no explicitly-set keys.
    ///
    /// An update that is empty in this sense is a merge no-op even when it
    /// carries defaults.
    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }

    /// Own entries as a map, for the evaluator's single-update path.
    pub(crate) fn own_map(&self) -> &BTreeMap<String, Slot<V>> {
        &self.own
    }
}

impl<V> Default for Update<V> {
    fn default() -> Self {
        Update::new()
    }
}

impl<V> From<Record<V>> for Update<V> {
    /// Convert a record into an update; every key becomes an own entry.
    fn from(record: Record<V>) -> Self {
        Update {
            own: record.into_iter().collect(),
            defaults: None,
        }
    }
}

impl<V> FromIterator<(String, V)> for Update<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Update {
            own: iter
                .into_iter()
                .map(|(k, v)| (k, Slot::Value(v)))
                .collect(),
            defaults: None,
        }
    }
}

impl<V> FromIterator<(String, Slot<V>)> for Update<V> {
    fn from_iter<I: IntoIterator<Item = (String, Slot<V>)>>(iter: I) -> Self {
        Update {
            own: iter.into_iter().collect(),
            defaults: None,
        }
    }
}
