//! The merge evaluator
//!
//! Structural, identity-preserving shallow merge: apply a sequence of partial
//! updates to a base record, allocating a new record only when the result
//! would differ from the base. A no-op merge hands the base back unchanged,
//! so callers holding immutable state can "update" it without churning
//! allocations or invalidating downstream identity checks.
//!
//! Semantics:
//! - Updates apply left-to-right; the rightmost update wins per key.
//! - Only own entries of each update participate; defaults are invisible.
//! - Comparison is value equality per slot. An empty slot and an absent key
//!   are different states, so unsetting a key the base does not have is an
//!   effective change.
//! - Shallow only: a slot value replaces the base's wholesale.
//! - Inputs are never mutated; at most one record is allocated per call.

use crate::record::{Record, Slot};
use crate::update::Update;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Apply partial updates to a base record, preserving identity on no-ops.
///
/// Returns `Cow::Borrowed(base)` when the updates would leave the record
/// value-equal to `base` (including when `updates` is empty or every update
/// is redundant), and `Cow::Owned` with a single freshly-allocated record
/// otherwise. The owned record contains all of `base`'s entries overlaid
/// with the updates' own entries, rightmost update winning on shared keys.
///
/// The operation is total: it cannot fail and never panics.
///
/// # Examples
///
/// ```
/// use recmerge::{merge, Record, Update};
/// use std::borrow::Cow;
///
/// let base: Record<i64> = [("a".to_string(), 1), ("b".to_string(), 2)]
///     .into_iter()
///     .collect();
///
/// // Redundant update: the base comes back untouched.
/// let same = merge(&base, &[Update::new().set("a", 1)]);
/// assert!(matches!(same, Cow::Borrowed(_)));
///
/// // Effective update: exactly one new record.
/// let merged = merge(&base, &[Update::new().set("a", 3)]);
/// assert!(matches!(merged, Cow::Owned(_)));
/// assert_eq!(merged.value("a"), Some(&3));
/// assert_eq!(merged.value("b"), Some(&2));
/// ```
pub fn merge<'a, V>(base: &'a Record<V>, updates: &[Update<V>]) -> Cow<'a, Record<V>>
where
    V: Clone + PartialEq,
{
    match updates {
        [] => Cow::Borrowed(base),
        // Single update: scan its own entries directly, no union needed.
        [update] => apply(base, update.own_map()),
        many => {
            // Resolve precedence up front: rightmost update wins per key.
            let mut union: BTreeMap<String, Slot<V>> = BTreeMap::new();
            for update in many {
                for (key, slot) in update.own_entries() {
                    union.insert(key.clone(), slot.clone());
                }
            }
            apply(base, &union)
        }
    }
}

/// Shared-ownership variant of [`merge`].
///
/// Identical semantics; a no-op merge returns a clone of the `Arc` itself
/// (observable via [`Arc::ptr_eq`]), an effective merge allocates one new
/// record.
pub fn merge_arc<V>(base: &Arc<Record<V>>, updates: &[Update<V>]) -> Arc<Record<V>>
where
    V: Clone + PartialEq,
{
    match merge(base, updates) {
        Cow::Borrowed(_) => Arc::clone(base),
        Cow::Owned(record) => Arc::new(record),
    }
}

/// Compare a resolved entry set against the base and overlay it if anything
/// differs.
///
/// `entries` must already have precedence resolved (one slot per key).
fn apply<'a, V>(base: &'a Record<V>, entries: &BTreeMap<String, Slot<V>>) -> Cow<'a, Record<V>>
where
    V: Clone + PartialEq,
{
    let effective = entries
        .iter()
        .any(|(key, slot)| base.get(key) != Some(slot));

    if !effective {
        tracing::trace!(target: "recmerge", "no-op merge, reusing base record");
        return Cow::Borrowed(base);
    }

    let mut merged = base.clone();
    for (key, slot) in entries {
        merged.insert_slot(key.clone(), slot.clone());
    }
    tracing::trace!(
        target: "recmerge",
        keys = merged.len(),
        "effective merge, allocated new record"
    );
    Cow::Owned(merged)
}
