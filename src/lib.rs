//! Identity-preserving shallow merge for immutable key-value records
//!
//! This crate provides one primitive: [`merge`], a structural merge of
//! partial updates into a base [`Record`] that reuses the base whenever the
//! updates are a no-op. Callers treating records as immutable values can
//! apply "updates" freely without allocating when nothing actually changes,
//! which keeps identity-based change detection (pointer comparison, `Cow`
//! variant checks) meaningful downstream.
//!
//! The data model distinguishes three states per key:
//! - absent: the record has no entry for the key
//! - present with no value: [`Slot::Empty`], the absent-marker
//! - present with a value: [`Slot::Value`]
//!
//! Updates ([`Update`]) carry explicitly-set *own* entries plus an optional
//! defaults record visible to lookups only; merging consults own entries
//! exclusively.
//!
//! # Example
//!
//! ```
//! use recmerge::{merge, Record, Update};
//! use std::borrow::Cow;
//!
//! let base: Record<i64> = [("a".to_string(), 1), ("b".to_string(), 2)]
//!     .into_iter()
//!     .collect();
//!
//! // No-op update: base identity preserved.
//! assert!(matches!(
//!     merge(&base, &[Update::new().set("a", 1)]),
//!     Cow::Borrowed(_)
//! ));
//!
//! // Effective update: one new record.
//! let merged = merge(&base, &[Update::new().set("a", 3)]);
//! assert_eq!(merged.value("a"), Some(&3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod merge;
pub mod record;
pub mod update;

// Re-exports
pub use merge::{merge, merge_arc};
pub use record::{Record, RecordError, Slot};
pub use update::Update;
