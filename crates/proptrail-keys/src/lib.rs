//! Composite key encoding for the proptrail property ledger.
//!
//! A composite key packs an ordered list of string attributes (for example
//! an entity id followed by a property name) into one sortable string. Every
//! attribute is wrapped in [`DELIMITER`] on both sides:
//!
//! ```text
//! \0widget-1\0color\0
//! ```
//!
//! Wrapping on both sides means a key built from `["A"]` is a string prefix
//! of every key built from `["A", ..]` and of no key built from `["AB", ..]`.
//! A [`KeyRange`] from [`prefix_bounds`] therefore selects exactly the
//! entries that extend a given attribute prefix when scanned over a sorted
//! key space.
//!
//! # Modules
//!
//! - [`error`] — [`KeyError`] and the [`KeyResult`] alias
//! - [`codec`] — [`encode`], [`split`], [`prefix_bounds`] and attribute validation

pub mod codec;
pub mod error;

pub use codec::{
    encode, prefix_bounds, split, validate_attribute, KeyRange, DELIMITER, RANGE_SENTINEL,
};
pub use error::{KeyError, KeyResult};
