//! Sorted key-value storage for the proptrail property ledger.
//!
//! The ledger only needs three primitives from its store: an atomic `put`,
//! a point `get`, and an ordered half-open range `scan`. This crate defines
//! that boundary as the [`KeyValueStore`] trait and ships two backends:
//!
//! - [`InMemoryKeyValueStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileKeyValueStore`] -- single snapshot file, replaced atomically on
//!   every write, used by the command-line tool
//!
//! # Design Rules
//!
//! 1. Keys are UTF-8 strings compared byte-wise.
//! 2. Values are opaque bytes; the store never decodes them.
//! 3. Scans observe one consistent state of the range.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use traits::{KeyValue, KeyValueIter, KeyValueStore};
