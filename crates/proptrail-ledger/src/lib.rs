//! Property ledger for tracked entities.
//!
//! This crate records named, timestamped properties of an entity (a product,
//! a batch, a device) and returns the current value of all of them in one
//! query. It provides:
//! - [`PropertyRecord`] and the non-empty [`EntityProperties`] aggregate
//! - [`PropertyLedger`] with its two operations, `write` and `query`
//! - Pluggable record encodings ([`JsonRecordCodec`], [`BincodeRecordCodec`])
//! - [`LedgerConfig`] for an optional key namespace
//!
//! Storage is injected: any [`proptrail_store::KeyValueStore`] works, and
//! keys are built with [`proptrail_keys`] so that a query for entity `"A"`
//! never sees entity `"AB"`.
//!
//! ```
//! use proptrail_ledger::PropertyLedger;
//! use proptrail_store::InMemoryKeyValueStore;
//!
//! let ledger = PropertyLedger::new(InMemoryKeyValueStore::new());
//! ledger.write("widget-1", "weight", "2.5kg", 1000).unwrap();
//! ledger.write("widget-1", "color", "red", 1001).unwrap();
//!
//! let found = ledger.query("widget-1").unwrap();
//! assert_eq!(found.to_string(), "widget-1 [color=red, weight=2.5kg]");
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod ledger;
pub mod records;

pub use codec::{BincodeRecordCodec, JsonRecordCodec, RecordCodec, RecordFormat};
pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::{PropertyLedger, SAMPLE_PROPERTIES};
pub use records::{EntityProperties, PropertyRecord};
