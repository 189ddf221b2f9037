//! Storage encodings for [`PropertyRecord`] values.
//!
//! A codec is a stateless value owned by the ledger. [`JsonRecordCodec`] is
//! the default; [`BincodeRecordCodec`] trades readability for size.
//! [`RecordFormat`] picks one of them at runtime, e.g. from configuration.

use serde::{Deserialize, Serialize};
use proptrail_store::{StoreError, StoreResult};

use crate::records::PropertyRecord;

/// Encode/decode pair for stored property records.
pub trait RecordCodec: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;

    fn encode(&self, record: &PropertyRecord) -> StoreResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> StoreResult<PropertyRecord>;
}

/// JSON encoding: `{"name":..,"value":..,"timestamp":..}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonRecordCodec;

impl RecordCodec for JsonRecordCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, record: &PropertyRecord) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<PropertyRecord> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Compact bincode encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BincodeRecordCodec;

impl RecordCodec for BincodeRecordCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode(&self, record: &PropertyRecord) -> StoreResult<Vec<u8>> {
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<PropertyRecord> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Runtime-selectable record encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Json,
    Bincode,
}

impl RecordCodec for RecordFormat {
    fn name(&self) -> &'static str {
        match self {
            RecordFormat::Json => JsonRecordCodec.name(),
            RecordFormat::Bincode => BincodeRecordCodec.name(),
        }
    }

    fn encode(&self, record: &PropertyRecord) -> StoreResult<Vec<u8>> {
        match self {
            RecordFormat::Json => JsonRecordCodec.encode(record),
            RecordFormat::Bincode => BincodeRecordCodec.encode(record),
        }
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<PropertyRecord> {
        match self {
            RecordFormat::Json => JsonRecordCodec.decode(bytes),
            RecordFormat::Bincode => BincodeRecordCodec.decode(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PropertyRecord {
        PropertyRecord::new("batch-id", "B-0042", 1_700_000_000_123)
    }

    #[test]
    fn json_is_readable() {
        let bytes = JsonRecordCodec.encode(&record()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"batch-id\""));
        assert_eq!(JsonRecordCodec.decode(&bytes).unwrap(), record());
    }

    #[test]
    fn bincode_decodes_its_own_output() {
        let bytes = BincodeRecordCodec.encode(&record()).unwrap();
        assert_eq!(BincodeRecordCodec.decode(&bytes).unwrap(), record());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(JsonRecordCodec.decode(b"not json").is_err());
        assert!(BincodeRecordCodec.decode(&[0xff]).is_err());
    }

    #[test]
    fn format_dispatches_to_codec() {
        let json = RecordFormat::Json.encode(&record()).unwrap();
        assert_eq!(json, JsonRecordCodec.encode(&record()).unwrap());
        assert_eq!(RecordFormat::Bincode.name(), "bincode");
        assert_eq!(RecordFormat::default(), RecordFormat::Json);
    }

    #[test]
    fn format_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: RecordFormat,
        }
        let w: Wrapper = serde_json::from_str(r#"{"format":"bincode"}"#).unwrap();
        assert_eq!(w.format, RecordFormat::Bincode);
    }
}
