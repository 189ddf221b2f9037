use proptrail_keys::{encode, prefix_bounds, split};
use proptrail_store::{KeyValueStore, StoreError};
use tracing::{debug, info, warn};

use crate::codec::{JsonRecordCodec, RecordCodec};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::records::{EntityProperties, PropertyRecord};

/// Demo records written by [`PropertyLedger::seed_samples`], as
/// `(entity, property, value)`.
pub const SAMPLE_PROPERTIES: &[(&str, &str, &str)] = &[
    ("product1", "color", "red"),
    ("product2", "size", "large"),
];

/// Records and aggregates entity properties on top of a sorted key-value store.
///
/// Each `(entity, property)` pair occupies one entry keyed by the composite
/// key `[namespace?, entity, property]`. Writes overwrite in place; a query
/// scans the `[namespace?, entity]` prefix and returns every current value.
pub struct PropertyLedger<S, C = JsonRecordCodec> {
    store: S,
    codec: C,
    config: LedgerConfig,
}

impl<S: KeyValueStore> PropertyLedger<S> {
    /// Ledger with JSON-encoded records and no namespace.
    pub fn new(store: S) -> Self {
        Self {
            store,
            codec: JsonRecordCodec,
            config: LedgerConfig::default(),
        }
    }
}

impl<S: KeyValueStore, C: RecordCodec> PropertyLedger<S, C> {
    /// Ledger with an explicit codec and configuration.
    ///
    /// Fails with [`LedgerError::InvalidArgument`] if the configured
    /// namespace cannot be used as a key attribute.
    pub fn with_config(store: S, codec: C, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            codec,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ledger initialization hook. Writes nothing; records are created lazily.
    pub fn init(&self) -> LedgerResult<()> {
        info!(
            namespace = self.config.namespace.as_deref().unwrap_or(""),
            codec = self.codec.name(),
            "property ledger initialized"
        );
        Ok(())
    }

    /// Write the [`SAMPLE_PROPERTIES`] demo records, all stamped `timestamp`.
    ///
    /// Existing values for the same keys are overwritten.
    pub fn seed_samples(&self, timestamp: i64) -> LedgerResult<Vec<PropertyRecord>> {
        let records = SAMPLE_PROPERTIES
            .iter()
            .map(|(entity, name, value)| self.write(entity, name, value, timestamp))
            .collect::<LedgerResult<Vec<_>>>()?;
        info!(count = records.len(), timestamp, "sample properties seeded");
        Ok(records)
    }

    /// Create or overwrite one property of an entity.
    ///
    /// The write is an unconditional upsert: any earlier record for the same
    /// `(entity_id, property_name)` is replaced. Returns the stored record.
    pub fn write(
        &self,
        entity_id: &str,
        property_name: &str,
        property_value: &str,
        timestamp: i64,
    ) -> LedgerResult<PropertyRecord> {
        let key = encode(&self.attributes(&[entity_id, property_name]))?;
        let record = PropertyRecord::new(property_name, property_value, timestamp);
        let bytes = self.codec.encode(&record)?;
        self.store.put(&key, &bytes)?;

        debug!(
            entity_id,
            property = property_name,
            timestamp,
            len = bytes.len(),
            "property written"
        );
        Ok(record)
    }

    /// Current value of every property recorded for `entity_id`.
    ///
    /// Records come back in ascending key order, i.e. by property name.
    /// Fails with [`LedgerError::NotFound`] when the entity has no records,
    /// and with [`LedgerError::Store`] when a stored value cannot be decoded.
    /// Keys in range with a different attribute count (another namespace
    /// layout) are skipped.
    pub fn query(&self, entity_id: &str) -> LedgerResult<EntityProperties> {
        let prefix = self.attributes(&[entity_id]);
        let range = prefix_bounds(&prefix)?;

        let mut properties = Vec::new();
        for entry in self.store.scan(&range.start, &range.end)? {
            let entry = entry?;
            if !range.contains(&entry.key) {
                return Err(corrupt(&entry.key, "store returned a key outside the scan range").into());
            }

            let attributes =
                split(&entry.key).map_err(|e| corrupt(&entry.key, e.to_string()))?;
            // A plain ledger and a namespaced one can share a store, so the
            // range also holds keys of the other layout.
            if attributes.len() != prefix.len() + 1 {
                debug!(
                    entity_id,
                    attributes = attributes.len(),
                    "skipping key with a different layout"
                );
                continue;
            }

            let record = self
                .codec
                .decode(&entry.value)
                .map_err(|e| corrupt(&entry.key, e.to_string()))?;
            if attributes.last().map(String::as_str) != Some(record.name()) {
                warn!(
                    entity_id,
                    property = record.name(),
                    "stored record name differs from its key"
                );
            }

            properties.push(record);
        }

        match EntityProperties::new(entity_id, properties) {
            Some(found) => {
                debug!(entity_id, count = found.len(), "entity queried");
                Ok(found)
            }
            None => {
                debug!(entity_id, "entity has no recorded properties");
                Err(LedgerError::NotFound {
                    entity_id: entity_id.to_string(),
                })
            }
        }
    }

    /// Key attributes with the configured namespace prepended.
    fn attributes<'a>(&'a self, attributes: &[&'a str]) -> Vec<&'a str> {
        self.config
            .namespace
            .as_deref()
            .into_iter()
            .chain(attributes.iter().copied())
            .collect()
    }
}

impl<S, C: RecordCodec> std::fmt::Debug for PropertyLedger<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyLedger")
            .field("codec", &self.codec.name())
            .field("config", &self.config)
            .finish()
    }
}

fn corrupt(key: &str, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        reason: reason.into(),
    }
}
