use serde::{Deserialize, Serialize};
use proptrail_keys::{validate_attribute, KeyResult};

/// Configuration for a [`PropertyLedger`](crate::PropertyLedger).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Leading key attribute shared by every record this ledger writes.
    ///
    /// Lets several record families live in one store without their keys
    /// interleaving. `None` keys records by `[entity, property]` alone.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl LedgerConfig {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }

    /// Check that the namespace, if any, is a valid key attribute.
    pub fn validate(&self) -> KeyResult<()> {
        match &self.namespace {
            Some(ns) => validate_attribute(ns),
            None => Ok(()),
        }
    }
}
