use std::fmt;

use serde::{Deserialize, Serialize};

/// One property value of an entity at one point in time.
///
/// Records are immutable once built; a newer value for the same property is
/// a new record that replaces this one in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRecord {
    name: String,
    value: String,
    timestamp: i64,
}

impl PropertyRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Caller-supplied timestamp, conventionally epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl fmt::Display for PropertyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} @{}", self.name, self.value, self.timestamp)
    }
}

/// Current value of every property recorded for one entity.
///
/// Never empty: an entity with no records is reported as
/// [`LedgerError::NotFound`](crate::LedgerError::NotFound) instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntityProperties")]
pub struct EntityProperties {
    entity_id: String,
    properties: Vec<PropertyRecord>,
}

impl EntityProperties {
    /// Build an aggregate. Returns `None` when `properties` is empty.
    pub fn new(entity_id: impl Into<String>, properties: Vec<PropertyRecord>) -> Option<Self> {
        if properties.is_empty() {
            return None;
        }
        Some(Self {
            entity_id: entity_id.into(),
            properties,
        })
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Records in ascending key order, as returned by the store scan.
    pub fn properties(&self) -> &[PropertyRecord] {
        &self.properties
    }

    /// Look up a property by name.
    pub fn get(&self, name: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Always `false`; provided for API symmetry with [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn into_properties(self) -> Vec<PropertyRecord> {
        self.properties
    }
}

impl fmt::Display for EntityProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.entity_id)?;
        for (i, property) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", property.name, property.value)?;
        }
        f.write_str("]")
    }
}

#[derive(Deserialize)]
struct RawEntityProperties {
    entity_id: String,
    properties: Vec<PropertyRecord>,
}

impl TryFrom<RawEntityProperties> for EntityProperties {
    type Error = String;

    fn try_from(raw: RawEntityProperties) -> Result<Self, Self::Error> {
        let entity_id = raw.entity_id;
        EntityProperties::new(entity_id.clone(), raw.properties)
            .ok_or_else(|| format!("entity {entity_id:?} has no properties"))
    }
}
