use crate::error::StoreResult;

/// A single stored entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One-shot iterator over a scan, in ascending key order.
///
/// Re-running a scan means calling [`KeyValueStore::scan`] again.
pub type KeyValueIter<'a> = Box<dyn Iterator<Item = StoreResult<KeyValue>> + 'a>;

/// Sorted key-value store.
///
/// All implementations must satisfy these invariants:
/// - `put` is atomic: after a failed `put` the previous value (or absence) is
///   still observable.
/// - The last accepted `put` for a key wins; no history is kept.
/// - `scan` yields keys in ascending byte order and covers the half-open
///   range `[start, end)`.
/// - The store never interprets values. It is a pure key-value store.
/// - All I/O errors are propagated, never silently ignored.
pub trait KeyValueStore: Send + Sync {
    /// Create or overwrite the value at `key`.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Read the value at `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Iterate over every entry with `start <= key < end`.
    fn scan(&self, start: &str, end: &str) -> StoreResult<KeyValueIter<'_>>;

    /// Check whether a key exists in the store.
    ///
    /// Default implementation calls `get()`.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn scan(&self, start: &str, end: &str) -> StoreResult<KeyValueIter<'_>> {
        (**self).scan(start, end)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn scan(&self, start: &str, end: &str) -> StoreResult<KeyValueIter<'_>> {
        (**self).scan(start, end)
    }
}
