use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::{KeyValue, KeyValueIter, KeyValueStore};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

type Entries = BTreeMap<String, Vec<u8>>;

/// Key-value store persisted as a single snapshot file.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized BTreeMap<String, Vec<u8>>)]
/// ```
///
/// Every `put` rewrites the whole snapshot into a temporary file in the same
/// directory and renames it over the old one, so a crash leaves either the
/// old or the new snapshot on disk. If persisting fails the in-memory entry
/// is rolled back and the error is returned.
///
/// Single writer at a time. A `put` reloads the snapshot before applying its
/// change, so handles that write in turn (including separate processes)
/// keep each other's entries. Nothing locks the file across processes,
/// though: two writers persisting at the same moment can still lose one
/// update. `get` and `scan` serve the state as of the last open or `put`.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileKeyValueStore {
    /// Open the snapshot at `path`, starting empty if the file does not exist.
    ///
    /// Nothing is written until the first `put` (or [`create`](Self::create)).
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            read_snapshot(&path)?
        } else {
            Entries::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open the snapshot at `path`, writing an empty one if it does not exist.
    ///
    /// Returns the store and whether a new file was created.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            return Ok((Self::open(path)?, false));
        }
        write_snapshot(path, &Entries::new())?;
        info!(path = %path.display(), "created empty file store");
        Ok((Self::open(path)?, true))
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> StoreResult<MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut entries = self.lock_entries()?;
        if self.path.is_file() {
            *entries = read_snapshot(&self.path)?;
        }
        let previous = entries.insert(key.to_string(), value.to_vec());

        if let Err(e) = write_snapshot(&self.path, &entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }

        debug!(path = %self.path.display(), len = value.len(), "file store put");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.lock_entries()?;
        Ok(entries.get(key).cloned())
    }

    fn scan(&self, start: &str, end: &str) -> StoreResult<KeyValueIter<'_>> {
        if start >= end {
            return Ok(Box::new(std::iter::empty()));
        }

        let entries = self.lock_entries()?;
        let matched: Vec<KeyValue> = entries
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect();
        Ok(Box::new(matched.into_iter().map(Ok)))
    }
}

impl std::fmt::Debug for FileKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKeyValueStore")
            .field("path", &self.path)
            .field("entry_count", &self.len())
            .finish()
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        key: path.display().to_string(),
        reason: reason.into(),
    }
}

fn read_snapshot(path: &Path) -> StoreResult<Entries> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    if bytes.len() < HEADER_SIZE {
        return Err(corrupt(path, "truncated snapshot header"));
    }
    let (header, payload) = bytes.split_at(HEADER_SIZE);
    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let stored_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    if payload.len() != length {
        return Err(corrupt(
            path,
            format!("expected {length} payload bytes, found {}", payload.len()),
        ));
    }
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(corrupt(
            path,
            format!("CRC mismatch: stored {stored_crc:#010x}, computed {computed_crc:#010x}"),
        ));
    }

    bincode::deserialize(payload).map_err(|e| corrupt(path, e.to_string()))
}

fn write_snapshot(path: &Path, entries: &Entries) -> StoreResult<()> {
    let payload =
        bincode::serialize(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization("snapshot exceeds 4 GiB".into()))?;
    let crc = crc32fast::hash(&payload);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&length.to_le_bytes())?;
    tmp.write_all(&crc.to_le_bytes())?;
    tmp.write_all(&payload)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("ledger.db")
    }

    #[test]
    fn open_missing_file_is_empty_and_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        let store = FileKeyValueStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn create_writes_empty_snapshot_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let (_, created) = FileKeyValueStore::create(&path).unwrap();
        assert!(created);
        assert!(path.exists());

        let (store, created) = FileKeyValueStore::create(&path).unwrap();
        assert!(!created);
        assert!(store.is_empty());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        {
            let store = FileKeyValueStore::open(&path).unwrap();
            store.put("\0P1\0temp\0", b"21.5").unwrap();
            store.put("\0P1\0humidity\0", b"40").unwrap();
            store.put("\0P1\0temp\0", b"22.0").unwrap();
        }

        let store = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("\0P1\0temp\0").unwrap(), Some(b"22.0".to_vec()));
    }

    #[test]
    fn handles_on_one_path_keep_each_others_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        let first = FileKeyValueStore::open(&path).unwrap();
        let second = FileKeyValueStore::open(&path).unwrap();

        first.put("\0P1\0temp\0", b"21").unwrap();
        second.put("\0P2\0temp\0", b"22").unwrap();
        assert_eq!(second.len(), 2);

        let reopened = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(reopened.get("\0P1\0temp\0").unwrap(), Some(b"21".to_vec()));
        assert_eq!(reopened.get("\0P2\0temp\0").unwrap(), Some(b"22".to_vec()));
    }

    #[test]
    fn put_fails_on_a_snapshot_corrupted_since_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        let store = FileKeyValueStore::open(&path).unwrap();
        store.put("k", b"v").unwrap();
        fs::write(&path, [0u8; 3]).unwrap();

        assert!(matches!(store.put("k2", b"v"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn scan_returns_sorted_half_open_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(store_path(&dir)).unwrap();
        for key in ["c", "a", "b"] {
            store.put(key, key.as_bytes()).unwrap();
        }

        let keys: Vec<String> = store
            .scan("a", "c")
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.scan("c", "a").unwrap().count(), 0);
    }

    #[test]
    fn truncated_snapshot_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        fs::write(&path, [1u8, 2, 3]).unwrap();
        assert!(matches!(
            FileKeyValueStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn crc_mismatch_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        FileKeyValueStore::open(&path).unwrap().put("k", b"v").unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        let err = FileKeyValueStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("CRC mismatch"));
    }

    #[test]
    fn failed_persist_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the snapshot path makes the final rename fail.
        let path = store_path(&dir);
        let store = FileKeyValueStore::open(&path).unwrap();
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(store.put("k", b"v").is_err());
        assert!(store.get("k").unwrap().is_none());
    }
}
