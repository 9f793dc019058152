//! File-backed entry collection with file locking.
//!
//! The whole collection lives in one JSON document. Readers take a shared
//! lock on the document; writers hold an exclusive lock on a sibling `.lock`
//! file for the full read-modify-write and replace the document atomically.

use crate::store::{next_created_at, EntryStore, SortSpec};
use crate::{Entry, EntryFields, EntryId, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Entry store persisted as a single JSON document
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Open (or prepare to create) the collection at `path`
    ///
    /// The document itself is created on the first write. An existing but
    /// unreadable document is reported here rather than on the first request.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lock_path = lock_path_for(&path);
        let store = Self { path, lock_path };

        std::fs::create_dir_all(store.dir())?;
        let count = store.load()?.len();
        tracing::debug!("Opened collection {:?} with {} entries", store.path, count);

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Read the collection with a shared lock
    ///
    /// A missing document is an empty collection. A corrupt one is a store
    /// error and is never reset.
    fn load(&self) -> Result<Vec<Entry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<Entry>>(&contents).map_err(|e| {
            tracing::error!("Entry collection {:?} is unreadable: {}", self.path, e);
            Error::Store(format!("entry collection {:?} is corrupt: {}", self.path, e))
        })
    }

    /// Atomically replace the document
    fn save(&self, entries: &[Entry]) -> Result<()> {
        let temp = NamedTempFile::new_in(self.dir())?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(entries)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} entries to {:?}", entries.len(), self.path);
        Ok(())
    }

    /// Load, modify and save the collection under the writer lock
    ///
    /// Nothing is written when `f` fails.
    fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Entry>) -> Result<T>,
    {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        lock.lock_exclusive()?;

        let result = self.load().and_then(|mut entries| {
            let value = f(&mut entries)?;
            self.save(&entries)?;
            Ok(value)
        });

        lock.unlock()?;
        result
    }
}

/// Writer lock beside the document: `entries.json` locks `entries.json.lock`
///
/// Appending keeps the lock distinct from the document whatever its extension.
fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

impl EntryStore for JsonFileStore {
    fn list_all(&self, sort: &SortSpec) -> Result<Vec<Entry>> {
        let mut entries = self.load()?;
        sort.apply(&mut entries);
        Ok(entries)
    }

    fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>> {
        Ok(self.load()?.into_iter().find(|e| e.id == *id))
    }

    fn create(&self, fields: EntryFields) -> Result<Entry> {
        fields.check()?;

        let entry = self.modify(|entries| {
            let entry = Entry::new(fields, next_created_at(entries));
            entries.push(entry.clone());
            Ok(entry)
        })?;

        tracing::debug!("Created entry {}", entry.id);
        Ok(entry)
    }

    fn update(&self, id: &EntryId, fields: EntryFields) -> Result<Entry> {
        fields.check()?;

        let entry = self.modify(|entries| {
            let entry = entries
                .iter_mut()
                .find(|e| e.id == *id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            entry.replace_fields(fields);
            Ok(entry.clone())
        })?;

        tracing::debug!("Updated entry {}", id);
        Ok(entry)
    }

    fn delete(&self, id: &EntryId) -> Result<()> {
        if self.find_by_id(id)?.is_none() {
            tracing::debug!("Delete of unknown entry {} ignored", id);
            return Ok(());
        }

        self.modify(|entries| {
            entries.retain(|e| e.id != *id);
            Ok(())
        })?;

        tracing::debug!("Deleted entry {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_store_contract() {
        let temp_dir = tempfile::tempdir().unwrap();
        let counter = std::cell::Cell::new(0);

        contract::run_all(|| {
            counter.set(counter.get() + 1);
            let path = temp_dir.path().join(format!("entries_{}.json", counter.get()));
            Box::new(JsonFileStore::open(path).unwrap())
        });
    }

    #[test]
    fn test_lock_file_never_shadows_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["entries.json", "entries.lock", "log"] {
            let path = temp_dir.path().join(name);
            let store = JsonFileStore::open(&path).unwrap();
            assert_ne!(store.lock_path, store.path);
            assert_eq!(store.lock_path, temp_dir.path().join(format!("{}.lock", name)));
        }
    }

    #[test]
    fn test_store_contract_with_lock_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let counter = std::cell::Cell::new(0);

        contract::run_all(|| {
            counter.set(counter.get() + 1);
            let path = temp_dir.path().join(format!("entries_{}.lock", counter.get()));
            Box::new(JsonFileStore::open(path).unwrap())
        });
    }

    #[test]
    fn test_entries_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("entries.json");

        let created = JsonFileStore::open(&path)
            .unwrap()
            .create(contract::bench_press())
            .unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let found = reopened.find_by_id(&created.id).unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn test_missing_file_is_empty_collection() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("nested/entries.json")).unwrap();

        assert!(store.list_all(&SortSpec::default()).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_store_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("entries.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        // The document is left untouched for manual recovery
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("entries.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.create(contract::bench_press()).unwrap();

        let before = std::fs::read_to_string(&path).unwrap();
        assert!(store
            .update(&EntryId::generate(), contract::bench_press())
            .is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_concurrent_writers_keep_every_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("entries.json");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = JsonFileStore::open(path).unwrap();
                    for _ in 0..5 {
                        store.create(contract::bench_press()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.list_all(&SortSpec::default()).unwrap().len(), 20);
    }
}
