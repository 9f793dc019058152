//! In-process entry store.
//!
//! Used for `memory:` connection strings and throughout the tests. Contents
//! are lost when the process exits.

use crate::store::{next_created_at, EntryStore, SortSpec};
use crate::{Entry, EntryFields, EntryId, Error, Result};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Entry collection held behind a `RwLock`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Entry>>> {
        self.entries
            .read()
            .map_err(|_| Error::Store("entry collection lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Entry>>> {
        self.entries
            .write()
            .map_err(|_| Error::Store("entry collection lock poisoned".into()))
    }
}

impl EntryStore for MemoryStore {
    fn list_all(&self, sort: &SortSpec) -> Result<Vec<Entry>> {
        let mut entries = self.read()?.clone();
        sort.apply(&mut entries);
        Ok(entries)
    }

    fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>> {
        Ok(self.read()?.iter().find(|e| e.id == *id).cloned())
    }

    fn create(&self, fields: EntryFields) -> Result<Entry> {
        fields.check()?;

        let mut entries = self.write()?;
        let entry = Entry::new(fields, next_created_at(&entries));
        entries.push(entry.clone());

        tracing::debug!("Created entry {}", entry.id);
        Ok(entry)
    }

    fn update(&self, id: &EntryId, fields: EntryFields) -> Result<Entry> {
        fields.check()?;

        let mut entries = self.write()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        entry.replace_fields(fields);

        tracing::debug!("Updated entry {}", id);
        Ok(entry.clone())
    }

    fn delete(&self, id: &EntryId) -> Result<()> {
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|e| e.id != *id);

        if entries.len() == before {
            tracing::debug!("Delete of unknown entry {} ignored", id);
        } else {
            tracing::debug!("Deleted entry {}", id);
        }
        Ok(())
    }
}
