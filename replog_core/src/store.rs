//! Entry store abstraction.
//!
//! The store is the only persistent state in the system. Every operation
//! touches exactly one record (or reads the whole collection), so backends
//! only need per-operation atomicity.

use crate::document::JsonFileStore;
use crate::memory::MemoryStore;
use crate::{Entry, EntryFields, EntryId, Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

/// Persistence operations for workout entries
pub trait EntryStore: Send + Sync {
    /// All entries, fully materialized and ordered by `sort`
    fn list_all(&self, sort: &SortSpec) -> Result<Vec<Entry>>;

    /// The entry with this id, or `None`
    fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>>;

    /// Persist a new entry with a fresh id and creation time
    fn create(&self, fields: EntryFields) -> Result<Entry>;

    /// Replace every editable field of an existing entry
    fn update(&self, id: &EntryId, fields: EntryFields) -> Result<Entry>;

    /// Remove an entry; removing an unknown id is not an error
    fn delete(&self, id: &EntryId) -> Result<()>;
}

/// Store handle shared between request handlers
pub type SharedStore = Arc<dyn EntryStore>;

// ============================================================================
// Sorting
// ============================================================================

/// Field an entry listing can be ordered by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Date,
    CreatedAt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordered list of sort keys; earlier keys take precedence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(SortKey, Direction)>,
}

impl SortSpec {
    pub fn new(keys: Vec<(SortKey, Direction)>) -> Self {
        Self { keys }
    }

    /// Date descending, then creation time descending
    pub fn newest_first() -> Self {
        Self::new(vec![
            (SortKey::Date, Direction::Descending),
            (SortKey::CreatedAt, Direction::Descending),
        ])
    }

    /// Date descending only; ties keep store order
    pub fn by_date() -> Self {
        Self::new(vec![(SortKey::Date, Direction::Descending)])
    }

    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        for (key, direction) in &self.keys {
            let ord = match key {
                SortKey::Date => a.date.cmp(&b.date),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ord = match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort
    pub fn apply(&self, entries: &mut [Entry]) {
        entries.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::newest_first()
    }
}

/// Creation timestamp strictly later than any already in `existing`
///
/// Keeps the `createdAt` tie-break meaningful on coarse clocks.
pub(crate) fn next_created_at(existing: &[Entry]) -> DateTime<Utc> {
    let now = Utc::now();
    match existing.iter().map(|e| e.created_at).max() {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Where entries are persisted, parsed from a connection string
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// Accepts `memory:`, `file:<path>`, `file://<path>` or a bare path
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Config("database url is empty".into()));
        }

        if url == "memory:" || url == "memory://" {
            return Ok(StoreLocation::Memory);
        }

        if let Some(path) = url
            .strip_prefix("file://")
            .or_else(|| url.strip_prefix("file:"))
        {
            if path.is_empty() {
                return Err(Error::Config(format!("database url {:?} has no path", url)));
            }
            return Ok(StoreLocation::File(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = url.split_once("://") {
            return Err(Error::Config(format!(
                "unsupported database scheme {:?}",
                scheme
            )));
        }

        Ok(StoreLocation::File(PathBuf::from(url)))
    }
}

/// Open the store named by a connection string
pub fn connect(url: &str) -> Result<SharedStore> {
    let store: SharedStore = match StoreLocation::parse(url)? {
        StoreLocation::Memory => {
            tracing::info!("Using in-memory entry store");
            Arc::new(MemoryStore::new())
        }
        StoreLocation::File(path) => {
            let store = JsonFileStore::open(path)?;
            tracing::info!("Using entry collection at {:?}", store.path());
            Arc::new(store)
        }
    };
    Ok(store)
}
