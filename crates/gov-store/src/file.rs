// file.rs — JSON-file store backend.
//
// Persists the whole table set as one pretty-printed JSON document, loaded
// on open and rewritten after each successful write. Simple to inspect
// manually and entirely adequate for an operator CLI; the production
// deployment talks to the real relational service instead.
//
// Write ordering upholds the unit-of-work guarantee: ops are applied to a
// scratch copy, the scratch is persisted to disk, and only then does it
// replace the in-memory state. A failure at any point leaves both the file
// and memory at the previous consistent snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::StoreError;
use crate::index::UniqueIndex;
use crate::memory::Tables;
use crate::predicate::{Predicate, Sort};
use crate::row::Row;
use crate::uow::UnitOfWork;
use crate::Store;

/// JSON-file backend with the same semantics as [`crate::MemoryStore`].
pub struct FileStore {
    path: PathBuf,
    indexes: Vec<UniqueIndex>,
    inner: Mutex<Tables>,
}

impl FileStore {
    /// Open (or create) a store at the given path.
    ///
    /// A missing file starts empty; it is written on the first mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&json)?
        } else {
            Tables::default()
        };
        Ok(Self {
            path,
            indexes: Vec::new(),
            inner: Mutex::new(tables),
        })
    }

    /// Register a unique index and return self (builder pattern).
    ///
    /// Indexes are not persisted in the state file; callers re-register
    /// them on every open, the way a schema migration would.
    pub fn with_index(mut self, index: UniqueIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state to disk even if nothing has mutated yet.
    ///
    /// `open` defers file creation to the first write; seeding tools call
    /// this to materialize an empty state file immediately.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.persist(&self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(tables)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), "state persisted");
        Ok(())
    }

    /// Run a mutation against a scratch copy, persist, then swap it in.
    fn mutate<T>(
        &self,
        mutation: impl FnOnce(&mut Tables, &[UniqueIndex]) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.lock();
        let mut scratch = guard.clone();
        let result = mutation(&mut scratch, &self.indexes)?;
        self.persist(&scratch)?;
        *guard = scratch;
        Ok(result)
    }
}

impl Store for FileStore {
    fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        self.mutate(|tables, indexes| tables.insert(indexes, table, row))
    }

    fn update_where(
        &self,
        table: &str,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Row, StoreError> {
        self.mutate(|tables, indexes| tables.update_where(indexes, table, predicate, patch))
    }

    fn select_where(
        &self,
        table: &str,
        predicate: &Predicate,
        sort: &[Sort],
        limit: usize,
    ) -> Result<Vec<Row>, StoreError> {
        Ok(self.lock().select_where(table, predicate, sort, limit))
    }

    fn commit(&self, uow: UnitOfWork) -> Result<Vec<Row>, StoreError> {
        self.mutate(|tables, indexes| tables.apply(indexes, &uow))
    }
}
