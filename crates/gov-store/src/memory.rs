// memory.rs — In-memory store backend.
//
// Tables is the actual engine: a map of table name → rows plus the seq
// counter, with all constraint checking. MemoryStore wraps it in a Mutex;
// FileStore reuses the same engine and adds persistence.
//
// Atomicity of a unit of work is clone-validate-swap: every op is applied
// to a scratch copy of the tables, and only a fully successful batch
// replaces the live state. A failure anywhere leaves the store untouched.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::StoreError;
use crate::index::UniqueIndex;
use crate::predicate::{sort_rows, Predicate, Sort};
use crate::row::{Row, SEQ_COLUMN};
use crate::uow::{UnitOfWork, WriteOp};
use crate::Store;

/// The table set: all state a backend holds. Serializable so the file
/// backend can persist it as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    tables: BTreeMap<String, Vec<Row>>,
    next_seq: u64,
}

impl Tables {
    /// Insert a row: stamp `seq`, enforce unique indexes, append.
    pub(crate) fn insert(
        &mut self,
        indexes: &[UniqueIndex],
        table: &str,
        mut row: Row,
    ) -> Result<Row, StoreError> {
        row.insert(SEQ_COLUMN.to_string(), json!(self.next_seq));
        self.check_unique(indexes, table, &row, None)?;
        self.next_seq += 1;
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    /// Patch the first row matching `predicate`. Fails with `NoMatch` when
    /// nothing matches, and re-checks unique indexes on the patched row.
    pub(crate) fn update_where(
        &mut self,
        indexes: &[UniqueIndex],
        table: &str,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Row, StoreError> {
        let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        let position = rows.iter().position(|row| predicate.matches(row));
        let Some(position) = position else {
            return Err(StoreError::NoMatch {
                table: table.to_string(),
            });
        };

        let mut updated = rows[position].clone();
        for (column, value) in patch {
            updated.insert(column, value);
        }
        self.check_unique(indexes, table, &updated, Some(position))?;

        // Unwrap is safe: position came from this table's rows.
        self.tables.get_mut(table).unwrap()[position] = updated.clone();
        Ok(updated)
    }

    pub(crate) fn select_where(
        &self,
        table: &str,
        predicate: &Predicate,
        sort: &[Sort],
        limit: usize,
    ) -> Vec<Row> {
        let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        let mut matched: Vec<Row> = rows
            .iter()
            .filter(|row| predicate.matches(row))
            .cloned()
            .collect();
        sort_rows(&mut matched, sort);
        matched.truncate(limit);
        matched
    }

    /// Apply every op of a unit of work, in order, against self.
    /// Callers run this on a scratch clone for all-or-nothing semantics.
    pub(crate) fn apply(
        &mut self,
        indexes: &[UniqueIndex],
        uow: &UnitOfWork,
    ) -> Result<Vec<Row>, StoreError> {
        let mut results = Vec::with_capacity(uow.len());
        for op in uow.ops() {
            let row = match op {
                WriteOp::Insert { table, row } => self.insert(indexes, table, row.clone())?,
                WriteOp::UpdateWhere {
                    table,
                    predicate,
                    patch,
                } => self.update_where(indexes, table, predicate, patch.clone())?,
            };
            results.push(row);
        }
        Ok(results)
    }

    /// Reject `candidate` if it collides with any other row under a
    /// registered unique index for this table. `skip` excludes the row
    /// being updated from the comparison.
    fn check_unique(
        &self,
        indexes: &[UniqueIndex],
        table: &str,
        candidate: &Row,
        skip: Option<usize>,
    ) -> Result<(), StoreError> {
        let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        for index in indexes.iter().filter(|index| index.table == table) {
            let Some(key) = index.key_for(candidate) else {
                continue;
            };
            let collision = rows.iter().enumerate().any(|(position, row)| {
                Some(position) != skip && index.key_for(row).as_ref() == Some(&key)
            });
            if collision {
                return Err(StoreError::UniqueViolation {
                    table: table.to_string(),
                    index: index.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory backend. Unique indexes are registered at construction and
/// immutable afterwards.
pub struct MemoryStore {
    indexes: Vec<UniqueIndex>,
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            indexes: Vec::new(),
            inner: Mutex::new(Tables::default()),
        }
    }

    /// Register a unique index and return self (builder pattern).
    pub fn with_index(mut self, index: UniqueIndex) -> Self {
        self.indexes.push(index);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned lock only means another caller panicked; clone-swap
        // guarantees the tables are never left half-applied, so recover.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        self.lock().insert(&self.indexes, table, row)
    }

    fn update_where(
        &self,
        table: &str,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Row, StoreError> {
        self.lock().update_where(&self.indexes, table, predicate, patch)
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
        let mut guard = self.lock();
        let mut scratch = guard.clone();
        let results = scratch.apply(&self.indexes, &uow)?;
        *guard = scratch;
        debug!(ops = results.len(), "unit of work committed");
        Ok(results)
    }
}
