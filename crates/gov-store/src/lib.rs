//! # gov-store
//!
//! Durable-store abstraction for the governance workflow engine.
//!
//! The engine treats its persistence layer as an opaque relational
//! collaborator offering exactly three primitives — insert with uniqueness
//! constraints, conditional update, and ordered range query — plus an
//! atomic unit of work that applies several writes together or not at all.
//!
//! Rows are plain JSON objects keyed by table name, which is how the
//! backing service actually stores them. Typed models in the other crates
//! convert through [`to_row`]/[`from_row`].
//!
//! Two backends ship here: [`MemoryStore`] for tests and embedding, and
//! [`FileStore`] which persists the same table set as a single JSON
//! document for the operator CLI.

pub mod error;
pub mod file;
pub mod index;
pub mod memory;
pub mod predicate;
pub mod row;
pub mod uow;

pub use error::StoreError;
pub use file::FileStore;
pub use index::UniqueIndex;
pub use memory::MemoryStore;
pub use predicate::{Predicate, Sort};
pub use row::{from_row, to_row, Row};
pub use uow::{UnitOfWork, WriteOp};

/// The store contract the engine is written against.
///
/// Every backend must uphold:
/// - `insert` stamps a monotonically increasing `seq` column on each row
///   (the insertion-id tiebreaker for timestamp ordering) and rejects rows
///   that collide with a registered unique index.
/// - `update_where` patches the first row matching the predicate and fails
///   with [`StoreError::NoMatch`] when nothing matches.
/// - `commit` applies a [`UnitOfWork`] atomically: either every staged
///   write lands or none does.
pub trait Store: Send + Sync {
    /// Insert a row, returning it with its assigned `seq`.
    fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Patch the first row matching `predicate` with the columns in `patch`,
    /// returning the updated row.
    fn update_where(
        &self,
        table: &str,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Row, StoreError>;

    /// Return up to `limit` rows matching `predicate`, ordered by `sort`.
    fn select_where(
        &self,
        table: &str,
        predicate: &Predicate,
        sort: &[Sort],
        limit: usize,
    ) -> Result<Vec<Row>, StoreError>;

    /// Apply a unit of work atomically. Returns the resulting rows in
    /// staging order.
    fn commit(&self, uow: UnitOfWork) -> Result<Vec<Row>, StoreError>;
}
