// uow.rs — Unit of work: a batch of writes that land together or not at all.
//
// The state machine's invariant is that a status update and its audit
// append are one logical operation. Rather than two independent store
// calls, callers stage both into a UnitOfWork and commit once; backends
// validate every op before applying any.

use crate::predicate::Predicate;
use crate::row::Row;

/// One staged write.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Insert {
        table: String,
        row: Row,
    },
    UpdateWhere {
        table: String,
        predicate: Predicate,
        patch: Row,
    },
}

/// An ordered batch of writes committed atomically via [`crate::Store::commit`].
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    ops: Vec<WriteOp>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an insert and return self (builder pattern).
    pub fn insert(mut self, table: impl Into<String>, row: Row) -> Self {
        self.ops.push(WriteOp::Insert {
            table: table.into(),
            row,
        });
        self
    }

    /// Stage a conditional update and return self.
    pub fn update_where(
        mut self,
        table: impl Into<String>,
        predicate: Predicate,
        patch: Row,
    ) -> Self {
        self.ops.push(WriteOp::UpdateWhere {
            table: table.into(),
            predicate,
            patch,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}
