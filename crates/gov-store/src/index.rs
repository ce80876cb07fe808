// index.rs — Unique index definitions.
//
// Backends enforce these at insert/update time, standing in for the
// relational store's unique constraints. An index may be partial (scoped
// by a predicate), and a row with a NULL in any indexed column is exempt —
// standard SQL partial-unique semantics. That combination is what carries
// the "at most one proposed suggestion per (project, trigger_key)"
// escalation dedup guarantee.

use serde_json::Value;

use crate::predicate::Predicate;
use crate::row::Row;

/// A uniqueness constraint over one table.
#[derive(Debug, Clone)]
pub struct UniqueIndex {
    /// Table the index applies to.
    pub table: String,
    /// Name reported in `StoreError::UniqueViolation`.
    pub name: String,
    /// Columns forming the unique key.
    pub columns: Vec<String>,
    /// Optional partial-index scope; rows outside it are unconstrained.
    pub filter: Option<Predicate>,
}

impl UniqueIndex {
    pub fn new(
        table: impl Into<String>,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            filter: None,
        }
    }

    /// Scope the index to rows matching `filter` (partial index).
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The index key for a row, or None if the row is exempt (outside the
    /// partial scope, or NULL in any indexed column).
    pub(crate) fn key_for(&self, row: &Row) -> Option<Vec<Value>> {
        if let Some(filter) = &self.filter {
            if !filter.matches(row) {
                return None;
            }
        }
        let mut key = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            match row.get(column) {
                Some(value) if !value.is_null() => key.push(value.clone()),
                _ => return None,
            }
        }
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn index() -> UniqueIndex {
        UniqueIndex::new(
            "suggestions",
            "uniq_proposed_trigger_key",
            ["project_id", "trigger_key"],
        )
        .with_filter(Predicate::new().eq("status", "proposed"))
    }

    #[test]
    fn key_for_covered_row() {
        let r = row(&[
            ("project_id", json!("p1")),
            ("trigger_key", json!("sla.escalation.x.7d")),
            ("status", json!("proposed")),
        ]);
        let key = index().key_for(&r).unwrap();
        assert_eq!(key, vec![json!("p1"), json!("sla.escalation.x.7d")]);
    }

    #[test]
    fn null_column_exempts_row() {
        let r = row(&[
            ("project_id", json!("p1")),
            ("trigger_key", Value::Null),
            ("status", json!("proposed")),
        ]);
        assert!(index().key_for(&r).is_none());
    }

    #[test]
    fn rows_outside_partial_scope_are_exempt() {
        let r = row(&[
            ("project_id", json!("p1")),
            ("trigger_key", json!("sla.escalation.x.7d")),
            ("status", json!("rejected")),
        ]);
        assert!(index().key_for(&r).is_none());
    }
}
