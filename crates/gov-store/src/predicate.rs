// predicate.rs — Row filters and sort orders.
//
// A Predicate is a conjunction of simple column filters — the shape of a
// filtered query against the backing service. There is deliberately no OR:
// callers that need a union (e.g. global-or-project trigger scope) issue
// two selects or filter in code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::row::Row;

/// A single column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    Eq { column: String, value: Value },
    Ne { column: String, value: Value },
    Lt { column: String, value: Value },
    Gt { column: String, value: Value },
    IsNull { column: String },
    NotNull { column: String },
}

/// A conjunction of filters. An empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    filters: Vec<Filter>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn ne(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Ne {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn lt(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Lt {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn gt(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gt {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push(Filter::IsNull {
            column: column.into(),
        });
        self
    }

    pub fn not_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push(Filter::NotNull {
            column: column.into(),
        });
        self
    }

    /// Does this predicate match the given row?
    ///
    /// A missing column is treated as NULL.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }
}

impl Filter {
    fn matches(&self, row: &Row) -> bool {
        let null = Value::Null;
        match self {
            Filter::Eq { column, value } => row.get(column).unwrap_or(&null) == value,
            Filter::Ne { column, value } => row.get(column).unwrap_or(&null) != value,
            Filter::Lt { column, value } => {
                matches!(
                    compare_values(row.get(column).unwrap_or(&null), value),
                    Some(Ordering::Less)
                )
            }
            Filter::Gt { column, value } => {
                matches!(
                    compare_values(row.get(column).unwrap_or(&null), value),
                    Some(Ordering::Greater)
                )
            }
            Filter::IsNull { column } => row.get(column).unwrap_or(&null).is_null(),
            Filter::NotNull { column } => !row.get(column).unwrap_or(&null).is_null(),
        }
    }
}

/// One sort key. Selects take an ordered list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub column: String,
    pub descending: bool,
}

impl Sort {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Stable-sort rows by a list of sort keys.
pub(crate) fn sort_rows(rows: &mut [Row], sorts: &[Sort]) {
    rows.sort_by(|a, b| {
        for sort in sorts {
            let null = Value::Null;
            let left = a.get(&sort.column).unwrap_or(&null);
            let right = b.get(&sort.column).unwrap_or(&null);
            let ordering = compare_values(left, right).unwrap_or(Ordering::Equal);
            let ordering = if sort.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Order two JSON values.
///
/// Numbers compare numerically. Strings that both parse as RFC 3339
/// timestamps compare chronologically — mixed subsecond precision would
/// otherwise misorder lexicographically ("…00.123456789Z" sorts before
/// "…00.123Z" as text). Other strings compare lexicographically.
/// Incomparable kinds return None.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            if let (Some(tx), Some(ty)) = (parse_timestamp(x), parse_timestamp(y)) {
                Some(tx.cmp(&ty))
            } else {
                Some(x.cmp(y))
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
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

    #[test]
    fn empty_predicate_matches_everything() {
        let r = row(&[("a", json!(1))]);
        assert!(Predicate::new().matches(&r));
    }

    #[test]
    fn eq_and_ne() {
        let r = row(&[("status", json!("proposed"))]);
        assert!(Predicate::new().eq("status", "proposed").matches(&r));
        assert!(!Predicate::new().eq("status", "applied").matches(&r));
        assert!(Predicate::new().ne("status", "applied").matches(&r));
    }

    #[test]
    fn missing_column_is_null() {
        let r = row(&[("a", json!(1))]);
        assert!(Predicate::new().is_null("trigger_key").matches(&r));
        assert!(!Predicate::new().not_null("trigger_key").matches(&r));
    }

    #[test]
    fn explicit_null_is_null() {
        let r = row(&[("trigger_key", Value::Null)]);
        assert!(Predicate::new().is_null("trigger_key").matches(&r));
    }

    #[test]
    fn numeric_comparison() {
        let r = row(&[("count", json!(5))]);
        assert!(Predicate::new().lt("count", 10).matches(&r));
        assert!(Predicate::new().gt("count", 1).matches(&r));
        assert!(!Predicate::new().lt("count", 5).matches(&r));
    }

    #[test]
    fn timestamps_compare_chronologically_across_precisions() {
        // Lexicographic comparison would order these the wrong way round:
        // '.' < 'Z' as bytes, yet .123456789 is later than .123.
        let early = row(&[("created_at", json!("2026-01-01T00:00:00.123Z"))]);
        assert!(Predicate::new()
            .lt("created_at", "2026-01-01T00:00:00.123456789Z")
            .matches(&early));
    }

    #[test]
    fn sort_rows_orders_and_breaks_ties() {
        let mut rows = vec![
            row(&[("created_at", json!("2026-01-02T00:00:00Z")), ("seq", json!(1))]),
            row(&[("created_at", json!("2026-01-01T00:00:00Z")), ("seq", json!(3))]),
            row(&[("created_at", json!("2026-01-01T00:00:00Z")), ("seq", json!(2))]),
        ];
        sort_rows(&mut rows, &[Sort::asc("created_at"), Sort::asc("seq")]);
        assert_eq!(rows[0].get("seq").unwrap(), &json!(2));
        assert_eq!(rows[1].get("seq").unwrap(), &json!(3));
        assert_eq!(rows[2].get("seq").unwrap(), &json!(1));
    }

    #[test]
    fn conjunction_requires_all_filters() {
        let r = row(&[("status", json!("proposed")), ("project_id", json!("p1"))]);
        assert!(Predicate::new()
            .eq("status", "proposed")
            .eq("project_id", "p1")
            .matches(&r));
        assert!(!Predicate::new()
            .eq("status", "proposed")
            .eq("project_id", "p2")
            .matches(&r));
    }
}
