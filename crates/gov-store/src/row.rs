// row.rs — Row representation and typed conversion helpers.
//
// A row is a flat JSON object, exactly what the backing service sends and
// receives. Typed models elsewhere in the workspace round-trip through
// these helpers rather than handling serde_json::Value directly.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// A stored row: column name → JSON value.
pub type Row = serde_json::Map<String, Value>;

/// Column the store stamps on every inserted row. Monotonically increasing
/// per backend instance; used as the tiebreaker when timestamps collide.
pub const SEQ_COLUMN: &str = "seq";

/// Serialize a model into a row.
///
/// Fails with [`StoreError::NotARow`] if the model serializes to anything
/// other than a JSON object (a number, string, array, ...).
pub fn to_row<T: Serialize>(model: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotARow {
            found: value_kind(&other),
        }),
    }
}

/// Deserialize a row back into a model.
///
/// Extra columns (such as the stamped `seq`) are ignored unless the model
/// declares them.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[test]
    fn to_row_and_back() {
        let widget = Widget {
            name: "lever".to_string(),
            count: 3,
        };
        let row = to_row(&widget).unwrap();
        assert_eq!(row.get("name").unwrap(), "lever");

        let restored: Widget = from_row(row).unwrap();
        assert_eq!(restored, widget);
    }

    #[test]
    fn extra_columns_are_ignored_on_read() {
        let mut row = to_row(&Widget {
            name: "lever".to_string(),
            count: 3,
        })
        .unwrap();
        row.insert(SEQ_COLUMN.to_string(), serde_json::json!(42));

        let restored: Widget = from_row(row).unwrap();
        assert_eq!(restored.count, 3);
    }

    #[test]
    fn non_object_is_rejected() {
        let result = to_row(&"just a string");
        assert!(matches!(result, Err(StoreError::NotARow { found: "string" })));
    }
}
