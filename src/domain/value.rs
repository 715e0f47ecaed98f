use indexmap::IndexMap;
use serde_json::Value;

/// Scalar content of one table cell.
///
/// `Null` is the canonical cleared value: it is what a cell holds before the
/// user ever touched it, and what reconciliation forces a cell back to while
/// its column's disabled predicate is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellValue {
    #[default]
    Null,
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Null, or text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Text(text) => Value::String(text.clone()),
            CellValue::Bool(flag) => Value::Bool(*flag),
        }
    }

    /// Lossy import used when seeding rows from a document. Numbers become
    /// their text form; arrays and objects collapse to `Null`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(flag) => CellValue::Bool(*flag),
            Value::String(text) => CellValue::Text(text.clone()),
            Value::Number(num) => CellValue::Text(num.to_string()),
            Value::Array(_) | Value::Object(_) => CellValue::Null,
        }
    }
}

/// Read-only view of one row's current values, as handed to disabled
/// predicates.
///
/// Fields the row has not committed yet read as `Null`, so predicates must
/// tolerate (and typically treat as blank) a row with no data at all.
#[derive(Debug, Clone, Copy)]
pub struct RowValues<'a> {
    values: Option<&'a IndexMap<String, CellValue>>,
}

impl<'a> RowValues<'a> {
    pub fn new(values: &'a IndexMap<String, CellValue>) -> Self {
        Self {
            values: Some(values),
        }
    }

    /// View over a row that has no committed values yet.
    pub fn empty() -> Self {
        Self { values: None }
    }

    pub fn get(&self, field: &str) -> &'a CellValue {
        self.values
            .and_then(|map| map.get(field))
            .unwrap_or(&CellValue::Null)
    }

    /// The field's text, or `""` when it holds anything but text.
    pub fn text(&self, field: &str) -> &'a str {
        self.get(field).as_text().unwrap_or("")
    }

    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).is_blank()
    }

    pub fn is_true(&self, field: &str) -> bool {
        self.get(field).as_bool().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blankness_covers_null_and_whitespace() {
        assert!(CellValue::Null.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text("x").is_blank());
        assert!(!CellValue::Bool(false).is_blank());
    }

    #[test]
    fn json_round_trip_keeps_scalars() {
        assert_eq!(CellValue::from_json(&json!("dev")).to_json(), json!("dev"));
        assert_eq!(CellValue::from_json(&json!(true)).to_json(), json!(true));
        assert_eq!(CellValue::from_json(&json!(null)).to_json(), json!(null));
        assert_eq!(CellValue::from_json(&json!(8080)), CellValue::text("8080"));
        assert_eq!(CellValue::from_json(&json!([1, 2])), CellValue::Null);
    }

    #[test]
    fn missing_fields_read_as_null() {
        let empty = RowValues::empty();
        assert!(empty.get("name").is_null());
        assert_eq!(empty.text("name"), "");
        assert!(empty.is_blank("name"));

        let mut map = IndexMap::new();
        map.insert("name".to_string(), CellValue::text("api"));
        let row = RowValues::new(&map);
        assert_eq!(row.text("name"), "api");
        assert!(row.is_blank("role"));
        assert!(!row.is_true("role"));
    }
}
