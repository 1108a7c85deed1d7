//! Column payloads for inserts and updates

use crate::{Error, Result};
use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Conversion into a stored column value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

/// Column name to value mapping handed to insert and update.
///
/// Columns are kept sorted so generated statements are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentValues {
    values: BTreeMap<String, Value>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value
    pub fn put(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.values.insert(column.into(), value.into_value());
        self
    }

    /// Set a column to SQL NULL
    pub fn put_null(self, column: impl Into<String>) -> Self {
        self.put(column, Value::Null)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// Build values from a flat JSON object.
    ///
    /// Booleans become 0/1; nested arrays and objects are rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::InvalidPayload("payload must be a JSON object".to_string()))?;

        object
            .iter()
            .map(|(column, value)| scalar(column, value).map(|value| (column.as_str(), value)))
            .collect()
    }
}

fn scalar(column: &str, value: &serde_json::Value) -> Result<Value> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            return Err(Error::InvalidPayload(format!(
                "column {} must hold a scalar value",
                column
            )));
        }
    })
}

impl<K: Into<String>, V: IntoValue> FromIterator<(K, V)> for ContentValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_value()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_replaces() {
        let values = ContentValues::new()
            .put("title", "first")
            .put("title", "second")
            .put("velocity", 1.5)
            .put_null("author");
        assert_eq!(values.len(), 3);
        assert_eq!(values.get("author"), Some(&Value::Null));
        assert_eq!(values.get("title"), Some(&Value::Text("second".to_string())));
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({
            "id": "e1",
            "unread": false,
            "published": 1400000000000i64,
            "author": null,
        });
        let values = ContentValues::from_json(&json).unwrap();
        assert_eq!(values.get("unread"), Some(&Value::Integer(0)));
        assert_eq!(values.get("published"), Some(&Value::Integer(1400000000000)));
        assert_eq!(values.get("author"), Some(&Value::Null));
        assert_eq!(
            values.columns().collect::<Vec<_>>(),
            ["author", "id", "published", "unread"]
        );
    }

    #[test]
    fn test_collect_pairs() {
        let values: ContentValues = [("feed_id", "f1"), ("category_id", "c1")]
            .into_iter()
            .collect();
        assert_eq!(values.columns().collect::<Vec<_>>(), ["category_id", "feed_id"]);
    }

    #[test]
    fn test_from_json_rejects_nested() {
        assert!(ContentValues::from_json(&serde_json::json!({"tags": ["a"]})).is_err());
        assert!(ContentValues::from_json(&serde_json::json!("feeds")).is_err());
    }
}
