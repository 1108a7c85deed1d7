//! Query results - forward-only cursors over records

use rusqlite::types::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: column names paired with their values, in select order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub(crate) fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.get(column), Some(Value::Null))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            match value {
                Value::Null => map.serialize_entry(name, &())?,
                Value::Integer(i) => map.serialize_entry(name, i)?,
                Value::Real(f) => map.serialize_entry(name, f)?,
                Value::Text(s) => map.serialize_entry(name, s)?,
                Value::Blob(b) => map.serialize_entry(name, b)?,
            }
        }
        map.end()
    }
}

/// Rows produced by a query.
///
/// Rows are read out of the statement before it is finalized, since a
/// statement borrows its connection. The cursor hands them out once, in
/// order; it cannot be rewound.
#[derive(Debug)]
pub struct Cursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Record>,
}

impl Cursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }

    /// Column names of the result set
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet consumed
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for Cursor {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(vec![
            ("id".to_string(), Value::Text("f1".to_string())),
            ("velocity".to_string(), Value::Real(2.5)),
            ("_id".to_string(), Value::Integer(3)),
            ("state".to_string(), Value::Null),
        ])
    }

    #[test]
    fn test_record_accessors() {
        let record = sample();
        assert_eq!(record.get_str("id"), Some("f1"));
        assert_eq!(record.get_i64("_id"), Some(3));
        assert_eq!(record.get_f64("velocity"), Some(2.5));
        assert!(record.is_null("state"));
        assert_eq!(record.get("missing"), None);
        assert_eq!(
            record.column_names().collect::<Vec<_>>(),
            ["id", "velocity", "_id", "state"]
        );
    }

    #[test]
    fn test_record_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "f1", "velocity": 2.5, "_id": 3, "state": null})
        );
    }

    #[test]
    fn test_cursor_is_forward_only() {
        let mut cursor = Cursor::new(vec!["id".to_string()], vec![sample(), sample()]);
        assert_eq!(cursor.remaining(), 2);
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_none());
        assert_eq!(cursor.remaining(), 0);
    }
}
