//! Provider - executes resource-addressed operations against the store
//!
//! A request names an address and one of four operations:
//! - `Query`: projection, selection and sort order; yields a cursor
//! - `Insert`: column values; yields the address of the new row
//! - `Update`: column values and a selection; yields the affected count
//! - `Delete`: a selection; yields the affected count

pub mod executor;

pub use executor::CacheProvider;

use crate::address::ResourceAddress;
use crate::cursor::Cursor;
use crate::values::ContentValues;

/// Row filter: a predicate with positional `?` placeholders and its arguments.
///
/// An empty selection matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub clause: Option<String>,
    pub args: Vec<String>,
}

impl Selection {
    /// Match every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, S>(clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clause: Some(clause.into()),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The predicate, if it has any content
    pub fn clause(&self) -> Option<&str> {
        self.clause
            .as_deref()
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
    }

    /// Append ` WHERE <clause>` to a statement when there is a predicate
    pub(crate) fn append_to(&self, sql: &mut String) {
        if let Some(clause) = self.clause() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
    }
}

/// Arguments of a query operation.
///
/// An empty projection selects every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pub projection: Vec<String>,
    pub selection: Selection,
    pub sort_order: Option<String>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn sort_order(mut self, sort_order: impl Into<String>) -> Self {
        self.sort_order = Some(sort_order.into());
        self
    }
}

/// The operation carried by a request
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Query(QueryArgs),
    Insert(ContentValues),
    Update(ContentValues, Selection),
    Delete(Selection),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Query(_) => "query",
            Operation::Insert(_) => "insert",
            Operation::Update(..) => "update",
            Operation::Delete(_) => "delete",
        }
    }
}

/// An address paired with the operation to run on it
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub address: ResourceAddress,
    pub operation: Operation,
}

impl Request {
    pub fn new(address: ResourceAddress, operation: Operation) -> Self {
        Self { address, operation }
    }
}

/// Outcome of an executed request
#[derive(Debug)]
pub enum Response {
    /// Query result rows
    Rows(Cursor),
    /// Query against the root address
    Empty,
    /// Address of the inserted row
    Inserted(ResourceAddress),
    /// Rows touched by an update or delete
    Affected(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_clause() {
        assert_eq!(Selection::all().clause(), None);
        assert_eq!(Selection::new("  ", Vec::<String>::new()).clause(), None);
        assert_eq!(Selection::new(" id = ? ", ["f1"]).clause(), Some("id = ?"));

        let mut sql = String::from("DELETE FROM feeds");
        Selection::new("id = ?", ["f1"]).append_to(&mut sql);
        assert_eq!(sql, "DELETE FROM feeds WHERE id = ?");
    }

    #[test]
    fn test_query_args_builder() {
        let args = QueryArgs::new()
            .projection(["id", "title"])
            .selection(Selection::new("title LIKE ?", ["%rust%"]))
            .sort_order("title");
        assert_eq!(args.projection, ["id", "title"]);
        assert_eq!(args.selection.args, ["%rust%"]);
        assert_eq!(args.sort_order.as_deref(), Some("title"));
    }
}
