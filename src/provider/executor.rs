//! Operation executor
//!
//! Resolves each address once and dispatches on the route:
//! - single records take the caller's projection and selection verbatim
//! - collections drop the caller's selection, keep its sort order and gain `_id`
//! - `feeds_by_category/<id>` filters on the category from the path
//! - inserts use the conflict policy owned by the route

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::{Operation, QueryArgs, Request, Response, Selection};
use crate::address::ResourceAddress;
use crate::contract::{
    self, categories, entries, entries_tags, feeds, feeds_by_category, feeds_categories,
    ConflictPolicy,
};
use crate::cursor::{Cursor, Record};
use crate::route::{Route, Router};
use crate::storage::CacheStore;
use crate::values::ContentValues;
use crate::{Error, Result};

/// Executes requests against a borrowed store
pub struct CacheProvider<'a> {
    store: &'a CacheStore,
    router: Router,
}

impl<'a> CacheProvider<'a> {
    /// Create a provider answering for the default authority
    pub fn new(store: &'a CacheStore) -> Self {
        Self::with_router(store, Router::default())
    }

    pub fn with_router(store: &'a CacheStore, router: Router) -> Self {
        Self { store, router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run a request and wrap its outcome
    pub fn execute(&self, request: &Request) -> Result<Response> {
        let address = &request.address;
        tracing::debug!("execute {} on {}", request.operation.name(), address);
        match &request.operation {
            Operation::Query(args) => Ok(match self.query(address, args)? {
                Some(cursor) => Response::Rows(cursor),
                None => Response::Empty,
            }),
            Operation::Insert(values) => Ok(Response::Inserted(self.insert(address, values)?)),
            Operation::Update(values, selection) => {
                Ok(Response::Affected(self.update(address, values, selection)?))
            }
            Operation::Delete(selection) => Ok(Response::Affected(self.delete(address, selection)?)),
        }
    }

    /// Query rows behind an address.
    ///
    /// Returns `Ok(None)` for the root address.
    pub fn query(&self, address: &ResourceAddress, args: &QueryArgs) -> Result<Option<Cursor>> {
        let route = self.router.resolve(address);
        let plan = match &route {
            Route::SingleEntry => QueryPlan::single(entries::TABLE, args),
            Route::SingleFeed => QueryPlan::single(feeds::TABLE, args),
            Route::SingleCategory => QueryPlan::single(categories::TABLE, args),
            Route::EntryCollection => QueryPlan::collection(entries::TABLE, args),
            Route::FeedCollection => QueryPlan::collection(feeds::TABLE, args),
            Route::CategoryCollection => QueryPlan::collection(categories::TABLE, args),
            Route::FeedsByCategory(category_id) => QueryPlan::by_category(category_id, args),
            Route::Root => return Ok(None),
            Route::FeedsCategories | Route::EntriesTags | Route::Unmatched => {
                return Err(Error::unsupported("query", address));
            }
        };

        let sql = plan.to_sql();
        tracing::debug!("query {}: {}", route.name(), sql);

        let conn = self.store.connection();
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt
            .query_map(params_from_iter(plan.selection.args.iter()), |row| {
                let mut values = Vec::with_capacity(columns.len());
                for (i, name) in columns.iter().enumerate() {
                    values.push((name.clone(), row.get::<_, Value>(i)?));
                }
                Ok(Record::new(values))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(Cursor::new(columns, rows)))
    }

    /// Insert one row; returns the address with the new row id appended.
    ///
    /// A duplicate association yields [`contract::IGNORED_ROW_ID`] as the id.
    pub fn insert(&self, address: &ResourceAddress, values: &ContentValues) -> Result<ResourceAddress> {
        let route = self.router.resolve(address);
        let (table, policy) =
            insert_target(&route).ok_or_else(|| Error::unsupported("insert", address))?;

        let row_id = insert_row(self.store.connection(), table, policy, values)?;
        Ok(address.with_appended_id(row_id))
    }

    /// Insert many rows in one transaction.
    ///
    /// Returns how many rows were written; ignored duplicates are not counted.
    /// Any failure rolls back the whole batch.
    pub fn bulk_insert(&self, address: &ResourceAddress, rows: &[ContentValues]) -> Result<usize> {
        let route = self.router.resolve(address);
        let (table, policy) =
            insert_target(&route).ok_or_else(|| Error::unsupported("insert", address))?;

        let tx = self.store.connection().unchecked_transaction()?;
        let mut written = 0;
        for values in rows {
            if insert_row(&tx, table, policy, values)? != contract::IGNORED_ROW_ID {
                written += 1;
            }
        }
        tx.commit()?;

        tracing::debug!("bulk insert {}: {} of {} rows", route.name(), written, rows.len());
        Ok(written)
    }

    /// Update rows matching `selection`; an empty selection updates every row
    pub fn update(
        &self,
        address: &ResourceAddress,
        values: &ContentValues,
        selection: &Selection,
    ) -> Result<usize> {
        let route = self.router.resolve(address);
        let table = update_target(&route).ok_or_else(|| Error::unsupported("update", address))?;
        if values.is_empty() {
            return Err(Error::InvalidPayload(format!(
                "update of {} sets no columns",
                address
            )));
        }

        let assignments = values
            .columns()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {}", table, assignments);
        selection.append_to(&mut sql);
        tracing::debug!("update {}: {}", route.name(), sql);

        let params = values
            .values()
            .cloned()
            .chain(selection.args.iter().cloned().map(Value::Text));
        Ok(self.store.connection().execute(&sql, params_from_iter(params))?)
    }

    /// Delete rows matching `selection`; an empty selection deletes every row
    pub fn delete(&self, address: &ResourceAddress, selection: &Selection) -> Result<usize> {
        let route = self.router.resolve(address);
        let table = delete_target(&route).ok_or_else(|| Error::unsupported("delete", address))?;

        let mut sql = format!("DELETE FROM {}", table);
        selection.append_to(&mut sql);
        tracing::debug!("delete {}: {}", route.name(), sql);

        Ok(self
            .store
            .connection()
            .execute(&sql, params_from_iter(selection.args.iter()))?)
    }

    /// Content type of an address. The cache declares none.
    pub fn get_type(&self, _address: &ResourceAddress) -> Option<&'static str> {
        None
    }
}

/// Resolved form of a query: what to select, from where, filtered how
struct QueryPlan {
    relation: &'static str,
    columns: String,
    selection: Selection,
    sort_order: Option<String>,
}

impl QueryPlan {
    fn single(table: &'static str, args: &QueryArgs) -> Self {
        Self {
            relation: table,
            columns: merge_projection(&args.projection, &[]),
            selection: args.selection.clone(),
            sort_order: None,
        }
    }

    fn collection(table: &'static str, args: &QueryArgs) -> Self {
        Self {
            relation: table,
            columns: merge_projection(&args.projection, &[("rowid", contract::SYNTHETIC_ID)]),
            selection: Selection::all(),
            sort_order: args.sort_order.clone(),
        }
    }

    fn by_category(category_id: &str, args: &QueryArgs) -> Self {
        // `*` over the view would also pull in its join columns
        let projection = if args.projection.is_empty() {
            feeds::COLUMNS.iter().map(|column| column.to_string()).collect()
        } else {
            args.projection.clone()
        };
        Self {
            relation: feeds_by_category::VIEW,
            columns: merge_projection(
                &projection,
                &[
                    (feeds_by_category::FEED_ROWID, contract::SYNTHETIC_ID),
                    (feeds_by_category::CATEGORY_ID, feeds_by_category::CATEGORY_ID),
                ],
            ),
            selection: Selection::new(
                format!("{} = ?", feeds_by_category::CATEGORY_ID),
                [category_id],
            ),
            sort_order: None,
        }
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.relation);
        self.selection.append_to(&mut sql);
        if let Some(sort_order) = self.sort_order.as_deref().map(str::trim) {
            if !sort_order.is_empty() {
                sql.push_str(" ORDER BY ");
                sql.push_str(sort_order);
            }
        }
        sql
    }
}

/// Caller projection plus injected `(source, alias)` columns not already
/// requested. A caller column named like an alias selects its source.
/// An empty projection selects every column.
fn merge_projection(projection: &[String], injected: &[(&str, &str)]) -> String {
    let mut columns: Vec<String> = if projection.is_empty() {
        vec!["*".to_string()]
    } else {
        projection
            .iter()
            .map(|column| {
                match injected.iter().find(|(_, alias)| *alias == column.as_str()) {
                    Some((source, alias)) => aliased(source, alias),
                    None => column.clone(),
                }
            })
            .collect()
    };
    for (source, alias) in injected {
        let column = aliased(source, alias);
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    columns.join(", ")
}

fn aliased(source: &str, alias: &str) -> String {
    if source == alias {
        alias.to_string()
    } else {
        format!("{} AS {}", source, alias)
    }
}

fn insert_target(route: &Route) -> Option<(&'static str, ConflictPolicy)> {
    let policy = route.conflict_policy()?;
    Some((route.relation()?, policy))
}

fn update_target(route: &Route) -> Option<&'static str> {
    match route {
        Route::EntryCollection => Some(entries::TABLE),
        Route::FeedCollection => Some(feeds::TABLE),
        Route::CategoryCollection => Some(categories::TABLE),
        Route::SingleEntry
        | Route::SingleFeed
        | Route::FeedsByCategory(_)
        | Route::SingleCategory
        | Route::FeedsCategories
        | Route::EntriesTags
        | Route::Root
        | Route::Unmatched => None,
    }
}

fn delete_target(route: &Route) -> Option<&'static str> {
    match route {
        Route::EntryCollection => Some(entries::TABLE),
        Route::FeedCollection => Some(feeds::TABLE),
        Route::CategoryCollection => Some(categories::TABLE),
        Route::FeedsCategories => Some(feeds_categories::TABLE),
        Route::EntriesTags => Some(entries_tags::TABLE),
        Route::SingleEntry
        | Route::SingleFeed
        | Route::FeedsByCategory(_)
        | Route::SingleCategory
        | Route::Root
        | Route::Unmatched => None,
    }
}

/// Write one row under `policy`; returns its rowid or the ignored sentinel
fn insert_row(
    conn: &Connection,
    table: &str,
    policy: ConflictPolicy,
    values: &ContentValues,
) -> Result<i64> {
    let sql = if values.is_empty() {
        format!("INSERT {} INTO {} DEFAULT VALUES", policy.as_sql(), table)
    } else {
        let columns = values.columns().collect::<Vec<_>>().join(", ");
        let placeholders = vec!["?"; values.len()].join(", ");
        format!(
            "INSERT {} INTO {} ({}) VALUES ({})",
            policy.as_sql(),
            table,
            columns,
            placeholders
        )
    };
    tracing::debug!("insert: {}", sql);

    let changed = conn.execute(&sql, params_from_iter(values.values()))?;
    if changed == 0 {
        Ok(contract::IGNORED_ROW_ID)
    } else {
        Ok(conn.last_insert_rowid())
    }
}
