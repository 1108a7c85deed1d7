//! Database schema definitions and lifecycle
//!
//! The cache is disposable: there are no migrations. A version mismatch drops
//! every managed relation and creates them again.

use rusqlite::Connection;

/// Schema version the code expects, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 13;

/// SQL to create the feeds table
pub const CREATE_FEEDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS feeds (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT,
    url TEXT,
    website TEXT,
    icon_url TEXT,
    velocity REAL,
    subscribers INTEGER,
    updated INTEGER,
    state TEXT
)
"#;

/// SQL to create the categories table
pub const CREATE_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY NOT NULL,
    label TEXT
)
"#;

/// SQL to create the entries table
pub const CREATE_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY NOT NULL,
    origin_id TEXT,
    title TEXT,
    author TEXT,
    url TEXT,
    published INTEGER,
    crawled INTEGER,
    updated INTEGER,
    content TEXT,
    summary TEXT,
    unread INTEGER NOT NULL DEFAULT 1,
    starred INTEGER NOT NULL DEFAULT 0
)
"#;

/// SQL to create the feed/category association table
pub const CREATE_FEEDS_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS feeds_categories (
    feed_id TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    UNIQUE(feed_id, category_id)
)
"#;

/// SQL to create the entry/tag association table
pub const CREATE_ENTRIES_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries_tags (
    entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    tag TEXT NOT NULL,
    UNIQUE(entry_id, tag)
)
"#;

/// SQL to create the derived feeds-by-category view.
/// Views have no rowid, so the feed's rowid is carried as `feed_rowid`.
pub const CREATE_FEEDS_BY_CATEGORY_VIEW: &str = r#"
CREATE VIEW IF NOT EXISTS feeds_by_category AS
SELECT feeds.*, feeds.rowid AS feed_rowid, feeds_categories.category_id AS category_id
FROM feeds
JOIN feeds_categories ON feeds_categories.feed_id = feeds.id
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_feeds_categories_category ON feeds_categories(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_entries_tags_tag ON entries_tags(tag)",
    "CREATE INDEX IF NOT EXISTS idx_entries_origin ON entries(origin_id)",
    "CREATE INDEX IF NOT EXISTS idx_entries_published ON entries(published DESC)",
];

/// Drop statements, children before parents
pub const DROP_ALL: &[&str] = &[
    "DROP VIEW IF EXISTS feeds_by_category",
    "DROP TABLE IF EXISTS entries_tags",
    "DROP TABLE IF EXISTS feeds_categories",
    "DROP TABLE IF EXISTS entries",
    "DROP TABLE IF EXISTS categories",
    "DROP TABLE IF EXISTS feeds",
];

/// Tables managed by the cache, parents first
pub const TABLES: &[&str] = &[
    crate::contract::feeds::TABLE,
    crate::contract::categories::TABLE,
    crate::contract::entries::TABLE,
    crate::contract::feeds_categories::TABLE,
    crate::contract::entries_tags::TABLE,
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_FEEDS_TABLE,
        CREATE_CATEGORIES_TABLE,
        CREATE_ENTRIES_TABLE,
        CREATE_FEEDS_CATEGORIES_TABLE,
        CREATE_ENTRIES_TAGS_TABLE,
        CREATE_FEEDS_BY_CATEGORY_VIEW,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Per-connection settings. Foreign key enforcement is not persisted by
/// SQLite, so every new connection needs this before any other statement.
pub fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)
}

/// Whether foreign key enforcement is active on this connection
pub fn foreign_keys_enabled(conn: &Connection) -> rusqlite::Result<bool> {
    conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))
}

/// Create every table, the view and indexes if missing
pub fn create(conn: &Connection) -> rusqlite::Result<()> {
    tracing::info!("Creating cache schema");
    for stmt in all_schema_statements() {
        conn.execute(stmt, [])?;
    }
    Ok(())
}

/// Drop every managed relation
pub fn drop_all(conn: &Connection) -> rusqlite::Result<()> {
    for stmt in DROP_ALL {
        conn.execute(stmt, [])?;
    }
    Ok(())
}

/// Replace the schema wholesale. All cached rows are lost.
pub fn upgrade(conn: &Connection, from: i32, to: i32) -> rusqlite::Result<()> {
    tracing::warn!(from, to, "Upgrading cache schema; wiping cached data");
    drop_all(conn)?;
    create(conn)
}

/// Version recorded in the database file, 0 for a fresh file
pub fn user_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

pub fn set_user_version(conn: &Connection, version: i32) -> rusqlite::Result<()> {
    conn.pragma_update(None, "user_version", version)
}

/// Bring the schema to `expected`, creating or upgrading as needed.
///
/// Runs in one transaction so a failure leaves the previous schema intact.
pub fn ensure_version(conn: &Connection, expected: i32) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    let current = user_version(&tx)?;
    if current == 0 {
        create(&tx)?;
    } else if current != expected {
        upgrade(&tx, current, expected)?;
    } else {
        return tx.commit();
    }
    set_user_version(&tx, expected)?;
    tx.commit()
}
