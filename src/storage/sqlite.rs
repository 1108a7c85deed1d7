//! SQLite store handle

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::Connection;

use super::schema;
use crate::{Error, Result};

static MEMORY_STORES: AtomicUsize = AtomicUsize::new(0);

/// Owned handle to the cache database.
///
/// Every connection it hands out has foreign key enforcement switched on and
/// the schema at the expected version.
pub struct CacheStore {
    conn: Connection,
    location: String,
    path: Option<PathBuf>,
}

impl CacheStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_version(path, schema::SCHEMA_VERSION)
    }

    /// Open a database file expecting a specific schema version.
    ///
    /// A different version on disk wipes the store.
    pub fn open_with_version(path: &Path, version: i32) -> Result<Self> {
        tracing::info!("Opening cache store at {}", path.display());
        let location = path.to_string_lossy().into_owned();
        let store = Self {
            conn: open_connection(&location)?,
            location,
            path: Some(path.to_path_buf()),
        };
        store.initialize_schema(version)?;
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    ///
    /// Uses a named shared-cache database so [`CacheStore::connect`] reaches
    /// the same data while this handle is alive.
    pub fn open_in_memory() -> Result<Self> {
        let n = MEMORY_STORES.fetch_add(1, Ordering::Relaxed);
        let location = format!("file:feedly-cache-{}?mode=memory&cache=shared", n);
        let store = Self {
            conn: open_connection(&location)?,
            location,
            path: None,
        };
        store.initialize_schema(schema::SCHEMA_VERSION)?;
        Ok(store)
    }

    fn initialize_schema(&self, version: i32) -> Result<()> {
        schema::ensure_version(&self.conn, version)?;
        Ok(())
    }

    /// Open another handle on the same database, for use on another thread.
    ///
    /// The schema is already in place, so only the per-connection settings
    /// are applied.
    pub fn connect(&self) -> Result<Self> {
        Ok(Self {
            conn: open_connection(&self.location)?,
            location: self.location.clone(),
            path: self.path.clone(),
        })
    }

    /// Connection owned by this handle
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// File backing the store, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Schema version recorded in the database
    pub fn version(&self) -> Result<i32> {
        Ok(schema::user_version(&self.conn)?)
    }

    /// Drop and recreate every table, keeping the schema version
    pub fn wipe(&self) -> Result<()> {
        tracing::warn!("Wiping cache store");
        let tx = self.conn.unchecked_transaction()?;
        schema::drop_all(&tx)?;
        schema::create(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Row counts per table
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            feeds: self.count(crate::contract::feeds::TABLE)?,
            categories: self.count(crate::contract::categories::TABLE)?,
            entries: self.count(crate::contract::entries::TABLE)?,
            feeds_categories: self.count(crate::contract::feeds_categories::TABLE)?,
            entries_tags: self.count(crate::contract::entries_tags::TABLE)?,
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Open a connection and apply per-connection settings before anything else
fn open_connection(location: &str) -> Result<Connection> {
    let conn = Connection::open(location).map_err(Error::StoreUnavailable)?;
    schema::configure(&conn).map_err(Error::StoreUnavailable)?;
    Ok(conn)
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub feeds: usize,
    pub categories: usize,
    pub entries: usize,
    pub feeds_categories: usize,
    pub entries_tags: usize,
}

impl DbStats {
    /// Label/count pairs in table order
    pub fn rows(&self) -> [(&'static str, usize); 5] {
        [
            ("Feeds", self.feeds),
            ("Categories", self.categories),
            ("Entries", self.entries),
            ("Feed categories", self.feeds_categories),
            ("Entry tags", self.entries_tags),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        for (label, count) in self.rows() {
            writeln!(f, "  {}: {}", label, count)?;
        }
        Ok(())
    }
}
