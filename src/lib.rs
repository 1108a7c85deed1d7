//! # Feedly Cache - local structured cache for a feed reader
//!
//! Stores feeds, categories, entries and their many-to-many associations in
//! SQLite and exposes them through resource addresses:
//! - `feeds`, `categories`, `entries` collections and their single records
//! - `feeds_by_category/<category id>` derived view
//! - `feeds_categories` and `entries_tags` association tables
//!
//! The store is disposable: a schema version mismatch wipes and recreates it.

pub mod address;
pub mod config;
pub mod contract;
pub mod cursor;
pub mod provider;
pub mod route;
pub mod storage;
pub mod ui;
pub mod values;

// Re-exports for convenient access
pub use address::ResourceAddress;
pub use contract::ConflictPolicy;
pub use cursor::{Cursor, Record};
pub use provider::{CacheProvider, Operation, QueryArgs, Request, Response, Selection};
pub use route::{Route, Router};
pub use storage::CacheStore;
pub use values::{ContentValues, IntoValue};

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Address matches no route, or the route does not permit the operation.
    #[error("Unsupported resource for {operation}: {address}")]
    UnsupportedResource { operation: &'static str, address: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The statement built from the caller's projection, selection or
    /// arguments was rejected: unknown column, bad syntax, argument count.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[source] rusqlite::Error),

    /// The store could not be opened or a statement failed inside the engine.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn unsupported(operation: &'static str, address: &ResourceAddress) -> Self {
        Error::UnsupportedResource {
            operation,
            address: address.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return Error::ConstraintViolation(err);
        }
        match err {
            rusqlite::Error::SqlInputError { .. }
            | rusqlite::Error::InvalidParameterCount(..)
            | rusqlite::Error::InvalidParameterName(_)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::InvalidColumnIndex(_) => Error::InvalidRequest(err),
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_ERROR =>
            {
                Error::InvalidRequest(err)
            }
            _ => Error::StoreUnavailable(err),
        }
    }
}
