//! SQLite storage bootstrap for the catalog.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog store.
//! - Bring the catalog schema (`book`, `author`, `sequence`, `author_book`,
//!   `book_genre`) up to the latest known version.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Bootstrap never drops or rewrites tables that already exist.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or querying a catalog database.
///
/// Catalog-level problems such as a duplicate book id or a dangling
/// reference are reported by `RepoError`, not here.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement: locked or unreadable file, constraint
    /// or trigger abort, malformed SQL in a migration step.
    Sqlite(rusqlite::Error),
    /// The catalog file carries a `user_version` above the last migration
    /// step this build knows about.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "catalog schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
