//! Scoped catalog store.
//!
//! # Responsibility
//! - Own exactly one SQLite connection for the duration of a unit of work.
//! - Expose the catalog operations as the crate's primary entry point.
//!
//! # Invariants
//! - The connection is released on every exit path: explicit `close`,
//!   `with_store` return (ok or error), or drop.
//! - Connections handed in via `from_connection` must already carry the
//!   catalog schema; they are never migrated.

use crate::db::migrations::current_version;
use crate::db::{open_db, open_db_in_memory};
use crate::model::author::{Author, AuthorId};
use crate::model::book::{Book, BookId, NewBook};
use crate::model::sequence::{Sequence, SequenceId};
use crate::repo::catalog_repo::{RepoError, RepoResult, SqliteCatalogRepository};
use crate::service::catalog_service::CatalogService;
use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;

/// Catalog store bound to one open connection.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Opens the catalog at `path`, creating and migrating it as needed.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a fresh in-memory catalog.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Adopts an externally managed connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the catalog
    ///   schema is incomplete.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        SqliteCatalogRepository::try_new(&conn)?;
        Ok(Self { conn })
    }

    /// Runs one unit of work against the catalog at `path`.
    ///
    /// The store is closed after `work` returns. When `work` fails its error
    /// is returned and the connection is dropped; otherwise close errors are
    /// reported.
    pub fn with_store<T, E>(
        path: impl AsRef<Path>,
        work: impl FnOnce(&CatalogStore) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let store = Self::open(path)?;
        let value = work(&store)?;
        store.close()?;
        Ok(value)
    }

    /// Closes the underlying connection, surfacing any close failure.
    pub fn close(self) -> RepoResult<()> {
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_close module=store status=ok");
                Ok(())
            }
            Err((_conn, err)) => {
                warn!("event=store_close module=store status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Schema version recorded in the open database.
    pub fn schema_version(&self) -> RepoResult<u32> {
        Ok(current_version(&self.conn)?)
    }

    /// Borrows the raw connection, e.g. for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn service(&self) -> CatalogService<SqliteCatalogRepository<'_>> {
        CatalogService::new(SqliteCatalogRepository::new(&self.conn))
    }

    pub fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.service().get_book_by_id(id)
    }

    pub fn get_author_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        self.service().get_author_by_id(id)
    }

    pub fn get_sequence_by_id(&self, id: SequenceId) -> RepoResult<Option<Sequence>> {
        self.service().get_sequence_by_id(id)
    }

    pub fn find_author(&self, first_name: &str, last_name: &str) -> RepoResult<Option<Author>> {
        self.service().find_author(first_name, last_name)
    }

    pub fn find_sequence(&self, title: &str) -> RepoResult<Option<Sequence>> {
        self.service().find_sequence(title)
    }

    pub fn get_books_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Book>> {
        self.service().get_books_by_author(author_id)
    }

    pub fn get_sequence_books(&self, sequence_id: SequenceId) -> RepoResult<Vec<Book>> {
        self.service().get_sequence_books(sequence_id)
    }

    pub fn search_by_title(&self, title: &str, author_id: Option<AuthorId>) -> RepoResult<Vec<Book>> {
        self.service().search_by_title(title, author_id)
    }

    pub fn search_authors_starting_from(&self, prefix: &str) -> RepoResult<Vec<Author>> {
        self.service().search_authors_starting_from(prefix)
    }

    pub fn add_book(&self, book: &NewBook) -> RepoResult<Book> {
        self.service().add_book(book)
    }

    pub fn add_author(&self, first_name: &str, last_name: &str) -> RepoResult<Author> {
        self.service().add_author(first_name, last_name)
    }
}
