//! Catalog repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `book`/`author`/`sequence`/`author_book`/`book_genre` rows to
//!   hydrated domain objects.
//! - Resolve authors and sequences by natural key on write, creating rows
//!   only when no match exists.
//!
//! # Invariants
//! - Every write runs inside one `BEGIN IMMEDIATE` transaction; on error
//!   nothing is persisted.
//! - A book id that already exists is rejected with `RepoError::Conflict`.
//! - Read paths reject dangling sequence and author references instead of
//!   masking them. A `sequence_id` of `0` is a legacy "no sequence" marker.

use crate::db::DbError;
use crate::model::author::{Author, AuthorId, AuthorName};
use crate::model::book::{Book, BookId, BookValidationError, NewBook};
use crate::model::sequence::{Sequence, SequenceId};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Params, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    book_id,
    book_title,
    annotation,
    sequence_id,
    sequence_number
FROM book";

const AUTHOR_SELECT_SQL: &str = "SELECT
    author_id,
    first_name,
    last_name
FROM author";

/// Tables and columns the repository reads and writes.
const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "book",
        &[
            "book_id",
            "book_title",
            "annotation",
            "sequence_id",
            "sequence_number",
        ],
    ),
    ("author", &["author_id", "first_name", "last_name"]),
    ("sequence", &["sequence_id", "title"]),
    ("author_book", &["author_id", "book_id"]),
    ("book_genre", &["book_id", "genre"]),
];

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    /// A book with this id is already stored.
    Conflict(BookId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(id) => write!(f, "book already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog schema is missing table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "catalog schema is missing column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl RepoError {
    /// Stable short code used in structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Db(_) => "db_error",
            Self::Conflict(_) => "book_conflict",
            Self::InvalidData(_) => "invalid_data",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for the catalog.
pub trait CatalogRepository {
    /// Gets one fully hydrated book, or `None` when the id is unknown.
    fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn get_author_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn get_sequence_by_id(&self, id: SequenceId) -> RepoResult<Option<Sequence>>;
    /// Looks up an author by exact `(first_name, last_name)`.
    fn find_author(&self, name: &AuthorName) -> RepoResult<Option<Author>>;
    /// Looks up a sequence by exact title.
    fn find_sequence(&self, title: &str) -> RepoResult<Option<Sequence>>;
    fn get_books_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Book>>;
    fn get_sequence_books(&self, sequence_id: SequenceId) -> RepoResult<Vec<Book>>;
    /// Case-insensitive title search, optionally restricted to one author.
    fn search_by_title(&self, title: &str, author_id: Option<AuthorId>) -> RepoResult<Vec<Book>>;
    /// Case-insensitive last-name prefix search.
    fn search_authors_starting_from(&self, prefix: &str) -> RepoResult<Vec<Author>>;
    /// Persists a book with its sequence, authors and genres atomically.
    fn add_book(&self, book: &NewBook) -> RepoResult<BookId>;
    /// Returns the author with this natural key, inserting it when missing.
    fn add_author(&self, name: &AuthorName) -> RepoResult<Author>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Wraps a connection whose schema was already verified or migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking that the catalog schema is present.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        load_book(self.conn, id)
    }

    fn get_author_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let author = self
            .conn
            .query_row(
                &format!("{AUTHOR_SELECT_SQL} WHERE author_id = ?1;"),
                [id],
                parse_author_row,
            )
            .optional()?;
        Ok(author)
    }

    fn get_sequence_by_id(&self, id: SequenceId) -> RepoResult<Option<Sequence>> {
        load_sequence(self.conn, id)
    }

    fn find_author(&self, name: &AuthorName) -> RepoResult<Option<Author>> {
        find_author_row(self.conn, name)
    }

    fn find_sequence(&self, title: &str) -> RepoResult<Option<Sequence>> {
        find_sequence_row(self.conn, title)
    }

    fn get_books_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Book>> {
        load_books(
            self.conn,
            "SELECT DISTINCT book_id
             FROM author_book
             WHERE author_id = ?1
             ORDER BY book_id ASC;",
            [author_id],
        )
    }

    fn get_sequence_books(&self, sequence_id: SequenceId) -> RepoResult<Vec<Book>> {
        load_books(
            self.conn,
            "SELECT book_id
             FROM book
             WHERE sequence_id = ?1
             ORDER BY book_id ASC;",
            [sequence_id],
        )
    }

    fn search_by_title(&self, title: &str, author_id: Option<AuthorId>) -> RepoResult<Vec<Book>> {
        let pattern = title_pattern(title);
        match author_id {
            Some(author_id) => load_books(
                self.conn,
                "SELECT DISTINCT book.book_id
                 FROM book
                 INNER JOIN author_book ON author_book.book_id = book.book_id
                 WHERE author_book.author_id = ?1
                   AND book.book_title LIKE ?2
                 ORDER BY book.book_id ASC;",
                params![author_id, pattern],
            ),
            None => load_books(
                self.conn,
                "SELECT book_id
                 FROM book
                 WHERE book_title LIKE ?1
                 ORDER BY book_id ASC;",
                [pattern],
            ),
        }
    }

    fn search_authors_starting_from(&self, prefix: &str) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUTHOR_SELECT_SQL}
             WHERE last_name LIKE ?1
             ORDER BY last_name COLLATE NOCASE ASC, first_name COLLATE NOCASE ASC, author_id ASC;"
        ))?;
        let authors = stmt
            .query_map([last_name_prefix_pattern(prefix)], parse_author_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(authors)
    }

    fn add_book(&self, book: &NewBook) -> RepoResult<BookId> {
        book.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if book_exists(&tx, book.id)? {
            return Err(RepoError::Conflict(book.id));
        }

        let sequence_id = match book.sequence_title.as_deref() {
            Some(title) => Some(resolve_sequence(&tx, title)?),
            None => None,
        };

        tx.execute(
            "INSERT INTO book (
                book_id,
                book_title,
                annotation,
                sequence_id,
                sequence_number
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                book.id,
                book.title.as_str(),
                book.annotation.as_deref(),
                sequence_id,
                sequence_id.and(book.sequence_number),
            ],
        )?;

        // Author set semantics: one join row per distinct author.
        let mut linked = HashSet::new();
        for name in &book.authors {
            let author_id = resolve_author(&tx, name)?;
            if linked.insert(author_id) {
                tx.execute(
                    "INSERT INTO author_book (author_id, book_id) VALUES (?1, ?2);",
                    params![author_id, book.id],
                )?;
            }
        }

        for genre in &book.genres {
            tx.execute(
                "INSERT INTO book_genre (book_id, genre) VALUES (?1, ?2);",
                params![book.id, genre.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(book.id)
    }

    fn add_author(&self, name: &AuthorName) -> RepoResult<Author> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = resolve_author(&tx, name)?;
        tx.commit()?;

        Ok(Author {
            id,
            first_name: name.first_name.clone(),
            last_name: name.last_name.clone(),
        })
    }
}

/// Builds the `LIKE` pattern for title search.
///
/// Lowercases the input, turns every whitespace run into `%` and wraps the
/// result in `%`, so `"the hobbit"` becomes `"%the%hobbit%"`.
pub fn title_pattern(title: &str) -> String {
    let lowered = title.to_lowercase();
    format!("%{}%", WHITESPACE_RE.replace_all(&lowered, "%"))
}

/// Builds the `LIKE` pattern for last-name prefix search.
pub fn last_name_prefix_pattern(prefix: &str) -> String {
    format!("{}%", prefix.to_lowercase())
}

struct BookRow {
    id: BookId,
    title: String,
    annotation: Option<String>,
    sequence_id: Option<SequenceId>,
    sequence_number: Option<i64>,
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get("book_id")?,
        title: row.get("book_title")?,
        annotation: row.get("annotation")?,
        sequence_id: row.get("sequence_id")?,
        sequence_number: row.get("sequence_number")?,
    })
}

fn parse_author_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get("author_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
    })
}

fn parse_sequence_row(row: &Row<'_>) -> rusqlite::Result<Sequence> {
    Ok(Sequence {
        id: row.get("sequence_id")?,
        title: row.get("title")?,
    })
}

fn load_book(conn: &Connection, id: BookId) -> RepoResult<Option<Book>> {
    let Some(row) = conn
        .query_row(
            &format!("{BOOK_SELECT_SQL} WHERE book_id = ?1;"),
            [id],
            parse_book_row,
        )
        .optional()?
    else {
        return Ok(None);
    };

    // Older catalogs store 0 instead of NULL for books outside a sequence.
    let sequence = match row.sequence_id.filter(|&sequence_id| sequence_id != 0) {
        Some(sequence_id) => Some(load_sequence(conn, sequence_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "book {} references missing sequence {sequence_id}",
                row.id
            ))
        })?),
        None => None,
    };
    let sequence_number = sequence.as_ref().and(row.sequence_number);

    Ok(Some(Book {
        id: row.id,
        title: row.title,
        annotation: row.annotation,
        sequence,
        sequence_number,
        authors: load_book_authors(conn, row.id)?,
        genres: load_book_genres(conn, row.id)?,
    }))
}

/// Runs an id-producing query and hydrates every returned book.
fn load_books<P: Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Vec<Book>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map(params, |row| row.get::<_, BookId>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut books = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(book) = load_book(conn, id)? {
            books.push(book);
        }
    }
    Ok(books)
}

fn load_sequence(conn: &Connection, id: SequenceId) -> RepoResult<Option<Sequence>> {
    let sequence = conn
        .query_row(
            "SELECT sequence_id, title FROM sequence WHERE sequence_id = ?1;",
            [id],
            parse_sequence_row,
        )
        .optional()?;
    Ok(sequence)
}

/// Loads the linked authors of one book in join-row order.
///
/// A join row whose author is gone is reported as `InvalidData`, the same
/// as a dangling sequence reference.
fn load_book_authors(conn: &Connection, book_id: BookId) -> RepoResult<Vec<Author>> {
    let mut stmt = conn.prepare(
        "SELECT ab.author_id AS linked_id, a.author_id, a.first_name, a.last_name
         FROM author_book ab
         LEFT JOIN author a ON a.author_id = ab.author_id
         WHERE ab.book_id = ?1
         ORDER BY ab.rowid ASC;",
    )?;
    let mut rows = stmt.query([book_id])?;
    let mut authors = Vec::new();
    while let Some(row) = rows.next()? {
        if row.get::<_, Option<AuthorId>>("author_id")?.is_none() {
            let linked_id: AuthorId = row.get("linked_id")?;
            return Err(RepoError::InvalidData(format!(
                "book {book_id} references missing author {linked_id}"
            )));
        }
        authors.push(parse_author_row(row)?);
    }
    Ok(authors)
}

fn load_book_genres(conn: &Connection, book_id: BookId) -> RepoResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT genre FROM book_genre WHERE book_id = ?1 ORDER BY rowid ASC;")?;
    let mut rows = stmt.query([book_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(row.get(0)?);
    }
    Ok(genres)
}

fn find_author_row(conn: &Connection, name: &AuthorName) -> RepoResult<Option<Author>> {
    let author = conn
        .query_row(
            &format!(
                "{AUTHOR_SELECT_SQL}
                 WHERE first_name = ?1 AND last_name = ?2
                 ORDER BY author_id ASC
                 LIMIT 1;"
            ),
            params![name.first_name.as_str(), name.last_name.as_str()],
            parse_author_row,
        )
        .optional()?;
    Ok(author)
}

fn resolve_author(conn: &Connection, name: &AuthorName) -> RepoResult<AuthorId> {
    if let Some(author) = find_author_row(conn, name)? {
        return Ok(author.id);
    }

    conn.execute(
        "INSERT INTO author (first_name, last_name) VALUES (?1, ?2);",
        params![name.first_name.as_str(), name.last_name.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn find_sequence_row(conn: &Connection, title: &str) -> RepoResult<Option<Sequence>> {
    let sequence = conn
        .query_row(
            "SELECT sequence_id, title
             FROM sequence
             WHERE title = ?1
             ORDER BY sequence_id ASC
             LIMIT 1;",
            [title],
            parse_sequence_row,
        )
        .optional()?;
    Ok(sequence)
}

fn resolve_sequence(conn: &Connection, title: &str) -> RepoResult<SequenceId> {
    if let Some(sequence) = find_sequence_row(conn, title)? {
        return Ok(sequence.id);
    }

    conn.execute("INSERT INTO sequence (title) VALUES (?1);", [title])?;
    Ok(conn.last_insert_rowid())
}

fn book_exists(conn: &Connection, id: BookId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM book WHERE book_id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
