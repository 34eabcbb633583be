//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide the catalog read/search/write entry points over any
//!   `CatalogRepository`.
//! - Read written books back so callers receive store-assigned ids.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Log lines carry ids and counts only; titles and names are never logged.

use crate::model::author::{Author, AuthorId, AuthorName};
use crate::model::book::{Book, BookId, NewBook};
use crate::model::sequence::{Sequence, SequenceId};
use crate::repo::catalog_repo::{CatalogRepository, RepoError, RepoResult};
use log::{debug, error, info};
use std::time::Instant;

/// Use-case service wrapper for catalog operations.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gets one fully hydrated book; unknown ids yield `None`.
    pub fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.repo.get_book_by_id(id)
    }

    pub fn get_author_by_id(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        self.repo.get_author_by_id(id)
    }

    pub fn get_sequence_by_id(&self, id: SequenceId) -> RepoResult<Option<Sequence>> {
        self.repo.get_sequence_by_id(id)
    }

    pub fn find_author(&self, first_name: &str, last_name: &str) -> RepoResult<Option<Author>> {
        self.repo.find_author(&AuthorName::new(first_name, last_name))
    }

    pub fn find_sequence(&self, title: &str) -> RepoResult<Option<Sequence>> {
        self.repo.find_sequence(title)
    }

    pub fn get_books_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Book>> {
        self.repo.get_books_by_author(author_id)
    }

    pub fn get_sequence_books(&self, sequence_id: SequenceId) -> RepoResult<Vec<Book>> {
        self.repo.get_sequence_books(sequence_id)
    }

    /// Searches titles by case-insensitive substring.
    ///
    /// Whitespace in `title` matches any run of characters, so `"lord rings"`
    /// finds "The Lord of the Rings".
    pub fn search_by_title(&self, title: &str, author_id: Option<AuthorId>) -> RepoResult<Vec<Book>> {
        let books = self.repo.search_by_title(title, author_id)?;
        debug!(
            "event=search_title module=catalog status=ok author_filter={} hits={}",
            author_id.is_some(),
            books.len()
        );
        Ok(books)
    }

    /// Searches authors whose last name starts with `prefix`.
    pub fn search_authors_starting_from(&self, prefix: &str) -> RepoResult<Vec<Author>> {
        let authors = self.repo.search_authors_starting_from(prefix)?;
        debug!(
            "event=search_authors module=catalog status=ok hits={}",
            authors.len()
        );
        Ok(authors)
    }

    /// Persists a new book and returns it as stored.
    ///
    /// # Contract
    /// - Sequence and authors are reused by natural key or created.
    /// - Duplicate book ids fail with `RepoError::Conflict`.
    /// - On any error nothing is written.
    pub fn add_book(&self, book: &NewBook) -> RepoResult<Book> {
        let started_at = Instant::now();
        let result = self.repo.add_book(book).and_then(|id| {
            self.repo
                .get_book_by_id(id)?
                .ok_or_else(|| RepoError::InvalidData(format!("book {id} missing after insert")))
        });

        match &result {
            Ok(stored) => info!(
                "event=book_add module=catalog status=ok book_id={} sequence={} authors={} genres={} duration_ms={}",
                stored.id,
                stored.sequence.is_some(),
                stored.authors.len(),
                stored.genres.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=book_add module=catalog status=error book_id={} error_code={} duration_ms={}",
                book.id,
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }

        result
    }

    /// Returns the author with this name, inserting it when missing.
    pub fn add_author(&self, first_name: &str, last_name: &str) -> RepoResult<Author> {
        let author = self
            .repo
            .add_author(&AuthorName::new(first_name, last_name))
            .inspect_err(|err| {
                error!(
                    "event=author_add module=catalog status=error error_code={}",
                    err.code()
                );
            })?;
        info!(
            "event=author_add module=catalog status=ok author_id={}",
            author.id
        );
        Ok(author)
    }
}
