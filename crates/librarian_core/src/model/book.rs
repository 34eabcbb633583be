//! Book domain models.
//!
//! # Responsibility
//! - `Book`: fully hydrated read model returned by lookups and searches.
//! - `NewBook`: write model accepted by `add_book`.
//!
//! # Invariants
//! - `Book::id` is supplied by the caller and must be unique in the store.
//! - `sequence_number` is only meaningful when a sequence is present; a
//!   hydrated `Book` without a sequence always has `sequence_number == None`.
//! - Genre tags are raw strings; duplicates per book are allowed.

use crate::model::author::{Author, AuthorName};
use crate::model::sequence::Sequence;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-assigned book identifier.
pub type BookId = i64;

/// Fully hydrated catalog book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Free-text annotation, nullable in storage.
    pub annotation: Option<String>,
    pub sequence: Option<Sequence>,
    /// Position within `sequence`.
    pub sequence_number: Option<i64>,
    /// Authors in join-row insertion order.
    pub authors: Vec<Author>,
    /// Genre tags in insertion order.
    pub genres: Vec<String>,
}

impl Book {
    /// Returns the sequence title, if the book belongs to one.
    pub fn sequence_title(&self) -> Option<&str> {
        self.sequence.as_ref().map(|sequence| sequence.title.as_str())
    }
}

/// Validation errors for book write input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptySequenceTitle,
    /// `sequence_number` was set without a sequence title.
    SequenceNumberWithoutSequence,
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySequenceTitle => write!(f, "sequence title cannot be empty"),
            Self::SequenceNumberWithoutSequence => {
                write!(f, "sequence_number requires a sequence title")
            }
        }
    }
}

impl Error for BookValidationError {}

/// Write model for inserting one book with its relations.
///
/// Authors and the sequence are given by natural key; the store resolves
/// them to existing rows or creates new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub id: BookId,
    pub title: String,
    pub annotation: Option<String>,
    pub sequence_title: Option<String>,
    pub sequence_number: Option<i64>,
    pub authors: Vec<AuthorName>,
    pub genres: Vec<String>,
}

impl NewBook {
    /// Creates a book with no annotation, sequence, authors or genres.
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            annotation: None,
            sequence_title: None,
            sequence_number: None,
            authors: Vec::new(),
            genres: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Places the book in the named sequence at the given position.
    pub fn with_sequence(mut self, title: impl Into<String>, number: Option<i64>) -> Self {
        self.sequence_title = Some(title.into());
        self.sequence_number = number;
        self
    }

    pub fn with_author(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.authors.push(AuthorName::new(first_name, last_name));
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.push(genre.into());
        self
    }

    /// Checks the sequence fields before any SQL is issued.
    ///
    /// Titles, author names and genre tags are stored as given, empty
    /// strings included.
    ///
    /// # Errors
    /// - `EmptySequenceTitle` when a sequence title is present but blank.
    /// - `SequenceNumberWithoutSequence` when a number is given alone.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        match self.sequence_title.as_deref() {
            Some(title) if title.trim().is_empty() => Err(BookValidationError::EmptySequenceTitle),
            None if self.sequence_number.is_some() => {
                Err(BookValidationError::SequenceNumberWithoutSequence)
            }
            _ => Ok(()),
        }
    }
}

impl From<&Book> for NewBook {
    fn from(value: &Book) -> Self {
        Self {
            id: value.id,
            title: value.title.clone(),
            annotation: value.annotation.clone(),
            sequence_title: value.sequence_title().map(str::to_string),
            sequence_number: value.sequence.as_ref().and(value.sequence_number),
            authors: value.authors.iter().map(AuthorName::from).collect(),
            genres: value.genres.clone(),
        }
    }
}
