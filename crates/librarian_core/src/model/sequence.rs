//! Book sequence (series) model.

use serde::{Deserialize, Serialize};

/// Store-assigned sequence identifier.
pub type SequenceId = i64;

/// Named series of books.
///
/// A book's position inside the sequence lives on the book
/// (`Book::sequence_number`), not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: SequenceId,
    /// Natural key; deduplication matches this exactly.
    pub title: String,
}
