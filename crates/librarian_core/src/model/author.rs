//! Author domain model.
//!
//! # Invariants
//! - `id` is assigned by the store (auto-increment) and never by callers.
//! - Identity for deduplication is the exact `(first_name, last_name)` pair.

use serde::{Deserialize, Serialize};

/// Store-assigned author identifier.
pub type AuthorId = i64;

/// Natural key of an author.
///
/// Used on the write path, where the store resolves it to an existing
/// `AuthorId` or creates a new row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

impl AuthorName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    /// Returns the natural key of this author.
    pub fn name(&self) -> AuthorName {
        AuthorName::new(self.first_name.as_str(), self.last_name.as_str())
    }
}

impl From<&Author> for AuthorName {
    fn from(value: &Author) -> Self {
        value.name()
    }
}
