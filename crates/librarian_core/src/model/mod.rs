//! Catalog domain model.
//!
//! # Responsibility
//! - Define the read models (`Book`, `Author`, `Sequence`) returned to callers.
//! - Define the write model (`NewBook`) accepted by the persistence layer.
//!
//! # Invariants
//! - Read models are always fully hydrated; there are no lazy references.
//! - Authors and sequences are identified by natural key on the write path.

pub mod author;
pub mod book;
pub mod sequence;
