//! Repository layer for catalog persistence.
//!
//! # Responsibility
//! - Define the catalog data-access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `NewBook::validate()` before persistence.
//! - Absence is reported as `Ok(None)` / empty `Vec`, never as an error.

pub mod catalog_repo;
