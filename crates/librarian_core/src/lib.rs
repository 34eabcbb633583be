//! Core data-access layer for the Librarian book catalog.
//! Maps the catalog schema to hydrated domain objects and back.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::author::{Author, AuthorId, AuthorName};
pub use model::book::{Book, BookId, BookValidationError, NewBook};
pub use model::sequence::{Sequence, SequenceId};
pub use repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository};
pub use service::catalog_service::CatalogService;
pub use store::CatalogStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
