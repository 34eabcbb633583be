//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured catalog once and report its wiring state.
//! - Keep output deterministic for quick local sanity checks.
//!
//! # Invariants
//! - A catalog file that does not exist yet is reported, never created.

use librarian_core::{init_logging, CatalogConfig, CatalogStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("librarian: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig::from_env()?;
    init_logging(&config.logging())?;

    println!("librarian_core ping={}", librarian_core::ping());
    println!("librarian_core version={}", librarian_core::core_version());

    if !config.database_path.exists() {
        log::info!("event=cli_probe module=cli status=skipped reason=missing_database");
        println!(
            "librarian_core database={} status=missing",
            config.database_path.display()
        );
        return Ok(());
    }

    let schema_version = CatalogStore::with_store(&config.database_path, |store| {
        store.schema_version()
    })?;
    log::info!("event=cli_probe module=cli status=ok schema_version={schema_version}");
    println!("librarian_core schema_version={schema_version}");
    Ok(())
}
