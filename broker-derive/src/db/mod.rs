//! Reference-data access for broker-derive
//!
//! The derivation engine never touches the database. These loaders read the
//! reference store once, up front, into a [`ReferenceSnapshot`](crate::snapshot::ReferenceSnapshot).

pub mod published;
pub mod reference;

pub use published::load_award_donors;
pub use reference::{load_snapshot, table_exists};

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to the reference store read-only
///
/// The store is owned by the refresh jobs; this process only reads it.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Reference database not found: {}\nLoad reference tables into it before deriving.",
            db_path.display()
        );
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    tracing::debug!("Connecting to reference database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await
        .context("Failed to connect to reference database in read-only mode")?;

    Ok(pool)
}
