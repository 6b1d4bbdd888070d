//! Database initialization
//!
//! Opens (or creates) the shared caselake SQLite database and brings the
//! schema up to date. Safe to call more than once.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    crate::db::schema::create_all_tables(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (used by tests)
///
/// Capped at one connection: each SQLite `:memory:` connection is its own
/// database, so a larger pool would scatter tables across connections.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    configure_connection(&pool).await?;
    crate::db::schema::create_all_tables(&pool).await?;
    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer; multiple cases may be
    // processed by independent pipeline invocations at once.
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    // Serialize same-case writers instead of failing fast
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}
