//! Case row access

use caselake_common::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Get or create the case row for an external case number.
///
/// Race-tolerant: concurrent callers both INSERT OR IGNORE against the unique
/// case_number index, then read back whichever row won.
pub async fn get_or_create(pool: &SqlitePool, case_number: &str) -> Result<Uuid> {
    sqlx::query(
        "INSERT OR IGNORE INTO cases (id, case_number, status_code, created_at)
         VALUES (?, ?, 'NEW', ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(case_number)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    let (id,): (String,) = sqlx::query_as("SELECT id FROM cases WHERE case_number = ?")
        .bind(case_number)
        .fetch_one(pool)
        .await?;

    super::parse_uuid(&id)
}

/// Look up an existing case by external case number.
pub async fn find(pool: &SqlitePool, case_number: &str) -> Result<Option<Uuid>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM cases WHERE case_number = ?")
        .bind(case_number)
        .fetch_optional(pool)
        .await?;

    row.map(|(id,)| super::parse_uuid(&id)).transpose()
}
