//! Bronze raw-record storage
//!
//! Append-mostly: rows are inserted once and only their status/error/
//! processed_at fields change afterwards. Rows are never deleted; replay
//! re-reads the stored payload.

use crate::models::{BronzeRecord, IngestionSummary, ProcessingStatus, SourceType};
use caselake_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert one raw document, status Pending.
pub async fn insert(
    pool: &SqlitePool,
    source_type: SourceType,
    case_number: &str,
    payload: &serde_json::Value,
    endpoint: Option<&str>,
) -> Result<BronzeRecord> {
    let record = BronzeRecord {
        bronze_id: Uuid::new_v4(),
        case_number: case_number.to_string(),
        payload: payload.clone(),
        source: source_type.default_source().to_string(),
        endpoint: endpoint.map(str::to_string),
        status: ProcessingStatus::Pending,
        error_detail: None,
        inserted_at: Utc::now(),
        processed_at: None,
    };

    sqlx::query(&format!(
        "INSERT INTO {} (bronze_id, case_number, payload, source, endpoint, status, inserted_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        source_type.bronze_table()
    ))
    .bind(record.bronze_id.to_string())
    .bind(&record.case_number)
    .bind(record.payload.to_string())
    .bind(&record.source)
    .bind(record.endpoint.as_deref())
    .bind(record.status.as_str())
    .bind(record.inserted_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(record)
}

/// Transition a record's processing status. Terminal states stamp
/// processed_at; Failed also records the error text.
pub async fn set_status(
    pool: &SqlitePool,
    source_type: SourceType,
    bronze_id: Uuid,
    status: ProcessingStatus,
    error_detail: Option<&str>,
) -> Result<()> {
    let processed_at = matches!(
        status,
        ProcessingStatus::Completed | ProcessingStatus::Failed
    )
    .then(|| Utc::now().to_rfc3339());

    sqlx::query(&format!(
        "UPDATE {} SET status = ?, error_detail = ?, processed_at = ? WHERE bronze_id = ?",
        source_type.bronze_table()
    ))
    .bind(status.as_str())
    .bind(error_detail)
    .bind(processed_at)
    .bind(bronze_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch one record by id.
pub async fn fetch(
    pool: &SqlitePool,
    source_type: SourceType,
    bronze_id: Uuid,
) -> Result<Option<BronzeRecord>> {
    let row: Option<BronzeRow> = sqlx::query_as(&format!(
        "SELECT bronze_id, case_number, payload, source, endpoint, status, error_detail,
                inserted_at, processed_at
         FROM {} WHERE bronze_id = ?",
        source_type.bronze_table()
    ))
    .bind(bronze_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(BronzeRow::into_record).transpose()
}

/// Fetch all records in a given status (oldest first), e.g. Failed for replay.
pub async fn list_by_status(
    pool: &SqlitePool,
    source_type: SourceType,
    status: ProcessingStatus,
) -> Result<Vec<BronzeRecord>> {
    let rows: Vec<BronzeRow> = sqlx::query_as(&format!(
        "SELECT bronze_id, case_number, payload, source, endpoint, status, error_detail,
                inserted_at, processed_at
         FROM {} WHERE status = ? ORDER BY inserted_at",
        source_type.bronze_table()
    ))
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(BronzeRow::into_record).collect()
}

/// Fetch all records for one case (newest first).
pub async fn list_by_case(
    pool: &SqlitePool,
    source_type: SourceType,
    case_number: &str,
) -> Result<Vec<BronzeRecord>> {
    let rows: Vec<BronzeRow> = sqlx::query_as(&format!(
        "SELECT bronze_id, case_number, payload, source, endpoint, status, error_detail,
                inserted_at, processed_at
         FROM {} WHERE case_number = ? ORDER BY inserted_at DESC",
        source_type.bronze_table()
    ))
    .bind(case_number)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(BronzeRow::into_record).collect()
}

/// Per-source ingestion totals for the monitoring surface.
pub async fn ingestion_summary(pool: &SqlitePool) -> Result<Vec<IngestionSummary>> {
    let mut summaries = Vec::new();
    for source in [
        SourceType::AccountTranscript,
        SourceType::WageAndIncome,
        SourceType::ReturnTranscript,
        SourceType::Interview,
    ] {
        let (total, pending, completed, failed): (i64, i64, i64, i64) = sqlx::query_as(&format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(status IN ('pending', 'processing')), 0),
                    COALESCE(SUM(status = 'completed'), 0),
                    COALESCE(SUM(status = 'failed'), 0)
             FROM {}",
            source.bronze_table()
        ))
        .fetch_one(pool)
        .await?;

        summaries.push(IngestionSummary {
            source,
            total,
            pending,
            completed,
            failed,
        });
    }
    Ok(summaries)
}

#[derive(sqlx::FromRow)]
struct BronzeRow {
    bronze_id: String,
    case_number: String,
    payload: String,
    source: String,
    endpoint: Option<String>,
    status: String,
    error_detail: Option<String>,
    inserted_at: String,
    processed_at: Option<String>,
}

impl BronzeRow {
    fn into_record(self) -> Result<BronzeRecord> {
        Ok(BronzeRecord {
            bronze_id: super::parse_uuid(&self.bronze_id)?,
            payload: serde_json::from_str(&self.payload)
                .map_err(|e| Error::Internal(format!("stored payload is not JSON: {e}")))?,
            status: ProcessingStatus::parse(&self.status)
                .ok_or_else(|| Error::Internal(format!("unknown status {:?}", self.status)))?,
            inserted_at: parse_timestamp(&self.inserted_at)?,
            processed_at: self
                .processed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            case_number: self.case_number,
            source: self.source,
            endpoint: self.endpoint,
            error_detail: self.error_detail,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("malformed timestamp {raw:?}: {e}")))
}
