//! Field Resolution Engine: Bronze → Silver
//!
//! One Bronze record in, zero-or-more Silver rows out. Each source type has
//! its own resolver module; this module owns the recoverable per-record
//! boundary: a resolver failure marks the Bronze record Failed with the
//! captured error and leaves already-committed Silver rows untouched. Errors
//! never propagate to the ingestion caller.

pub mod account_transcript;
pub mod alias;
pub mod coerce;
pub mod interview;
pub mod return_transcript;
pub mod wage_income;

use crate::db;
use crate::lookups::LookupTables;
use crate::models::{BronzeRecord, IngestOutcome, ProcessingStatus, SourceType};
use caselake_common::Result;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Whole-record transformation failures. Recorded on the Bronze record, not
/// raised past the ingest boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The payload has none of the expected top-level record containers
    #[error("no recognizable document container (tried: {tried})")]
    MissingContainer { tried: String },

    /// The payload shape is not what the source type produces
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] caselake_common::Error),
}

/// What one resolver run produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionReport {
    /// Silver rows written or re-confirmed
    pub silver_rows: u32,
    /// Whether Gold was regenerated (interview source only)
    pub gold_refreshed: bool,
}

/// Process one Bronze record through its source resolver.
///
/// Status transitions Pending → Processing → Completed | Failed happen here;
/// the returned outcome mirrors the final status instead of erroring.
pub async fn process_record(
    pool: &SqlitePool,
    lookups: &dyn LookupTables,
    source_type: SourceType,
    record: &BronzeRecord,
) -> Result<IngestOutcome> {
    db::bronze::set_status(
        pool,
        source_type,
        record.bronze_id,
        ProcessingStatus::Processing,
        None,
    )
    .await?;

    // Owning case is created up front so even a failed record is attributable
    let case_id = db::cases::get_or_create(pool, &record.case_number).await?;

    match dispatch(pool, lookups, source_type, case_id, record).await {
        Ok(report) => {
            db::bronze::set_status(
                pool,
                source_type,
                record.bronze_id,
                ProcessingStatus::Completed,
                None,
            )
            .await?;
            info!(
                source = %source_type,
                bronze_id = %record.bronze_id,
                case = %record.case_number,
                rows = report.silver_rows,
                "resolution completed"
            );
            Ok(IngestOutcome {
                bronze_id: record.bronze_id,
                case_id,
                status: ProcessingStatus::Completed,
                error_detail: None,
                silver_rows: report.silver_rows,
                gold_refreshed: report.gold_refreshed,
            })
        }
        Err(err) => {
            let detail = err.to_string();
            warn!(
                source = %source_type,
                bronze_id = %record.bronze_id,
                case = %record.case_number,
                error = %detail,
                "resolution failed"
            );
            db::bronze::set_status(
                pool,
                source_type,
                record.bronze_id,
                ProcessingStatus::Failed,
                Some(&detail),
            )
            .await?;
            Ok(IngestOutcome {
                bronze_id: record.bronze_id,
                case_id,
                status: ProcessingStatus::Failed,
                error_detail: Some(detail),
                silver_rows: 0,
                gold_refreshed: false,
            })
        }
    }
}

async fn dispatch(
    pool: &SqlitePool,
    lookups: &dyn LookupTables,
    source_type: SourceType,
    case_id: Uuid,
    record: &BronzeRecord,
) -> std::result::Result<ResolutionReport, PipelineError> {
    match source_type {
        SourceType::AccountTranscript => {
            account_transcript::resolve(pool, lookups, case_id, record).await
        }
        SourceType::WageAndIncome => wage_income::resolve(pool, lookups, case_id, record).await,
        SourceType::ReturnTranscript => return_transcript::resolve(pool, case_id, record).await,
        SourceType::Interview => interview::resolve(pool, case_id, record).await,
    }
}
