//! Bronze layer types: raw source documents and their processing state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four upstream source types the pipeline ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// IRS account transcript (per-year transaction history)
    AccountTranscript,
    /// Wage & income transcript (W-2s, 1099s and similar information returns)
    WageAndIncome,
    /// Tax return transcript (line items of the filed return)
    ReturnTranscript,
    /// Financial interview captured by the case-management system
    Interview,
}

impl SourceType {
    /// Bronze table backing this source type
    pub fn bronze_table(&self) -> &'static str {
        match self {
            SourceType::AccountTranscript => "bronze_account_raw",
            SourceType::WageAndIncome => "bronze_wage_income_raw",
            SourceType::ReturnTranscript => "bronze_return_raw",
            SourceType::Interview => "bronze_interview_raw",
        }
    }

    /// Upstream provider label recorded on Bronze rows
    pub fn default_source(&self) -> &'static str {
        match self {
            SourceType::Interview => "casehelper",
            _ => "transcript-api",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::AccountTranscript => "account-transcript",
            SourceType::WageAndIncome => "wage-and-income",
            SourceType::ReturnTranscript => "return-transcript",
            SourceType::Interview => "interview",
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "account-transcript" | "at" => Ok(SourceType::AccountTranscript),
            "wage-and-income" | "wi" => Ok(SourceType::WageAndIncome),
            "return-transcript" | "rt" => Ok(SourceType::ReturnTranscript),
            "interview" => Ok(SourceType::Interview),
            other => Err(format!("unknown source type: {other}")),
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of one Bronze record.
///
/// Transitions: Pending → Processing → Completed | Failed. Replay resets a
/// record to Pending and runs resolution again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProcessingStatus::Pending),
            "processing" => Some(ProcessingStatus::Processing),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw source document as stored in a Bronze table.
///
/// Immutable once written except for the status/error/processed_at fields.
#[derive(Debug, Clone)]
pub struct BronzeRecord {
    pub bronze_id: Uuid,
    pub case_number: String,
    pub payload: serde_json::Value,
    pub source: String,
    pub endpoint: Option<String>,
    pub status: ProcessingStatus,
    pub error_detail: Option<String>,
    pub inserted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Result of one ingest or replay invocation, returned to the ingestion
/// collaborator instead of raising resolution failures.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub bronze_id: Uuid,
    pub case_id: Uuid,
    pub status: ProcessingStatus,
    pub error_detail: Option<String>,
    /// Silver rows written (or re-confirmed) by this run
    pub silver_rows: u32,
    /// Whether the Gold layer was regenerated (interview source only)
    pub gold_refreshed: bool,
}

/// Per-table ingestion totals for the collaborator's monitoring surface.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionSummary {
    pub source: SourceType,
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
    pub failed: i64,
}
