//! caselake-pipeline - Bronze/Silver/Gold case-data pipeline
//!
//! Ingests raw tax-transcript and interview documents, resolves them into
//! typed Silver rows, fans the interview out into normalized Gold entities
//! and serves the derived calculations (statute expiration, SE tax, account
//! balance, disposable income) on demand.

pub mod calc;
pub mod cli;
pub mod db;
pub mod gold;
pub mod lookups;
pub mod models;
pub mod resolve;

pub use resolve::PipelineError;

use calc::{CsedEstimate, CsedFallback};
use caselake_common::{Error, Result};
use chrono::NaiveDate;
use lookups::{CuratedLookups, LookupTables};
use models::{IngestOutcome, IngestionSummary, ProcessingStatus, SourceType};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Pipeline-wide configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// CSED base-date policy for years with no return-filed transaction
    pub csed_fallback: CsedFallback,
}

/// The pipeline handle: Bronze ingestion, replay, status and the derived
/// calculations, over one shared database pool.
#[derive(Clone)]
pub struct Pipeline {
    db: SqlitePool,
    lookups: Arc<dyn LookupTables>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Pipeline with the built-in curated lookup tables.
    pub fn new(db: SqlitePool) -> Self {
        Self::with_config(db, PipelineConfig::default())
    }

    /// Pipeline with the curated lookup tables and explicit configuration.
    pub fn with_config(db: SqlitePool, config: PipelineConfig) -> Self {
        Self::with_lookups(db, Arc::new(StaticLookups), config)
    }

    /// Pipeline with injected lookup tables (tests swap in stubs here).
    pub fn with_lookups(
        db: SqlitePool,
        lookups: Arc<dyn LookupTables>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            db,
            lookups,
            config,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Ingest one raw document: single Bronze write plus synchronous
    /// resolution. Resolution failures are reported through the outcome's
    /// status, never raised.
    pub async fn ingest(
        &self,
        source_type: SourceType,
        case_number: &str,
        payload: serde_json::Value,
        endpoint: Option<&str>,
    ) -> Result<IngestOutcome> {
        if case_number.trim().is_empty() {
            return Err(Error::InvalidInput("empty case number".to_string()));
        }

        let record = db::bronze::insert(&self.db, source_type, case_number, &payload, endpoint)
            .await?;
        resolve::process_record(&self.db, self.lookups.as_ref(), source_type, &record).await
    }

    /// Re-run resolution for one stored Bronze record. Idempotent: Silver
    /// natural keys and dedup keys absorb the replay.
    pub async fn replay(
        &self,
        source_type: SourceType,
        bronze_id: Uuid,
    ) -> Result<IngestOutcome> {
        let record = db::bronze::fetch(&self.db, source_type, bronze_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("bronze record {bronze_id}")))?;
        resolve::process_record(&self.db, self.lookups.as_ref(), source_type, &record).await
    }

    /// Replay every Failed record of one source type.
    pub async fn replay_failed(&self, source_type: SourceType) -> Result<Vec<IngestOutcome>> {
        let records =
            db::bronze::list_by_status(&self.db, source_type, ProcessingStatus::Failed).await?;
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            outcomes
                .push(resolve::process_record(&self.db, self.lookups.as_ref(), source_type, &record).await?);
        }
        Ok(outcomes)
    }

    /// Processing status and error text for one Bronze record.
    pub async fn processing_status(
        &self,
        source_type: SourceType,
        bronze_id: Uuid,
    ) -> Result<(ProcessingStatus, Option<String>)> {
        let record = db::bronze::fetch(&self.db, source_type, bronze_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("bronze record {bronze_id}")))?;
        Ok((record.status, record.error_detail))
    }

    /// Per-source ingestion totals.
    pub async fn ingestion_summary(&self) -> Result<Vec<IngestionSummary>> {
        db::bronze::ingestion_summary(&self.db).await
    }

    /// Explicitly regenerate the Gold layer for a case. Returns false when
    /// the case has no governing interview row (no-op).
    pub async fn refresh_gold(&self, case_number: &str) -> Result<bool> {
        let case_id = self.require_case(case_number).await?;
        let snapshot = gold::regenerate_for_case(&self.db, case_id, None)
            .await
            .map_err(pipeline_to_common)?;
        Ok(snapshot.is_some())
    }

    /// Sum of employment monthly income across taxpayer and spouse.
    pub async fn total_monthly_income(&self, case_number: &str) -> Result<f64> {
        let case_id = self.require_case(case_number).await?;
        let employment = db::gold::load_employment(&self.db, case_id).await?;
        Ok(calc::total_monthly_income(&employment))
    }

    /// Total monthly income minus total monthly expenses.
    pub async fn disposable_income(&self, case_number: &str) -> Result<f64> {
        let case_id = self.require_case(case_number).await?;
        let employment = db::gold::load_employment(&self.db, case_id).await?;
        let expenses = db::gold::load_monthly_expenses(&self.db, case_id).await?;
        Ok(calc::disposable_income(
            calc::total_monthly_income(&employment),
            calc::total_monthly_expenses(&expenses),
        ))
    }

    /// SE tax for one case/year from self-employment-flagged documents.
    pub async fn se_tax(&self, case_number: &str, tax_year: i32) -> Result<f64> {
        let case_id = self.require_case(case_number).await?;
        let documents = db::silver::load_income_documents(&self.db, case_id, tax_year).await?;
        Ok(calc::se_tax(calc::se_taxable_total(&documents)))
    }

    /// Signed account balance for one case/year.
    pub async fn account_balance(&self, case_number: &str, tax_year: i32) -> Result<f64> {
        let case_id = self.require_case(case_number).await?;
        let activity = db::silver::load_activity(&self.db, case_id, tax_year).await?;
        Ok(calc::account_balance(&activity))
    }

    /// Statute expiration estimate for one case/year, following the
    /// configured base-date fallback.
    pub async fn csed(
        &self,
        case_number: &str,
        tax_year: i32,
        today: NaiveDate,
    ) -> Result<Option<CsedEstimate>> {
        let case_id = self.require_case(case_number).await?;
        let filed = db::silver::return_filed_date(&self.db, case_id, tax_year).await?;
        let tolling = db::silver::load_tolling_events(&self.db, case_id, tax_year).await?;
        Ok(calc::csed_estimate(
            filed,
            &tolling,
            today,
            self.config.csed_fallback,
        ))
    }

    /// Full per-case rollup: monthly aggregates plus per-year figures.
    pub async fn case_summary(
        &self,
        case_number: &str,
        today: NaiveDate,
    ) -> Result<calc::CaseSummary> {
        let case_id = self.require_case(case_number).await?;

        let employment = db::gold::load_employment(&self.db, case_id).await?;
        let expenses = db::gold::load_monthly_expenses(&self.db, case_id).await?;
        let total_monthly_income = calc::total_monthly_income(&employment);
        let total_monthly_expenses = calc::total_monthly_expenses(&expenses);

        let mut years = Vec::new();
        for facts in db::silver::load_tax_years(&self.db, case_id).await? {
            let activity = db::silver::load_activity(&self.db, case_id, facts.tax_year).await?;
            let documents =
                db::silver::load_income_documents(&self.db, case_id, facts.tax_year).await?;
            let tolling =
                db::silver::load_tolling_events(&self.db, case_id, facts.tax_year).await?;
            let filed = db::silver::return_filed_date(&self.db, case_id, facts.tax_year).await?;
            years.push(calc::summary::build_year_summary(
                &facts,
                &activity,
                &documents,
                &tolling,
                filed,
                today,
                self.config.csed_fallback,
            ));
        }

        Ok(calc::CaseSummary {
            case_id,
            case_number: case_number.to_string(),
            disposable_income: calc::disposable_income(
                total_monthly_income,
                total_monthly_expenses,
            ),
            total_monthly_income,
            total_monthly_expenses,
            years,
        })
    }

    async fn require_case(&self, case_number: &str) -> Result<Uuid> {
        db::cases::find(&self.db, case_number)
            .await?
            .ok_or_else(|| Error::NotFound(format!("case {case_number}")))
    }
}

/// Zero-sized forwarder to the shared curated lookup singleton.
struct StaticLookups;

impl LookupTables for StaticLookups {
    fn transaction_rule(&self, code: &str) -> Option<&lookups::TransactionRule> {
        CuratedLookups::shared().transaction_rule(code)
    }

    fn form_rule(&self, form_code: &str) -> Option<&lookups::FormRule> {
        CuratedLookups::shared().form_rule(form_code)
    }

    fn tolling_rules(&self) -> &[lookups::TollingRule] {
        CuratedLookups::shared().tolling_rules()
    }
}

fn pipeline_to_common(err: PipelineError) -> Error {
    match err {
        PipelineError::Database(e) => Error::Database(e),
        PipelineError::Storage(e) => e,
        other => Error::Internal(other.to_string()),
    }
}
