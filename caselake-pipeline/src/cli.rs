//! Command-line interface for the caselake pipeline

use crate::calc::CsedFallback;
use crate::models::SourceType;
use crate::{Pipeline, PipelineConfig};
use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "caselake", version, about = "Case-data pipeline: ingest, replay and query")]
pub struct Cli {
    /// Root data folder (overrides CASELAKE_ROOT and the config file)
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Use the legacy CSED fallback (statute clock starts today for unfiled
    /// years) instead of declining to estimate
    #[arg(long, global = true)]
    pub legacy_csed_fallback: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest one raw source document for a case
    Ingest {
        /// Source type: account-transcript | wage-and-income | return-transcript | interview
        source: String,
        #[arg(long)]
        case: String,
        /// Path to the JSON document
        file: PathBuf,
    },
    /// Re-run resolution for stored Bronze records
    Replay {
        source: String,
        /// Specific record to replay
        #[arg(long, conflicts_with = "failed")]
        bronze_id: Option<Uuid>,
        /// Replay every failed record of this source type
        #[arg(long)]
        failed: bool,
    },
    /// Show Bronze processing status
    Status {
        /// Limit to one case's records (all source types)
        #[arg(long)]
        case: Option<String>,
    },
    /// Regenerate the Gold layer for a case
    RefreshGold {
        #[arg(long)]
        case: String,
    },
    /// Full per-case summary with derived figures
    Summary {
        #[arg(long)]
        case: String,
    },
    /// Individual derived calculations
    #[command(subcommand)]
    Calc(CalcCommand),
}

#[derive(Subcommand)]
pub enum CalcCommand {
    /// Statute expiration estimate with tolling
    Csed {
        #[arg(long)]
        case: String,
        #[arg(long)]
        year: i32,
    },
    /// Self-employment tax for a tax year
    SeTax {
        #[arg(long)]
        case: String,
        #[arg(long)]
        year: i32,
    },
    /// Signed account balance for a tax year
    Balance {
        #[arg(long)]
        case: String,
        #[arg(long)]
        year: i32,
    },
    /// Total monthly income across roles
    Income {
        #[arg(long)]
        case: String,
    },
    /// Monthly income minus monthly expenses
    Disposable {
        #[arg(long)]
        case: String,
    },
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            csed_fallback: if self.legacy_csed_fallback {
                CsedFallback::FallbackToToday
            } else {
                CsedFallback::Unavailable
            },
        }
    }
}

/// Execute one parsed command against the pipeline.
pub async fn run(command: Command, pipeline: &Pipeline) -> anyhow::Result<()> {
    match command {
        Command::Ingest { source, case, file } => {
            let source_type = parse_source(&source)?;
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let payload: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let outcome = pipeline.ingest(source_type, &case, payload, None).await?;
            print_json(&outcome)
        }
        Command::Replay {
            source,
            bronze_id,
            failed,
        } => {
            let source_type = parse_source(&source)?;
            match (bronze_id, failed) {
                (Some(id), _) => {
                    let outcome = pipeline.replay(source_type, id).await?;
                    print_json(&outcome)
                }
                (None, true) => {
                    let outcomes = pipeline.replay_failed(source_type).await?;
                    print_json(&outcomes)
                }
                (None, false) => bail!("pass --bronze-id <id> or --failed"),
            }
        }
        Command::Status { case } => match case {
            Some(case) => {
                let mut rows = Vec::new();
                for source_type in [
                    SourceType::AccountTranscript,
                    SourceType::WageAndIncome,
                    SourceType::ReturnTranscript,
                    SourceType::Interview,
                ] {
                    for record in
                        crate::db::bronze::list_by_case(pipeline.pool(), source_type, &case).await?
                    {
                        rows.push(serde_json::json!({
                            "source": source_type.as_str(),
                            "bronze_id": record.bronze_id,
                            "status": record.status.as_str(),
                            "error_detail": record.error_detail,
                            "inserted_at": record.inserted_at,
                            "processed_at": record.processed_at,
                        }));
                    }
                }
                print_json(&rows)
            }
            None => {
                let summary = pipeline.ingestion_summary().await?;
                print_json(&summary)
            }
        },
        Command::RefreshGold { case } => {
            let refreshed = pipeline.refresh_gold(&case).await?;
            print_json(&serde_json::json!({ "case": case, "gold_refreshed": refreshed }))
        }
        Command::Summary { case } => {
            let summary = pipeline.case_summary(&case, today()).await?;
            print_json(&summary)
        }
        Command::Calc(calc) => run_calc(calc, pipeline).await,
    }
}

async fn run_calc(command: CalcCommand, pipeline: &Pipeline) -> anyhow::Result<()> {
    match command {
        CalcCommand::Csed { case, year } => {
            let estimate = pipeline.csed(&case, year, today()).await?;
            print_json(&serde_json::json!({ "case": case, "year": year, "csed": estimate }))
        }
        CalcCommand::SeTax { case, year } => {
            let tax = pipeline.se_tax(&case, year).await?;
            print_json(&serde_json::json!({ "case": case, "year": year, "se_tax": tax }))
        }
        CalcCommand::Balance { case, year } => {
            let balance = pipeline.account_balance(&case, year).await?;
            print_json(&serde_json::json!({ "case": case, "year": year, "balance": balance }))
        }
        CalcCommand::Income { case } => {
            let income = pipeline.total_monthly_income(&case).await?;
            print_json(&serde_json::json!({ "case": case, "total_monthly_income": income }))
        }
        CalcCommand::Disposable { case } => {
            let disposable = pipeline.disposable_income(&case).await?;
            print_json(&serde_json::json!({ "case": case, "disposable_income": disposable }))
        }
    }
}

fn parse_source(raw: &str) -> anyhow::Result<SourceType> {
    raw.parse::<SourceType>().map_err(|e| anyhow::anyhow!(e))
}

fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
