//! caselake - case-data pipeline CLI
//!
//! Ingests raw case documents into the Bronze layer, runs Bronze → Silver →
//! Gold resolution synchronously, and answers derived-calculation queries.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use caselake_pipeline::cli::{self, Cli};
use caselake_pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting caselake v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    // Root folder: CLI arg, then environment, then config file, then default
    let root = caselake_common::config::resolve_root_folder(cli.root.as_deref());
    let db_path = caselake_common::config::prepare_root_folder(&root)?;
    info!("Database: {}", db_path.display());

    let pool = caselake_common::db::init_database(&db_path).await?;
    let pipeline = Pipeline::with_config(pool, cli.pipeline_config());

    cli::run(cli.command, &pipeline).await
}
