//! Shared test utilities
#![allow(dead_code)]

use caselake_pipeline::Pipeline;
use tempfile::TempDir;

/// Pipeline backed by a fresh on-disk database in a temp directory. The
/// TempDir must stay alive for the test's duration.
pub async fn test_pipeline() -> (Pipeline, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("caselake.db");
    let pool = caselake_common::db::init_database(&db_path)
        .await
        .expect("init database");
    (Pipeline::new(pool), dir)
}

/// Load a JSON fixture from tests/fixtures/.
pub fn fixture(name: &str) -> serde_json::Value {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    let raw = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {path}: {e}"));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("parsing {path}: {e}"))
}

/// Count rows in a table for one case id.
pub async fn count_for_case(pipeline: &Pipeline, table: &str, case_id: uuid::Uuid) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM {table} WHERE case_id = ?"))
            .bind(case_id.to_string())
            .fetch_one(pipeline.pool())
            .await
            .expect("count query");
    count
}
