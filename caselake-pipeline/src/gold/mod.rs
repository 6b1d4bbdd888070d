//! Gold Normalization Engine: Silver → Gold
//!
//! Given one case's interview facts, regenerates the full Gold row set for
//! that case. The builders are pure functions over [`InterviewFacts`]; the
//! storage layer applies the result as one atomic set reconciliation, so each
//! run fully replaces the prior fan-out and a removed source field removes
//! its Gold row.

pub mod assets;
pub mod employment;
pub mod expenses;
pub mod household;
pub mod income;

use crate::db;
use crate::models::{GoldSnapshot, InterviewFacts};
use crate::resolve::PipelineError;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Regenerate the Gold layer for one case.
///
/// `facts` may be passed by the interview resolver that just wrote them;
/// otherwise the governing Silver row is loaded. A case without an interview
/// row is a no-op (nothing to fan out), not an error.
pub async fn regenerate_for_case(
    pool: &SqlitePool,
    case_id: Uuid,
    facts: Option<&InterviewFacts>,
) -> Result<Option<GoldSnapshot>, PipelineError> {
    let loaded;
    let facts = match facts {
        Some(facts) => facts,
        None => match db::silver::load_interview_facts(pool, case_id).await? {
            Some(facts) => {
                loaded = facts;
                &loaded
            }
            None => {
                debug!(%case_id, "no interview facts, gold fan-out skipped");
                return Ok(None);
            }
        },
    };

    let snapshot = build_snapshot(facts);
    db::gold::replace_snapshot(pool, case_id, &snapshot).await?;
    debug!(%case_id, rows = snapshot.row_count(), "gold layer regenerated");
    Ok(Some(snapshot))
}

/// Compute the desired Gold state from one interview resolution. Pure.
pub fn build_snapshot(facts: &InterviewFacts) -> GoldSnapshot {
    GoldSnapshot {
        employment: employment::build(facts),
        household: Some(household::build(facts)),
        income_sources: income::build(facts),
        monthly_expenses: expenses::build(facts),
        financial_accounts: assets::build_financial_accounts(facts),
        vehicles: assets::build_vehicles(facts),
        real_properties: assets::build_real_properties(facts),
    }
}
