//! Interview → Gold fan-out tests: replace semantics, defaults, derived
//! aggregates

mod helpers;

use caselake_pipeline::models::{ProcessingStatus, SourceType};
use serde_json::Value;
use serial_test::serial;

async fn gold_categories(
    pipeline: &caselake_pipeline::Pipeline,
    table: &str,
    column: &str,
    case_id: uuid::Uuid,
) -> Vec<String> {
    let rows: Vec<(String,)> = sqlx::query_as(&format!(
        "SELECT {column} FROM {table} WHERE case_id = ? ORDER BY {column}"
    ))
    .bind(case_id.to_string())
    .fetch_all(pipeline.pool())
    .await
    .unwrap();
    rows.into_iter().map(|(value,)| value).collect()
}

#[tokio::test]
#[serial]
async fn interview_fans_out_the_full_gold_layer() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = helpers::fixture("interview.json");

    let outcome = pipeline
        .ingest(SourceType::Interview, "1295022", payload, None)
        .await
        .unwrap();
    assert_eq!(outcome.status, ProcessingStatus::Completed);
    assert!(outcome.gold_refreshed);

    let case_id = outcome.case_id;
    assert_eq!(
        helpers::count_for_case(&pipeline, "employment_records", case_id).await,
        2
    );
    assert_eq!(
        helpers::count_for_case(&pipeline, "household_records", case_id).await,
        1
    );
    // taxpayer wages, spouse wages, rental
    assert_eq!(
        helpers::count_for_case(&pipeline, "income_sources", case_id).await,
        3
    );
    // nine populated expense categories; zero rent/childCare produce no rows
    assert_eq!(
        helpers::count_for_case(&pipeline, "monthly_expenses", case_id).await,
        9
    );
    // checking, cash on hand, retirement
    assert_eq!(
        helpers::count_for_case(&pipeline, "financial_accounts", case_id).await,
        3
    );
    assert_eq!(helpers::count_for_case(&pipeline, "vehicles", case_id).await, 2);
    assert_eq!(
        helpers::count_for_case(&pipeline, "real_properties", case_id).await,
        1
    );

    // Preferred section key beat the legacy b5 cell: biweekly 1,500 -> 3,255
    let (monthly, annual): (Option<f64>, Option<f64>) = sqlx::query_as(
        "SELECT monthly_income, annual_income FROM employment_records
         WHERE case_id = ? AND role = 'taxpayer'",
    )
    .bind(case_id.to_string())
    .fetch_one(pipeline.pool())
    .await
    .unwrap();
    assert_eq!(monthly, Some(3255.0));
    assert_eq!(annual, Some(39060.0));

    // Real property equity is derived
    let (equity,): (f64,) =
        sqlx::query_as("SELECT equity FROM real_properties WHERE case_id = ?")
            .bind(case_id.to_string())
            .fetch_one(pipeline.pool())
            .await
            .unwrap();
    assert_eq!(equity, 55000.0);

    assert_eq!(
        pipeline.total_monthly_income("1295022").await.unwrap(),
        7455.0
    );
    assert_eq!(pipeline.disposable_income("1295022").await.unwrap(), 3415.0);
}

#[tokio::test]
#[serial]
async fn resubmission_replaces_instead_of_accumulating() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = helpers::fixture("interview.json");

    let first = pipeline
        .ingest(SourceType::Interview, "1295022", payload.clone(), None)
        .await
        .unwrap();
    let case_id = first.case_id;

    // Second submission drops the spouse, the second vehicle and the rental
    let mut updated = payload;
    let doc = updated.as_object_mut().unwrap();
    let employment = doc.get_mut("employment").unwrap().as_object_mut().unwrap();
    employment.remove("spouseEmployer");
    employment.remove("spouseGrossIncome");
    employment.remove("spouseFrequentlyPaid");
    employment.remove("spouseMonthlyIncome");
    let assets = doc.get_mut("assets").unwrap().as_object_mut().unwrap();
    assets.remove("vehicle2Value");
    let income = doc.get_mut("income").unwrap().as_object_mut().unwrap();
    income.remove("spouseWages");
    income.remove("rentalGross");
    income.remove("rentalExpenses");
    income.insert("alimony".to_string(), Value::from(250));

    let second = pipeline
        .ingest(SourceType::Interview, "1295022", updated, None)
        .await
        .unwrap();
    assert_eq!(second.case_id, case_id);
    assert_eq!(second.status, ProcessingStatus::Completed);

    // Spouse row removed, not stale
    assert_eq!(
        gold_categories(&pipeline, "employment_records", "role", case_id).await,
        vec!["taxpayer"]
    );
    // Vehicle 2 removed
    assert_eq!(
        helpers::count_for_case(&pipeline, "vehicles", case_id).await,
        1
    );
    // Rental and spouse wages gone; alimony appeared
    assert_eq!(
        gold_categories(&pipeline, "income_sources", "category", case_id).await,
        vec!["alimony", "taxpayer_wages"]
    );
}

#[tokio::test]
#[serial]
async fn defaults_apply_to_a_minimal_interview() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = serde_json::json!({
        "employment": {"clientGrossIncome": 2000, "clientFrequentlyPaid": "monthly"}
    });

    let outcome = pipeline
        .ingest(SourceType::Interview, "777001", payload, None)
        .await
        .unwrap();
    assert_eq!(outcome.status, ProcessingStatus::Completed);

    let (members, filing): (i64, String) = sqlx::query_as(
        "SELECT household_members, filing_status FROM household_records WHERE case_id = ?",
    )
    .bind(outcome.case_id.to_string())
    .fetch_one(pipeline.pool())
    .await
    .unwrap();
    assert_eq!(members, 1);
    assert_eq!(filing, "Single");

    // No spouse data: one employment row
    assert_eq!(
        helpers::count_for_case(&pipeline, "employment_records", outcome.case_id).await,
        1
    );
}

#[tokio::test]
#[serial]
async fn gold_refresh_without_interview_is_a_noop() {
    let (pipeline, _dir) = helpers::test_pipeline().await;

    // Case exists (via a transcript) but has no interview row
    let outcome = pipeline
        .ingest(
            SourceType::AccountTranscript,
            "555001",
            helpers::fixture("account_transcript.json"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, ProcessingStatus::Completed);

    let refreshed = pipeline.refresh_gold("555001").await.unwrap();
    assert!(!refreshed);
    assert_eq!(
        helpers::count_for_case(&pipeline, "employment_records", outcome.case_id).await,
        0
    );
}
