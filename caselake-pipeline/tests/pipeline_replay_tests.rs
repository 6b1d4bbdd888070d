//! Bronze → Silver pipeline tests: ingestion, failure capture, idempotent
//! replay

mod helpers;

use caselake_pipeline::models::{ProcessingStatus, SourceType};
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn account_transcript_populates_silver() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = helpers::fixture("account_transcript.json");

    let outcome = pipeline
        .ingest(SourceType::AccountTranscript, "1295022", payload, None)
        .await
        .unwrap();

    assert_eq!(outcome.status, ProcessingStatus::Completed);
    assert!(outcome.error_detail.is_none());
    assert!(!outcome.gold_refreshed);

    let case_id = outcome.case_id;
    assert_eq!(helpers::count_for_case(&pipeline, "tax_years", case_id).await, 2);
    // 6 coded transactions in 2015 plus 1 in 2016; the code-less element is skipped
    assert_eq!(
        helpers::count_for_case(&pipeline, "account_activity", case_id).await,
        7
    );
    // One closed offer-in-compromise episode (480 -> 481)
    assert_eq!(
        helpers::count_for_case(&pipeline, "tolling_events", case_id).await,
        1
    );

    let (status, error) = pipeline
        .processing_status(SourceType::AccountTranscript, outcome.bronze_id)
        .await
        .unwrap();
    assert_eq!(status, ProcessingStatus::Completed);
    assert!(error.is_none());
}

#[tokio::test]
#[serial]
async fn ingesting_the_same_payload_twice_is_idempotent() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = helpers::fixture("account_transcript.json");

    let first = pipeline
        .ingest(SourceType::AccountTranscript, "1295022", payload.clone(), None)
        .await
        .unwrap();
    let second = pipeline
        .ingest(SourceType::AccountTranscript, "1295022", payload, None)
        .await
        .unwrap();

    assert_eq!(second.status, ProcessingStatus::Completed);
    assert_eq!(first.case_id, second.case_id);

    let case_id = first.case_id;
    assert_eq!(helpers::count_for_case(&pipeline, "tax_years", case_id).await, 2);
    assert_eq!(
        helpers::count_for_case(&pipeline, "account_activity", case_id).await,
        7
    );
    assert_eq!(
        helpers::count_for_case(&pipeline, "tolling_events", case_id).await,
        1
    );
}

#[tokio::test]
#[serial]
async fn replaying_one_bronze_record_adds_no_rows() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = helpers::fixture("wage_income.json");

    let outcome = pipeline
        .ingest(SourceType::WageAndIncome, "1295022", payload, None)
        .await
        .unwrap();
    assert_eq!(outcome.status, ProcessingStatus::Completed);

    let before = helpers::count_for_case(&pipeline, "income_documents", outcome.case_id).await;
    assert_eq!(before, 4);

    let replayed = pipeline
        .replay(SourceType::WageAndIncome, outcome.bronze_id)
        .await
        .unwrap();
    assert_eq!(replayed.status, ProcessingStatus::Completed);

    let after = helpers::count_for_case(&pipeline, "income_documents", outcome.case_id).await;
    assert_eq!(after, before);
}

#[tokio::test]
#[serial]
async fn malformed_payload_marks_the_record_failed() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = json!({"unexpected": {"shape": true}});

    let outcome = pipeline
        .ingest(SourceType::AccountTranscript, "999001", payload, None)
        .await
        .unwrap();

    assert_eq!(outcome.status, ProcessingStatus::Failed);
    let detail = outcome.error_detail.expect("failure detail recorded");
    assert!(detail.contains("container"), "unexpected detail: {detail}");
    assert_eq!(outcome.silver_rows, 0);

    // Failure is visible through the status surface and no Silver rows exist
    let (status, error) = pipeline
        .processing_status(SourceType::AccountTranscript, outcome.bronze_id)
        .await
        .unwrap();
    assert_eq!(status, ProcessingStatus::Failed);
    assert!(error.is_some());
    assert_eq!(
        helpers::count_for_case(&pipeline, "tax_years", outcome.case_id).await,
        0
    );
}

#[tokio::test]
#[serial]
async fn failed_records_can_be_replayed_in_bulk() {
    let (pipeline, _dir) = helpers::test_pipeline().await;

    pipeline
        .ingest(
            SourceType::AccountTranscript,
            "999002",
            json!({"nothing": []}),
            None,
        )
        .await
        .unwrap();

    let outcomes = pipeline
        .replay_failed(SourceType::AccountTranscript)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    // Same payload still fails the same way; the record stays Failed
    assert_eq!(outcomes[0].status, ProcessingStatus::Failed);

    let summary = pipeline.ingestion_summary().await.unwrap();
    let at = summary
        .iter()
        .find(|s| s.source == SourceType::AccountTranscript)
        .unwrap();
    assert_eq!(at.total, 1);
    assert_eq!(at.failed, 1);
    assert_eq!(at.completed, 0);
}

#[tokio::test]
#[serial]
async fn sibling_elements_survive_one_bad_element() {
    let (pipeline, _dir) = helpers::test_pipeline().await;
    let payload = json!({
        "at_records": [
            {"period": "not-a-year", "transactions": []},
            {"tax_year": 2018, "transactions": [
                {"code": "150", "date": "2019-04-15", "amount": 1200}
            ]}
        ]
    });

    let outcome = pipeline
        .ingest(SourceType::AccountTranscript, "999003", payload, None)
        .await
        .unwrap();

    assert_eq!(outcome.status, ProcessingStatus::Completed);
    assert_eq!(
        helpers::count_for_case(&pipeline, "tax_years", outcome.case_id).await,
        1
    );
    assert_eq!(
        helpers::count_for_case(&pipeline, "account_activity", outcome.case_id).await,
        1
    );
}
