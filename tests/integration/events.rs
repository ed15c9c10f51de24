//! Events share the listing, scoping and aggregation pipeline with contexts.

use playlog::query::AggregationResult;
use playlog::service::ListRequest;
use serde_json::json;

use super::support::*;

#[test]
fn test_events_default_to_time_order() {
    let service = event_service();
    let response = service
        .list(
            Some(TEST_TOKEN),
            &ListRequest {
                sort: Some("-time".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(response.records[0]["id"], json!("evt-9"));

    let response = service
        .list(Some(TEST_TOKEN), &ListRequest::default())
        .unwrap();
    let ids: Vec<_> = response.records.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids.first(), Some(&json!("evt-0")));
    assert_eq!(ids.last(), Some(&json!("evt-9")));
    assert!(response.records.iter().all(|r| r.get("duration").is_none()));
}

#[test]
fn test_events_filtered_by_context() {
    let service = event_service();
    let response = service
        .list(
            Some(TEST_TOKEN),
            &ListRequest {
                query: Some(r#"{"contextId": {"$in": ["ctx-2", "ctx-4"]}}"#.to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(response.meta.total, 2);
}

#[test]
fn test_event_score_aggregation() {
    let service = event_service();
    let query_id = service
        .submit_query(
            Some(ADMIN_TOKEN),
            r#"{"type":"sum","key":"data.score","query":{"data.score":{"$lt":50}}}"#,
        )
        .unwrap()
        .query_id;
    assert_eq!(
        service.resolve_query(Some(ADMIN_TOKEN), &query_id).unwrap(),
        AggregationResult::Sum(100.0)
    );
}
