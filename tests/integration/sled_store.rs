//! The query pipeline over the persistent sled store.

use playlog::query::AggregationResult;
use playlog::record::{Context, Event};
use playlog::service::ListRequest;
use playlog::store::{RecordStore, SledRecordStore};
use playlog::types::RecordId;
use std::sync::Arc;
use tempfile::TempDir;

use super::support::*;

fn seed(path: &std::path::Path) {
    let db = sled::open(path).unwrap();
    let contexts: SledRecordStore<Context> = SledRecordStore::new(&db).unwrap();
    let events: SledRecordStore<Event> = SledRecordStore::new(&db).unwrap();
    let fixtures = ten_contexts();
    for ctx in &fixtures {
        contexts.put(ctx).unwrap();
    }
    for event in events_for(&fixtures) {
        events.put(&event).unwrap();
    }
    contexts.flush().unwrap();
}

#[test]
fn test_scenario_over_reopened_store() {
    let temp_dir = TempDir::new().unwrap();
    seed(temp_dir.path());

    let store: SledRecordStore<Context> = SledRecordStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.len().unwrap(), 10);
    let service = service_over(Arc::new(store));

    let response = service
        .list(
            Some(TEST_TOKEN),
            &ListRequest {
                query: Some(r#"{"data.someNumber": {"$gte": 5}}"#.to_string()),
                sort: Some("+data.someNumber".to_string()),
                skip: 2,
                limit: 2,
                url: "/contexts".to_string(),
            },
        )
        .unwrap();
    assert_eq!(some_numbers(&response.records), vec![7, 8]);
    assert_eq!(response.links.pages.next.as_deref(), Some("/contexts?skip=4"));

    let query_id = service
        .submit_query(
            Some(TEST_TOKEN),
            r#"{"type":"sum","key":"duration","query":{"data.someNumber":{"$gte":5}}}"#,
        )
        .unwrap()
        .query_id;
    assert_eq!(
        service.resolve_query(Some(TEST_TOKEN), &query_id).unwrap(),
        AggregationResult::Sum(900000.0)
    );
}

#[test]
fn test_collections_share_one_database() {
    let temp_dir = TempDir::new().unwrap();
    seed(temp_dir.path());

    let db = sled::open(temp_dir.path()).unwrap();
    let events: SledRecordStore<Event> = SledRecordStore::new(&db).unwrap();
    assert_eq!(events.len().unwrap(), 10);
    let event = events.get(&RecordId::new("evt-3")).unwrap().unwrap();
    assert_eq!(event.context_id, Some(RecordId::new("ctx-3")));
}
