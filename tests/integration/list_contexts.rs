//! Listing contexts: filtering, sorting, paging and derived durations.

use playlog::error::ApiError;
use playlog::record::context::{children_of, parent_of};
use playlog::service::ListRequest;
use playlog::store::{MemoryRecordStore, RecordStore};
use playlog::types::RecordId;
use serde_json::json;

use super::support::*;

fn request(query: Option<&str>, sort: Option<&str>, skip: usize, limit: usize) -> ListRequest {
    ListRequest {
        query: query.map(str::to_string),
        sort: sort.map(str::to_string),
        skip,
        limit,
        url: format!("/contexts?limit={}&skip={}", limit, skip),
    }
}

#[test]
fn test_filter_sort_and_window() {
    let service = context_service();
    let response = service
        .list(
            Some(TEST_TOKEN),
            &request(
                Some(r#"{"data.someNumber": {"$gte": 5}}"#),
                Some("+data.someNumber"),
                2,
                2,
            ),
        )
        .unwrap();

    assert_eq!(some_numbers(&response.records), vec![7, 8]);
    assert_eq!(response.meta.total, 5);

    let pages = &response.links.pages;
    assert_eq!(pages.prev.as_deref(), Some("/contexts?limit=2&skip=0"));
    assert_eq!(pages.next.as_deref(), Some("/contexts?limit=2&skip=4"));
    assert_eq!(pages.last.as_deref(), Some("/contexts?limit=2&skip=4"));
}

#[test]
fn test_descending_json_sort() {
    let service = context_service();
    let response = service
        .list(
            Some(TEST_TOKEN),
            &request(None, Some(r#"{"data.someNumber": -1}"#), 0, 3),
        )
        .unwrap();
    assert_eq!(some_numbers(&response.records), vec![9, 8, 7]);
    assert_eq!(response.meta.total, 10);
    assert!(response.links.pages.prev.is_none());
}

#[test]
fn test_default_sort_is_time_ascending() {
    let service = context_service();
    let response = service
        .list(Some(TEST_TOKEN), &request(None, Some("-timeStarted"), 0, 0))
        .unwrap();
    assert_eq!(some_numbers(&response.records)[0], 9);

    // Contexts carry no `time` field, so the default sort keeps store order.
    let response = service
        .list(Some(TEST_TOKEN), &request(None, None, 0, 0))
        .unwrap();
    assert_eq!(some_numbers(&response.records), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_no_limit_means_no_links() {
    let service = context_service();
    let response = service
        .list(Some(TEST_TOKEN), &request(None, None, 0, 0))
        .unwrap();
    assert_eq!(response.records.len(), 10);
    let links = serde_json::to_value(&response.links).unwrap();
    assert_eq!(links, json!({"pages": {}}));
}

#[test]
fn test_records_carry_duration() {
    let service = context_service();
    let response = service
        .list(
            Some(TEST_TOKEN),
            &request(Some(r#"{"duration": 180000}"#), None, 0, 0),
        )
        .unwrap();
    assert_eq!(response.meta.total, 10);
    assert!(response
        .records
        .iter()
        .all(|r| r["duration"] == json!(3 * MINUTE)));
}

#[test]
fn test_other_group_sees_nothing() {
    let service = context_service();
    let response = service
        .list(Some(OTHER_GROUP_TOKEN), &request(None, None, 0, 2))
        .unwrap();
    assert!(response.records.is_empty());
    assert_eq!(response.meta.total, 0);
    assert_eq!(response.links.pages, Default::default());
}

#[test]
fn test_authentication_and_capability() {
    let service = context_service();
    assert!(matches!(
        service.list(None, &request(None, None, 0, 0)),
        Err(ApiError::Unauthorized(_))
    ));
    assert!(matches!(
        service.list(Some("bogus"), &request(None, None, 0, 0)),
        Err(ApiError::Unauthorized(_))
    ));
    assert!(matches!(
        service.list(Some(WRITER_TOKEN), &request(None, None, 0, 0)),
        Err(ApiError::Forbidden(_))
    ));
    let bearer = format!("Bearer {}", TEST_TOKEN);
    assert!(service.list(Some(&bearer), &request(None, None, 0, 0)).is_ok());
}

#[test]
fn test_malformed_filter() {
    let service = context_service();
    assert!(matches!(
        service.list(Some(TEST_TOKEN), &request(Some("[1, 2]"), None, 0, 0)),
        Err(ApiError::MalformedFilter(_))
    ));
}

#[test]
fn test_detail_lookup() {
    let service = context_service();
    let doc = service.get(Some(TEST_TOKEN), &RecordId::new("ctx-3")).unwrap();
    assert_eq!(doc["data"]["someNumber"], json!(3));
    assert_eq!(doc["duration"], json!(3 * MINUTE));

    assert!(matches!(
        service.get(Some(TEST_TOKEN), &RecordId::new("ctx-99")),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        service.get(Some(OTHER_GROUP_TOKEN), &RecordId::new("ctx-3")),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_parent_and_children_are_id_lookups() {
    let mut contexts = ten_contexts();
    contexts[0].children = vec![
        RecordId::new("ctx-1"),
        RecordId::new("gone"),
        RecordId::new("ctx-2"),
    ];
    contexts[1].parent_context_id = Some(RecordId::new("ctx-0"));
    let store = MemoryRecordStore::from_records(contexts);

    let root = store.get(&RecordId::new("ctx-0")).unwrap().unwrap();
    let children: Vec<_> = children_of(&store, &root)
        .unwrap()
        .into_iter()
        .map(|c| c.id.to_string())
        .collect();
    assert_eq!(children, vec!["ctx-1", "ctx-2"]);

    let child = store.get(&RecordId::new("ctx-1")).unwrap().unwrap();
    assert_eq!(parent_of(&store, &child).unwrap().unwrap().id.as_str(), "ctx-0");
    assert!(parent_of(&store, &root).unwrap().is_none());
}
