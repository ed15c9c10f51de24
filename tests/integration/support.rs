//! Shared fixtures: the ten-context game used across scenarios.

use playlog::access::{Action, Grant, Identity, TokenAuthenticator};
use playlog::clock::FixedClock;
use playlog::record::{Context, ContextStatus, Event, UserPayload};
use playlog::service::QueryService;
use playlog::store::{MemoryRecordStore, RecordStore};
use playlog::types::{GroupId, RecordId, Timestamp};
use serde_json::json;
use std::sync::Arc;

pub const GAME: &str = "test";
pub const GROUP: i64 = 123456;
pub const MINUTE: i64 = 60 * 1000;
pub const NOW: Timestamp = 1_700_000_000_000;

/// Writer on the game, reader of group 123456 only.
pub const TEST_TOKEN: &str = "test-user-token";
/// Reader of a group none of the fixtures are logged under.
pub const OTHER_GROUP_TOKEN: &str = "other-group-token";
/// Blanket reader of the game.
pub const ADMIN_TOKEN: &str = "admin-token";
/// Holds readWrite but no readData grant.
pub const WRITER_TOKEN: &str = "writer-token";

pub fn authenticator() -> TokenAuthenticator {
    TokenAuthenticator::new()
        .with_token(
            TEST_TOKEN,
            Identity::new(
                "test-user",
                vec![
                    Grant::blanket(Action::ReadWrite, GAME),
                    Grant::for_group(Action::ReadData, GAME, GroupId::new(GROUP.to_string())),
                ],
            ),
        )
        .with_token(
            OTHER_GROUP_TOKEN,
            Identity::new(
                "other",
                vec![Grant::for_group(Action::ReadData, GAME, GroupId::new("999"))],
            ),
        )
        .with_token(
            ADMIN_TOKEN,
            Identity::new("admin", vec![Grant::blanket(Action::ReadData, GAME)]),
        )
        .with_token(
            WRITER_TOKEN,
            Identity::new("writer", vec![Grant::blanket(Action::ReadWrite, GAME)]),
        )
}

fn payload() -> UserPayload {
    let mut payload = UserPayload::with_selected_groups([GROUP]);
    payload.groups = Some(vec![json!(111111), json!(22222), json!(GROUP)]);
    payload
}

/// Ten ended contexts, `data.someNumber` = 0..9, each lasting three minutes,
/// all logged under group 123456. Started one minute apart.
pub fn ten_contexts() -> Vec<Context> {
    (0..10)
        .map(|i| {
            let started = NOW - 60 * MINUTE + i * MINUTE;
            let mut ctx = Context::new(started);
            ctx.id = RecordId::new(format!("ctx-{}", i));
            ctx.name = Some("level".to_string());
            ctx.status = Some(ContextStatus::Ended);
            ctx.time_ended = Some(started + 3 * MINUTE);
            ctx.user_id = Some("player".to_string());
            ctx.user_payload = Some(payload());
            ctx.data.insert("someNumber".to_string(), json!(i));
            ctx
        })
        .collect()
}

/// One event per context, `data.score` = 10 * i, at the context's start.
pub fn events_for(contexts: &[Context]) -> Vec<Event> {
    contexts
        .iter()
        .enumerate()
        .map(|(i, ctx)| {
            let mut event = Event::new(ctx.time_started, "score");
            event.id = RecordId::new(format!("evt-{}", i));
            event.context_id = Some(ctx.id.clone());
            event.user_payload = Some(payload());
            event.data.insert("score".to_string(), json!(10 * i));
            event
        })
        .collect()
}

pub fn service_over<R: playlog::record::Record>(
    store: Arc<dyn RecordStore<R>>,
) -> QueryService<R> {
    QueryService::new(store, Arc::new(authenticator()), Arc::new(FixedClock(NOW)), GAME)
}

pub fn context_service() -> QueryService<Context> {
    service_over(Arc::new(MemoryRecordStore::from_records(ten_contexts())))
}

pub fn event_service() -> QueryService<Event> {
    service_over(Arc::new(MemoryRecordStore::from_records(events_for(
        &ten_contexts(),
    ))))
}

/// Values of `data.someNumber` in response order.
pub fn some_numbers(records: &[serde_json::Value]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|r| r["data"]["someNumber"].as_i64())
        .collect()
}
