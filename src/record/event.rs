//! Event records: point-in-time occurrences tied to a context.

use super::{Record, UserPayload};
use crate::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default = "RecordId::generate")]
    pub id: RecordId,

    pub time: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Weak reference to the owning context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_payload: Option<UserPayload>,

    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data_version: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<i64>,
}

impl Event {
    pub fn new(time: Timestamp, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::generate(),
            time,
            name: Some(name.into()),
            context_id: None,
            user_id: None,
            user_payload: None,
            data: Map::new(),
            event_data_version: None,
            game_version: None,
        }
    }
}

impl Record for Event {
    const COLLECTION: &'static str = "events";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn user_payload(&self) -> Option<&UserPayload> {
        self.user_payload.as_ref()
    }
}
