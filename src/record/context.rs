//! Context records: bounded activity spans that may nest other contexts.

use super::duration::{compute_duration, Lifecycle};
use super::{Record, UserPayload};
use crate::error::ApiError;
use crate::store::RecordStore;
use crate::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Advisory lifecycle status. Never consulted for duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStatus {
    Started,
    Ended,
    Interrupted,
}

/// A bounded activity span.
///
/// `parent_context_id` and `children` are id references into the same
/// collection; following them is an explicit store lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default = "RecordId::generate")]
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContextStatus>,

    pub time_started: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ended: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_interrupted: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_restored: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_context_id: Option<RecordId>,

    #[serde(default)]
    pub children: Vec<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_payload: Option<UserPayload>,

    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_data_version: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<i64>,
}

impl Context {
    /// New active context started at `time_started`.
    pub fn new(time_started: Timestamp) -> Self {
        Self {
            id: RecordId::generate(),
            name: None,
            status: Some(ContextStatus::Started),
            time_started,
            time_ended: None,
            time_interrupted: None,
            time_restored: None,
            parent_context_id: None,
            children: Vec::new(),
            user_id: None,
            user_payload: None,
            data: Map::new(),
            context_data_version: None,
            game_version: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle {
            started: self.time_started,
            ended: self.time_ended,
            interrupted: self.time_interrupted,
            restored: self.time_restored,
        }
    }

    /// Elapsed milliseconds at `now`.
    pub fn duration(&self, now: Timestamp) -> Result<i64, ApiError> {
        compute_duration(&self.lifecycle(), now).map_err(|e| match e {
            ApiError::DataIntegrity(msg) => {
                ApiError::DataIntegrity(format!("context {}: {}", self.id, msg))
            }
            other => other,
        })
    }
}

impl Record for Context {
    const COLLECTION: &'static str = "contexts";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn user_payload(&self) -> Option<&UserPayload> {
        self.user_payload.as_ref()
    }

    fn document(&self, now: Timestamp) -> Result<Value, ApiError> {
        let duration = self.duration(now)?;
        let mut doc = serde_json::to_value(self).map_err(|e| {
            ApiError::DataIntegrity(format!("context {} is not serializable: {}", self.id, e))
        })?;
        if let Value::Object(map) = &mut doc {
            map.insert("duration".to_string(), Value::from(duration));
        }
        Ok(doc)
    }
}

/// Child contexts of `context`, in the order they are listed.
///
/// Dangling child ids are skipped.
pub fn children_of(
    store: &dyn RecordStore<Context>,
    context: &Context,
) -> Result<Vec<Context>, ApiError> {
    let mut children = Vec::with_capacity(context.children.len());
    for child_id in &context.children {
        match store.get(child_id)? {
            Some(child) => children.push(child),
            None => tracing::debug!(parent = %context.id, child = %child_id, "Dangling child context id"),
        }
    }
    Ok(children)
}

/// Parent context of `context`, if it has one and the parent is stored.
pub fn parent_of(
    store: &dyn RecordStore<Context>,
    context: &Context,
) -> Result<Option<Context>, ApiError> {
    match &context.parent_context_id {
        Some(parent_id) => Ok(store.get(parent_id)?),
        None => Ok(None),
    }
}
