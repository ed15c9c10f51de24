//! Record model: contexts, events, and the JSON documents queries run against.
//!
//! Records are created by an external ingestion path and are read-only here.
//! Filtering, sorting, key resolution and aggregation all operate on a
//! record's *document*: its camelCase wire form, plus derived fields such as
//! a context's `duration`.

pub mod context;
pub mod duration;
pub mod event;

pub use context::{Context, ContextStatus};
pub use duration::{compute_duration, effective_end, LifecycleRule, Lifecycle};
pub use event::Event;

use crate::error::ApiError;
use crate::types::{GroupId, RecordId, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Per-record information about the user who logged it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Value>>,

    /// Groups under which the record was logged. Absent or empty means the
    /// record is unscoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_groups: Option<Vec<Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserPayload {
    pub fn with_selected_groups<I, V>(groups: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            selected_groups: Some(groups.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Selected groups normalized to [`GroupId`]s. Entries that are not
    /// scalars are skipped.
    pub fn selected_group_ids(&self) -> Vec<GroupId> {
        self.selected_groups
            .iter()
            .flatten()
            .filter_map(GroupId::from_value)
            .collect()
    }
}

/// A queryable record kind stored in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also used as the response key for list results.
    const COLLECTION: &'static str;

    fn id(&self) -> &RecordId;

    fn user_payload(&self) -> Option<&UserPayload>;

    /// JSON document of this record as seen at `now`.
    ///
    /// Derived fields are computed here; a record whose derived fields are
    /// inconsistent reports `DataIntegrity`.
    fn document(&self, now: Timestamp) -> Result<Value, ApiError> {
        let _ = now;
        serde_json::to_value(self).map_err(|e| {
            ApiError::DataIntegrity(format!("record {} is not serializable: {}", self.id(), e))
        })
    }

    /// Document used for matching, listing and aggregating many records.
    ///
    /// Unlike [`Record::document`] this never fails: derived fields that
    /// cannot be computed are left out and the record is logged, so one
    /// inconsistent record does not fail a whole listing.
    fn listing_document(&self, now: Timestamp) -> Value {
        match self.document(now) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    collection = Self::COLLECTION,
                    id = %self.id(),
                    error = %e,
                    "Derived fields omitted from document"
                );
                serde_json::to_value(self).unwrap_or(Value::Null)
            }
        }
    }
}
