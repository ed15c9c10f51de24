//! Sum, average and count over the records a caller may see.

use super::codec::{AggregationKind, AggregationRequest};
use super::filter::FilterDocument;
use super::key_path::resolve_present;
use crate::access::Identity;
use crate::error::ApiError;
use crate::record::Record;
use crate::store::RecordStore;
use crate::types::Timestamp;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Result of an aggregation, serialized as `{"sum": n}`, `{"avg": n}` or
/// `{"count": n}`.
///
/// An average over zero records is undefined and serializes as
/// `{"avg": null}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationResult {
    Sum(f64),
    Avg(Option<f64>),
    Count(u64),
}

impl AggregationResult {
    pub fn value(&self) -> Option<f64> {
        match self {
            AggregationResult::Sum(sum) => Some(*sum),
            AggregationResult::Avg(avg) => *avg,
            AggregationResult::Count(count) => Some(*count as f64),
        }
    }
}

/// Run `request` against `store` as `identity`.
///
/// Records hidden from the identity are excluded before anything is summed
/// or counted, exactly as they are excluded from listings.
pub fn aggregate<R: Record>(
    request: &AggregationRequest,
    store: &dyn RecordStore<R>,
    identity: &Identity,
    game: &str,
    now: Timestamp,
) -> Result<AggregationResult, ApiError> {
    let filter = FilterDocument::from_value(&request.query)?;
    let visible = store.find_visible(&filter, now, identity, game)?;
    debug!(
        collection = R::COLLECTION,
        kind = ?request.kind,
        visible = visible.len(),
        "Aggregating records"
    );

    if request.kind == AggregationKind::Count {
        return Ok(AggregationResult::Count(visible.len() as u64));
    }
    let documents: Vec<Value> = visible
        .iter()
        .map(|record| record.listing_document(now))
        .collect();
    aggregate_documents(request.kind, request.key.as_deref(), &documents)
}

/// Aggregate over already visible documents.
pub fn aggregate_documents(
    kind: AggregationKind,
    key: Option<&str>,
    documents: &[Value],
) -> Result<AggregationResult, ApiError> {
    match kind {
        AggregationKind::Count => Ok(AggregationResult::Count(documents.len() as u64)),
        AggregationKind::Sum => Ok(AggregationResult::Sum(sum_key(
            required_key(kind, key)?,
            documents,
        )?)),
        AggregationKind::Avg => {
            let key = required_key(kind, key)?;
            let sum = sum_key(key, documents)?;
            if documents.is_empty() {
                warn!(key, "Average over zero visible records is undefined");
                Ok(AggregationResult::Avg(None))
            } else {
                Ok(AggregationResult::Avg(Some(sum / documents.len() as f64)))
            }
        }
    }
}

fn required_key(kind: AggregationKind, key: Option<&str>) -> Result<&str, ApiError> {
    key.filter(|k| !k.is_empty()).ok_or_else(|| {
        ApiError::UnsupportedAggregationKind(format!("{:?} aggregation requires a key", kind))
    })
}

fn sum_key(key: &str, documents: &[Value]) -> Result<f64, ApiError> {
    let mut sum = 0.0;
    for document in documents {
        match resolve_present(document, key) {
            None => {}
            Some(Value::Number(n)) => sum += n.as_f64().unwrap_or(0.0),
            Some(_) => {
                let record = document
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown>")
                    .to_string();
                return Err(ApiError::NonNumericValue {
                    key: key.to_string(),
                    record,
                });
            }
        }
    }
    Ok(sum)
}
