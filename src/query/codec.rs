//! Deferred aggregation requests and their opaque query ids.
//!
//! Submitting an aggregation hands back a query id; resolving the id later
//! runs the aggregation. No job is queued in between: the id is the request
//! itself, base64-encoded JSON, and resolution performs the whole computation
//! inline. The two-step contract is kept for clients that already speak it.

use crate::error::ApiError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Sum,
    Avg,
    Count,
}

impl AggregationKind {
    pub fn parse(kind: &str) -> Result<Self, ApiError> {
        match kind {
            "sum" => Ok(AggregationKind::Sum),
            "avg" => Ok(AggregationKind::Avg),
            "count" => Ok(AggregationKind::Count),
            other => Err(ApiError::UnsupportedAggregationKind(format!(
                "unknown aggregation type '{}' (expected sum, avg or count)",
                other
            ))),
        }
    }

    pub fn requires_key(self) -> bool {
        !matches!(self, AggregationKind::Count)
    }
}

/// Aggregation over the records matching `query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRequest {
    #[serde(rename = "type")]
    pub kind: AggregationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub query: Value,
}

/// Unvalidated wire shape; `type` stays a string so unknown kinds can be
/// reported as such rather than as undecodable JSON.
#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    key: Option<String>,
    #[serde(default = "empty_query")]
    query: Value,
}

/// A request without `query` matches everything; an explicit `null` is kept
/// as sent.
fn empty_query() -> Value {
    Value::Object(Default::default())
}

impl AggregationRequest {
    pub fn new(kind: AggregationKind, key: Option<String>, query: Value) -> Result<Self, ApiError> {
        if kind.requires_key() && key.as_deref().map_or(true, str::is_empty) {
            return Err(ApiError::UnsupportedAggregationKind(format!(
                "{:?} aggregation requires a key",
                kind
            )));
        }
        Ok(Self { kind, key, query })
    }

    pub fn count(query: Value) -> Self {
        Self {
            kind: AggregationKind::Count,
            key: None,
            query,
        }
    }

    /// Parse and validate a request from its JSON text.
    pub fn parse_str(input: &str) -> Result<Self, ApiError> {
        let raw: RawRequest = serde_json::from_str(input)
            .map_err(|e| ApiError::MalformedFilter(format!("request is not valid JSON: {}", e)))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawRequest) -> Result<Self, ApiError> {
        let kind = AggregationKind::parse(&raw.kind)?;
        Self::new(kind, raw.key, raw.query)
    }
}

/// Encode a request into its query id.
pub fn encode(request: &AggregationRequest) -> Result<String, ApiError> {
    let json = serde_json::to_string(request).map_err(|e| {
        ApiError::UnsupportedAggregationKind(format!("request cannot be encoded: {}", e))
    })?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decode a query id back into the request it was issued for.
pub fn decode(token: &str) -> Result<AggregationRequest, ApiError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|e| ApiError::MalformedQueryToken(format!("not base64: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ApiError::MalformedQueryToken("not UTF-8".to_string()))?;
    let raw: RawRequest = serde_json::from_str(&text)
        .map_err(|e| ApiError::MalformedQueryToken(format!("not a query request: {}", e)))?;
    AggregationRequest::from_raw(raw)
}
