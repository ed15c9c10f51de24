//! Sort specifications and the total order used to sort record documents.

use super::key_path::resolve;
use crate::error::ApiError;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordered list of (dotted key, direction) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortDirection)>,
}

impl Default for SortSpec {
    /// `{time: asc}`
    fn default() -> Self {
        Self {
            keys: vec![("time".to_string(), SortDirection::Ascending)],
        }
    }
}

impl SortSpec {
    pub fn new(keys: Vec<(String, SortDirection)>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    /// Parse a sort parameter.
    ///
    /// Accepts a JSON object (`{"data.someNumber": -1}`, values `1`, `-1`,
    /// `"asc"`, `"desc"`, `"ascending"`, `"descending"`) or a list of keys
    /// separated by commas or spaces, each optionally prefixed with `+` or
    /// `-`. Blank input yields the default.
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if trimmed.starts_with('{') {
            return Self::parse_json(trimmed);
        }

        let keys = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (direction, key) = match part.as_bytes()[0] {
                    b'-' => (SortDirection::Descending, &part[1..]),
                    b'+' => (SortDirection::Ascending, &part[1..]),
                    _ => (SortDirection::Ascending, part),
                };
                if key.is_empty() {
                    Err(ApiError::InvalidSort(format!("missing key in '{}'", part)))
                } else {
                    Ok((key.to_string(), direction))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { keys })
    }

    fn parse_json(input: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ApiError::InvalidSort(format!("sort is not valid JSON: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| ApiError::InvalidSort("sort must be a JSON object".to_string()))?;
        let keys = object
            .iter()
            .map(|(key, direction)| Ok((key.clone(), parse_direction(key, direction)?)))
            .collect::<Result<Vec<_>, ApiError>>()?;
        if keys.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { keys })
    }

    /// Compare two record documents under this specification.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (key, direction) in &self.keys {
            let ordering = compare_values(resolve(a, key), resolve(b, key));
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable sort of `items` by the documents `doc_of` yields.
    pub fn sort_by_document<T>(&self, items: &mut [T], doc_of: impl Fn(&T) -> &Value) {
        items.sort_by(|a, b| self.compare(doc_of(a), doc_of(b)));
    }
}

fn parse_direction(key: &str, direction: &Value) -> Result<SortDirection, ApiError> {
    match direction {
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(SortDirection::Ascending),
        Value::Number(n) if n.as_f64() == Some(-1.0) => Ok(SortDirection::Descending),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(ApiError::InvalidSort(format!(
                "invalid direction '{}' for '{}'",
                s, key
            ))),
        },
        other => Err(ApiError::InvalidSort(format!(
            "invalid direction {} for '{}'",
            other, key
        ))),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional JSON values: absent/null < numbers < strings <
/// objects < arrays < booleans. Objects and arrays of equal rank compare equal.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
