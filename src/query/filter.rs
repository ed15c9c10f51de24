//! Filter documents: the whitelisted query object forwarded to record stores.
//!
//! A filter is a JSON object whose keys are dotted paths or the logical
//! operators `$and`, `$or`, `$nor`. A field maps either to a literal
//! (equality) or to an operator object such as `{"$gte": 5}`.

use super::key_path::resolve;
use crate::error::ApiError;
use serde_json::{Map, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Nor(Vec<FilterExpr>),
    Field { path: String, op: ComparisonOp },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOp {
    Equals(Value),
    NotEquals(Value),
    GreaterThan(Value),
    GreaterOrEqual(Value),
    LessThan(Value),
    LessOrEqual(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Exists(bool),
}

/// Parsed filter document. Top-level clauses are joined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDocument {
    clauses: Vec<FilterExpr>,
    raw: Value,
}

impl Default for FilterDocument {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
            raw: Value::Object(Map::new()),
        }
    }
}

impl FilterDocument {
    /// Filter that matches every record.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Parse a filter from its JSON text. Empty input matches everything.
    pub fn parse_str(input: &str) -> Result<Self, ApiError> {
        if input.trim().is_empty() {
            return Ok(Self::match_all());
        }
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ApiError::MalformedFilter(format!("query is not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Ok(Self::match_all()),
            other => {
                return Err(ApiError::MalformedFilter(format!(
                    "query must be a JSON object, got {}",
                    other
                )))
            }
        };
        Ok(Self {
            clauses: parse_clauses(object)?,
            raw: value.clone(),
        })
    }

    /// The filter as it was received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.clauses.iter().all(|clause| clause.matches(document))
    }
}

impl FilterExpr {
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            FilterExpr::And(exprs) => exprs.iter().all(|e| e.matches(document)),
            FilterExpr::Or(exprs) => exprs.iter().any(|e| e.matches(document)),
            FilterExpr::Nor(exprs) => !exprs.iter().any(|e| e.matches(document)),
            FilterExpr::Field { path, op } => op.evaluate(resolve(document, path)),
        }
    }
}

impl ComparisonOp {
    fn evaluate(&self, value: Option<&Value>) -> bool {
        match self {
            ComparisonOp::Equals(expected) => matches_equal(value, expected),
            ComparisonOp::NotEquals(expected) => !matches_equal(value, expected),
            ComparisonOp::GreaterThan(expected) => {
                matches_ordering(value, expected, |o| o == Ordering::Greater)
            }
            ComparisonOp::GreaterOrEqual(expected) => {
                matches_ordering(value, expected, |o| o != Ordering::Less)
            }
            ComparisonOp::LessThan(expected) => {
                matches_ordering(value, expected, |o| o == Ordering::Less)
            }
            ComparisonOp::LessOrEqual(expected) => {
                matches_ordering(value, expected, |o| o != Ordering::Greater)
            }
            ComparisonOp::In(candidates) => candidates.iter().any(|c| matches_equal(value, c)),
            ComparisonOp::NotIn(candidates) => !candidates.iter().any(|c| matches_equal(value, c)),
            ComparisonOp::Exists(expected) => value.is_some() == *expected,
        }
    }
}

fn parse_clauses(object: &Map<String, Value>) -> Result<Vec<FilterExpr>, ApiError> {
    let mut clauses = Vec::with_capacity(object.len());
    for (key, value) in object {
        match key.as_str() {
            "$and" => clauses.push(FilterExpr::And(parse_logical(key, value)?)),
            "$or" => clauses.push(FilterExpr::Or(parse_logical(key, value)?)),
            "$nor" => clauses.push(FilterExpr::Nor(parse_logical(key, value)?)),
            other if other.starts_with('$') => {
                return Err(ApiError::MalformedFilter(format!(
                    "unsupported top-level operator {}",
                    other
                )))
            }
            path => clauses.extend(parse_field(path, value)?),
        }
    }
    Ok(clauses)
}

fn parse_logical(operator: &str, value: &Value) -> Result<Vec<FilterExpr>, ApiError> {
    let items = value.as_array().ok_or_else(|| {
        ApiError::MalformedFilter(format!("{} expects an array of filters", operator))
    })?;
    if items.is_empty() {
        return Err(ApiError::MalformedFilter(format!(
            "{} expects at least one filter",
            operator
        )));
    }
    items
        .iter()
        .map(|item| match item {
            Value::Object(object) => Ok(FilterExpr::And(parse_clauses(object)?)),
            other => Err(ApiError::MalformedFilter(format!(
                "{} entries must be objects, got {}",
                operator, other
            ))),
        })
        .collect()
}

fn parse_field(path: &str, value: &Value) -> Result<Vec<FilterExpr>, ApiError> {
    if path.is_empty() {
        return Err(ApiError::MalformedFilter("empty field path".to_string()));
    }
    let field = |op| FilterExpr::Field {
        path: path.to_string(),
        op,
    };
    match value {
        Value::Object(object) if is_operator_object(object) => object
            .iter()
            .map(|(operator, operand)| parse_operator(path, operator, operand).map(field))
            .collect(),
        literal => Ok(vec![field(ComparisonOp::Equals(literal.clone()))]),
    }
}

fn is_operator_object(object: &Map<String, Value>) -> bool {
    !object.is_empty() && object.keys().all(|k| k.starts_with('$'))
}

fn parse_operator(path: &str, operator: &str, operand: &Value) -> Result<ComparisonOp, ApiError> {
    let op = match operator {
        "$eq" => ComparisonOp::Equals(operand.clone()),
        "$ne" => ComparisonOp::NotEquals(operand.clone()),
        "$gt" => ComparisonOp::GreaterThan(operand.clone()),
        "$gte" => ComparisonOp::GreaterOrEqual(operand.clone()),
        "$lt" => ComparisonOp::LessThan(operand.clone()),
        "$lte" => ComparisonOp::LessOrEqual(operand.clone()),
        "$in" | "$nin" => {
            let candidates = operand.as_array().cloned().ok_or_else(|| {
                ApiError::MalformedFilter(format!("{} on '{}' expects an array", operator, path))
            })?;
            if operator == "$in" {
                ComparisonOp::In(candidates)
            } else {
                ComparisonOp::NotIn(candidates)
            }
        }
        "$exists" => match operand {
            Value::Bool(flag) => ComparisonOp::Exists(*flag),
            Value::Number(n) => ComparisonOp::Exists(n.as_f64().unwrap_or(0.0) != 0.0),
            other => {
                return Err(ApiError::MalformedFilter(format!(
                    "$exists on '{}' expects a boolean, got {}",
                    path, other
                )))
            }
        },
        other => {
            return Err(ApiError::MalformedFilter(format!(
                "unsupported operator {} on '{}'",
                other, path
            )))
        }
    };
    Ok(op)
}

/// Equality with array fields matching when any element is equal.
fn matches_equal(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| scalar_equal(item, expected))
        }
        Some(actual) => scalar_equal(actual, expected),
    }
}

fn scalar_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

fn matches_ordering(
    value: Option<&Value>,
    expected: &Value,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| same_type_cmp(item, expected).map(&accept).unwrap_or(false)),
        Some(actual) => same_type_cmp(actual, expected).map(&accept).unwrap_or(false),
        None => false,
    }
}

fn same_type_cmp(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
