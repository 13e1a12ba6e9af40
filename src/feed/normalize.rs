// src/feed/normalize.rs
//! Payload shape handling shared by every feed.
//!
//! Backends return either a JSON array or a key → value mapping. Both are
//! accepted; a mapping becomes an ordered list of `{key, value}` pairs in the
//! order the backend sent them.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::feed::types::SummaryPoint;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected an array or mapping, got {0}")]
    NotACollection(&'static str),
    #[error("record {index} is invalid: {reason}")]
    Record { index: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Items(Vec<Value>),
    Pairs(Vec<KeyValue>),
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn classify(value: Value) -> Result<Payload, ShapeError> {
    match value {
        Value::Array(items) => Ok(Payload::Items(items)),
        Value::Object(map) => Ok(Payload::Pairs(
            map.into_iter()
                .map(|(key, value)| KeyValue { key, value })
                .collect(),
        )),
        other => Err(ShapeError::NotACollection(kind_of(&other))),
    }
}

fn decode<T: DeserializeOwned>(index: usize, v: Value) -> Result<T, ShapeError> {
    serde_json::from_value(v).map_err(|e| ShapeError::Record {
        index,
        reason: e.to_string(),
    })
}

/// Deserialize every element of an array, or every value of a mapping.
pub fn records_of<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ShapeError> {
    let values = match classify(value)? {
        Payload::Items(items) => items,
        Payload::Pairs(pairs) => pairs.into_iter().map(|kv| kv.value).collect(),
    };
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| decode(i, v))
        .collect()
}

/// Summary payloads come as `{"2025-05-30T21:45:00": 3, ...}` or as an array
/// of `{time, count}` objects.
pub fn summary_points(value: Value) -> Result<Vec<SummaryPoint>, ShapeError> {
    match classify(value)? {
        Payload::Items(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| decode(i, v))
            .collect(),
        Payload::Pairs(pairs) => pairs
            .into_iter()
            .enumerate()
            .map(|(i, kv)| {
                Ok(SummaryPoint {
                    time: kv.key,
                    count: decode(i, kv.value)?,
                })
            })
            .collect(),
    }
}

pub fn reconstruction_errors(value: Value) -> Result<Vec<f64>, ShapeError> {
    records_of(value)
}
