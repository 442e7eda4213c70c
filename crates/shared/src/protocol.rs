use serde_json::Value;

use crate::{
    domain::{Payload, Record},
    error::PayloadError,
};

/// Path of the data endpoint, relative to the server origin.
pub const DATA_PATH: &str = "/data";

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses a response body into an ordered payload.
///
/// The body must be a JSON array whose elements are objects with exactly one
/// key. A single bad element rejects the whole payload.
pub fn parse_payload(text: &str) -> Result<Payload, PayloadError> {
    let value: Value = serde_json::from_str(text)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(PayloadError::NotAnArray {
                found: kind_of(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) if map.len() == 1 => {
                let (title, value) = map.into_iter().next().ok_or(PayloadError::InvalidRecord {
                    index,
                    keys: 0,
                })?;
                Ok(Record::new(title, value))
            }
            Value::Object(map) => Err(PayloadError::InvalidRecord {
                index,
                keys: map.len(),
            }),
            _ => Err(PayloadError::InvalidRecord { index, keys: 0 }),
        })
        .collect()
}
