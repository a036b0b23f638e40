//! Firestore value mapping.
//!
//! Firestore's REST API wraps every field in a typed envelope
//! (`{"stringValue": ...}`, `{"integerValue": "5"}`, ...). This module
//! converts between those envelopes and the JSON data model the rest of the
//! application works with, so that only this crate ever sees the wire shape.
//!
//! Convention: strings that parse as RFC 3339 instants are written as
//! `timestampValue` so that range queries on creation times compare as
//! instants server-side; they decode back to RFC 3339 strings.

use chrono::DateTime;
use patitas_common::services::DocumentFields;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors produced while decoding Firestore documents.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Unsupported Firestore value: {0}")]
    Unsupported(String),
    #[error("Malformed Firestore value: {0}")]
    Malformed(String),
}

/// Encode one JSON value into its Firestore envelope.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore carries 64-bit integers as decimal strings.
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => {
            if DateTime::parse_from_rfc3339(s).is_ok() {
                json!({ "timestampValue": s })
            } else {
                json!({ "stringValue": s })
            }
        }
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let mut fields = Map::new();
            for (key, value) in map {
                fields.insert(key.clone(), encode_value(value));
            }
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Encode a full field map into the Firestore `fields` object.
pub fn encode_fields(fields: &DocumentFields) -> Value {
    let mut encoded = Map::new();
    for (key, value) in fields {
        encoded.insert(key.clone(), encode_value(value));
    }
    Value::Object(encoded)
}

/// Decode one Firestore envelope back into a JSON value.
pub fn decode_value(value: &Value) -> Result<Value, ValueError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValueError::Malformed(value.to_string()))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| ValueError::Malformed("empty value envelope".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "integerValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| ValueError::Malformed("integerValue must be a string".into()))?;
            let parsed: i64 = raw
                .parse()
                .map_err(|_| ValueError::Malformed(format!("bad integerValue: {raw}")))?;
            Ok(Value::from(parsed))
        }
        "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array);
            let mut items = Vec::new();
            if let Some(values) = values {
                for value in values {
                    items.push(decode_value(value)?);
                }
            }
            Ok(Value::Array(items))
        }
        "mapValue" => {
            let mut map = Map::new();
            if let Some(fields) = inner.get("fields").and_then(Value::as_object) {
                for (key, value) in fields {
                    map.insert(key.clone(), decode_value(value)?);
                }
            }
            Ok(Value::Object(map))
        }
        other => Err(ValueError::Unsupported(other.to_string())),
    }
}

/// Decode a Firestore `fields` object into a field map.
pub fn decode_fields(fields: &Value) -> Result<DocumentFields, ValueError> {
    let mut decoded = DocumentFields::new();
    if let Some(fields) = fields.as_object() {
        for (key, value) in fields {
            decoded.insert(key.clone(), decode_value(value)?);
        }
    }
    Ok(decoded)
}

