//! In-memory document store.
//!
//! This module provides an in-process implementation of the [`DocumentStore`]
//! trait. It backs local development runs and the workflow test suites, and
//! it honors the same contract as the remote store: equality and range
//! filters, field-level operations including nested paths and server
//! timestamps, and all-or-nothing batches.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::services::{
    BoxFuture, Document, DocumentFields, DocumentStore, FieldOp, Filter, FilterOp, WriteOp,
};

/// Errors produced by the in-memory store.
#[derive(Error, Debug)]
pub enum MemoryStoreError {
    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },
    #[error("Field at {path} is not numeric")]
    NotNumeric { path: String },
    #[error("Field path {path} passes through a non-object value")]
    BadPath { path: String },
}

type Collections = HashMap<String, BTreeMap<String, DocumentFields>>;

/// An in-memory [`DocumentStore`].
///
/// All state lives behind one mutex, which also gives `atomic_batch` its
/// all-or-nothing semantics: a batch validates every write against a copy of
/// the state and only then swaps the copy in.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current server time as stored in timestamp fields.
    fn server_time() -> Value {
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    fn apply_field_op(
        fields: &mut DocumentFields,
        op: &FieldOp,
    ) -> Result<(), MemoryStoreError> {
        match op {
            FieldOp::Set { path, value } => set_path(fields, path, value.clone()),
            FieldOp::ServerTime { path } => set_path(fields, path, Self::server_time()),
            FieldOp::Increment { path, amount } => {
                let current = match get_path(fields, path) {
                    Some(Value::Number(n)) => {
                        n.as_i64().ok_or_else(|| MemoryStoreError::NotNumeric {
                            path: path.clone(),
                        })?
                    }
                    Some(Value::Null) | None => 0,
                    Some(_) => {
                        return Err(MemoryStoreError::NotNumeric { path: path.clone() });
                    }
                };
                set_path(fields, path, Value::from(current + amount))
            }
        }
    }

    fn apply_write(
        collections: &mut Collections,
        op: &WriteOp,
    ) -> Result<(), MemoryStoreError> {
        match op {
            WriteOp::Set {
                collection,
                key,
                fields,
            } => {
                collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(key.clone(), fields.clone());
                Ok(())
            }
            WriteOp::UpdateFields {
                collection,
                key,
                ops,
            } => {
                let doc = collections
                    .get_mut(collection)
                    .and_then(|c| c.get_mut(key))
                    .ok_or_else(|| MemoryStoreError::NotFound {
                        collection: collection.clone(),
                        key: key.clone(),
                    })?;
                for op in ops {
                    Self::apply_field_op(doc, op)?;
                }
                Ok(())
            }
            WriteOp::Delete { collection, key } => {
                if let Some(c) = collections.get_mut(collection) {
                    c.remove(key);
                }
                Ok(())
            }
        }
    }
}

/// Follow a dotted path into nested objects.
fn get_path<'a>(fields: &'a DocumentFields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = fields.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a dotted path, creating intermediate objects as needed.
///
/// An explicit `Value::Null` is stored as a null entry, not removed; the
/// like-map tombstone semantics depend on that distinction.
fn set_path(
    fields: &mut DocumentFields,
    path: &str,
    value: Value,
) -> Result<(), MemoryStoreError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() == 1 {
        fields.insert(path.to_string(), value);
        return Ok(());
    }

    let mut current = fields
        .entry(segments[0].to_string())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    for segment in &segments[1..segments.len() - 1] {
        let map = current
            .as_object_mut()
            .ok_or_else(|| MemoryStoreError::BadPath {
                path: path.to_string(),
            })?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    let map = current
        .as_object_mut()
        .ok_or_else(|| MemoryStoreError::BadPath {
            path: path.to_string(),
        })?;
    map.insert(segments[segments.len() - 1].to_string(), value);
    Ok(())
}

/// Compare two values for a range filter.
///
/// Numbers compare numerically; strings that both parse as RFC 3339
/// timestamps compare as instants; anything else compares as raw strings.
fn at_least(candidate: &Value, bound: &Value) -> bool {
    if let (Some(a), Some(b)) = (candidate.as_i64(), bound.as_i64()) {
        return a >= b;
    }
    if let (Some(a), Some(b)) = (candidate.as_f64(), bound.as_f64()) {
        return a >= b;
    }
    if let (Some(a), Some(b)) = (candidate.as_str(), bound.as_str()) {
        if let (Ok(a), Ok(b)) = (
            DateTime::parse_from_rfc3339(a),
            DateTime::parse_from_rfc3339(b),
        ) {
            return a >= b;
        }
        return a >= b;
    }
    false
}

fn matches(fields: &DocumentFields, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let candidate = get_path(fields, &filter.field);
        match filter.op {
            FilterOp::Equal => candidate == Some(&filter.value),
            FilterOp::GreaterThanOrEqual => {
                candidate.is_some_and(|c| at_least(c, &filter.value))
            }
        }
    })
}

impl DocumentStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, collection: &str, key: &str) -> BoxFuture<'_, Option<Document>, Self::Error> {
        let doc = self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|c| c.get(key))
            .map(|fields| Document::new(key, fields.clone()));
        Box::pin(async move { Ok(doc) })
    }

    fn query(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'_, Vec<Document>, Self::Error> {
        let docs = self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|c| {
                c.iter()
                    .filter(|(_, fields)| matches(fields, &filters))
                    .map(|(key, fields)| Document::new(key.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Box::pin(async move { Ok(docs) })
    }

    fn create(
        &self,
        collection: &str,
        mut fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, String, Self::Error> {
        let key = Uuid::new_v4().to_string();
        for field in &server_time_fields {
            fields.insert(field.clone(), Self::server_time());
        }
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(key.clone(), fields);
        Box::pin(async move { Ok(key) })
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        mut fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, (), Self::Error> {
        for field in &server_time_fields {
            fields.insert(field.clone(), Self::server_time());
        }
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), fields);
        Box::pin(async move { Ok(()) })
    }

    fn update_fields(
        &self,
        collection: &str,
        key: &str,
        ops: Vec<FieldOp>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let result = Self::apply_write(
            &mut self.collections.lock().unwrap(),
            &WriteOp::UpdateFields {
                collection: collection.to_string(),
                key: key.to_string(),
                ops,
            },
        );
        Box::pin(async move { result })
    }

    fn delete_document(&self, collection: &str, key: &str) -> BoxFuture<'_, (), Self::Error> {
        if let Some(c) = self.collections.lock().unwrap().get_mut(collection) {
            c.remove(key);
        }
        Box::pin(async move { Ok(()) })
    }

    fn atomic_batch(&self, ops: Vec<WriteOp>) -> BoxFuture<'_, (), Self::Error> {
        let mut collections = self.collections.lock().unwrap();
        // Apply against a copy; swap in only if every write succeeds.
        let mut staged = collections.clone();
        let mut result = Ok(());
        for op in &ops {
            if let Err(err) = Self::apply_write(&mut staged, op) {
                result = Err(err);
                break;
            }
        }
        if result.is_ok() {
            *collections = staged;
        }
        Box::pin(async move { result })
    }
}
