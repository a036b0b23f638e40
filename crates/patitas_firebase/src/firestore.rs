//! Firestore document store client.
//!
//! This module implements the [`DocumentStore`] contract over the Firestore
//! REST API. Reads use the documents and `runQuery` endpoints; every write
//! goes through `commit`, whose multi-write form is what gives
//! [`DocumentStore::atomic_batch`] its all-or-nothing semantics. Numeric
//! increments and server-assigned timestamps are expressed as field
//! transforms so the server applies them, never a client clock.

use patitas_common::http::client::HTTP_CLIENT;
use patitas_common::services::{
    BoxFuture, Document, DocumentFields, DocumentStore, FieldOp, Filter, FilterOp, WriteOp,
};
use patitas_config::FirebaseConfig;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{get_google_auth_token, FIRESTORE_SCOPE};
use crate::value::{decode_fields, encode_fields, encode_value, ValueError};

/// Errors that can occur when interacting with Firestore.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Error during authentication with Google
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the Firestore API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the Firestore API
    #[error("Firestore API error: {0}")]
    ApiError(String),

    /// A document that came back from the API could not be decoded
    #[error("Failed to decode document: {0}")]
    DecodeError(#[from] ValueError),
}

/// Client for the Firestore REST API.
pub struct FirestoreClient {
    /// HTTP client for making requests to the Firestore API
    client: Client,

    /// Configuration for Firebase, including project ID and service account key path
    config: FirebaseConfig,
}

impl FirestoreClient {
    /// Creates a new Firestore client with the given configuration.
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
        }
    }

    /// `projects/{project}/databases/(default)/documents`
    fn documents_path(&self) -> Result<String, FirestoreError> {
        let project_id = self.config.project_id.as_deref().ok_or_else(|| {
            FirestoreError::ConfigError("Missing project_id in FirebaseConfig".to_string())
        })?;
        Ok(format!(
            "projects/{}/databases/(default)/documents",
            project_id
        ))
    }

    fn base_url(&self) -> Result<String, FirestoreError> {
        Ok(format!(
            "https://firestore.googleapis.com/v1/{}",
            self.documents_path()?
        ))
    }

    fn document_name(&self, collection: &str, key: &str) -> Result<String, FirestoreError> {
        Ok(format!("{}/{}/{}", self.documents_path()?, collection, key))
    }

    async fn token(&self) -> Result<String, FirestoreError> {
        get_google_auth_token(&self.config, FIRESTORE_SCOPE)
            .await
            .map_err(|e| FirestoreError::AuthError(e.to_string()))
    }

    async fn get_doc(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let url = format!("{}/{}/{}", self.base_url()?, collection, key);
        let token = self.token().await?;

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(response.text().await?));
        }

        let body: Value = response.json().await?;
        Ok(Some(decode_document(&body)?))
    }

    async fn run_query(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = format!("{}:runQuery", self.base_url()?);
        let token = self.token().await?;

        let body = json!({ "structuredQuery": build_structured_query(collection, &filters) });
        debug!("Running Firestore query on {}", collection);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(response.text().await?));
        }

        let results: Vec<Value> = response.json().await?;
        let mut documents = Vec::new();
        for result in &results {
            // Result batches may carry readTime-only entries with no document.
            if let Some(doc) = result.get("document") {
                documents.push(decode_document(doc)?);
            }
        }
        Ok(documents)
    }

    async fn commit(&self, writes: Vec<Value>) -> Result<(), FirestoreError> {
        let url = format!("{}:commit", self.base_url()?);
        let token = self.token().await?;

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&json!({ "writes": writes }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(response.text().await?));
        }
        Ok(())
    }

    fn write_for(&self, op: &WriteOp) -> Result<Value, FirestoreError> {
        match op {
            WriteOp::Set {
                collection,
                key,
                fields,
            } => Ok(json!({
                "update": {
                    "name": self.document_name(collection, key)?,
                    "fields": encode_fields(fields),
                }
            })),
            WriteOp::UpdateFields {
                collection,
                key,
                ops,
            } => {
                let name = self.document_name(collection, key)?;
                Ok(build_update_write(&name, ops))
            }
            WriteOp::Delete { collection, key } => Ok(json!({
                "delete": self.document_name(collection, key)?,
            })),
        }
    }
}

/// Extract the key from a full `projects/.../documents/{collection}/{key}` name.
fn key_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

fn decode_document(doc: &Value) -> Result<Document, FirestoreError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| FirestoreError::ApiError("document without a name".to_string()))?;
    let fields = decode_fields(doc.get("fields").unwrap_or(&Value::Null))?;
    Ok(Document::new(key_from_name(name), fields))
}

/// Build the `structuredQuery` body for an AND of field filters.
pub(crate) fn build_structured_query(collection: &str, filters: &[Filter]) -> Value {
    let mut query = json!({ "from": [{ "collectionId": collection }] });

    let encoded: Vec<Value> = filters
        .iter()
        .map(|filter| {
            let op = match filter.op {
                FilterOp::Equal => "EQUAL",
                FilterOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            };
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": op,
                    "value": encode_value(&filter.value),
                }
            })
        })
        .collect();

    match encoded.len() {
        0 => {}
        1 => {
            query["where"] = encoded.into_iter().next().unwrap();
        }
        _ => {
            query["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": encoded }
            });
        }
    }
    query
}

/// Build one `commit` write for a set of field operations.
///
/// Literal sets travel in the masked update document; increments and server
/// timestamps travel as field transforms. The `exists` precondition keeps a
/// partial update from resurrecting a deleted document.
pub(crate) fn build_update_write(name: &str, ops: &[FieldOp]) -> Value {
    let mut fields = Map::new();
    let mut mask: Vec<String> = Vec::new();
    let mut transforms: Vec<Value> = Vec::new();

    for op in ops {
        match op {
            FieldOp::Set { path, value } => {
                merge_nested(&mut fields, path, encode_value(value));
                mask.push(path.clone());
            }
            FieldOp::Increment { path, amount } => {
                transforms.push(json!({
                    "fieldPath": path,
                    "increment": { "integerValue": amount.to_string() },
                }));
            }
            FieldOp::ServerTime { path } => {
                transforms.push(json!({
                    "fieldPath": path,
                    "setToServerValue": "REQUEST_TIME",
                }));
            }
        }
    }

    let mut write = json!({
        "update": { "name": name, "fields": fields },
        "updateMask": { "fieldPaths": mask },
        "currentDocument": { "exists": true },
    });
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }
    write
}

/// Merge one dotted path into an encoded Firestore `fields` map.
fn merge_nested(fields: &mut Map<String, Value>, path: &str, encoded: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = fields;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), encoded);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| json!({ "mapValue": { "fields": {} } }));
        current = entry["mapValue"]["fields"]
            .as_object_mut()
            .expect("intermediate path segments are map values");
    }
}

impl DocumentStore for FirestoreClient {
    type Error = FirestoreError;

    fn get(&self, collection: &str, key: &str) -> BoxFuture<'_, Option<Document>, Self::Error> {
        let collection = collection.to_string();
        let key = key.to_string();
        Box::pin(async move { self.get_doc(&collection, &key).await })
    }

    fn query(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'_, Vec<Document>, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move { self.run_query(&collection, filters).await })
    }

    fn create(
        &self,
        collection: &str,
        fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, String, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            // Keys are generated client-side, like the vendor SDKs do; the
            // exists precondition turns an id collision into an API error
            // instead of an overwrite.
            let key = Uuid::new_v4().simple().to_string();
            let name = self.document_name(&collection, &key)?;

            let transforms: Vec<Value> = server_time_fields
                .iter()
                .map(|path| {
                    json!({ "fieldPath": path, "setToServerValue": "REQUEST_TIME" })
                })
                .collect();

            let mut write = json!({
                "update": { "name": name, "fields": encode_fields(&fields) },
                "currentDocument": { "exists": false },
            });
            if !transforms.is_empty() {
                write["updateTransforms"] = Value::Array(transforms);
            }

            self.commit(vec![write]).await?;
            Ok(key)
        })
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let op = WriteOp::Set {
            collection: collection.to_string(),
            key: key.to_string(),
            fields,
        };
        Box::pin(async move {
            let mut write = self.write_for(&op)?;
            if !server_time_fields.is_empty() {
                let transforms: Vec<Value> = server_time_fields
                    .iter()
                    .map(|path| {
                        json!({ "fieldPath": path, "setToServerValue": "REQUEST_TIME" })
                    })
                    .collect();
                write["updateTransforms"] = Value::Array(transforms);
            }
            self.commit(vec![write]).await
        })
    }

    fn update_fields(
        &self,
        collection: &str,
        key: &str,
        ops: Vec<FieldOp>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let op = WriteOp::UpdateFields {
            collection: collection.to_string(),
            key: key.to_string(),
            ops,
        };
        Box::pin(async move {
            let write = self.write_for(&op)?;
            self.commit(vec![write]).await
        })
    }

    fn delete_document(&self, collection: &str, key: &str) -> BoxFuture<'_, (), Self::Error> {
        let op = WriteOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        };
        Box::pin(async move {
            let write = self.write_for(&op)?;
            self.commit(vec![write]).await
        })
    }

    fn atomic_batch(&self, ops: Vec<WriteOp>) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            let writes = ops
                .iter()
                .map(|op| self.write_for(op))
                .collect::<Result<Vec<_>, _>>()?;
            self.commit(writes).await
        })
    }
}
