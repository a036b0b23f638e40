// --- File: crates/patitas_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the remote services the
//! workflows depend on: the document store, object storage, and push
//! delivery. The traits allow for dependency injection and easier testing by
//! decoupling the workflow logic from specific implementations.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// The loosely-typed field map of a stored document.
///
/// Values use the JSON data model; each domain crate converts these maps into
/// validated, strongly-typed structs at the persistence boundary and refuses
/// malformed server data instead of letting untyped maps leak into workflow
/// logic.
pub type DocumentFields = BTreeMap<String, Value>;

/// A document returned by the store, with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The document key within its collection.
    pub id: String,
    /// The document's fields.
    pub fields: DocumentFields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: DocumentFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Comparison operator for a query filter.
///
/// Equality covers every lookup in the workflows; the single range operator
/// exists for the "created since start of day" cap query on pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    GreaterThanOrEqual,
}

/// A single field filter of a store query. Filters in one query compose as a
/// logical AND.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// `field == value`
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Equal,
            value: value.into(),
        }
    }

    /// `field >= value`
    pub fn at_least(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::GreaterThanOrEqual,
            value: value.into(),
        }
    }
}

/// A partial update applied to one document.
///
/// Paths are dot-separated for nested fields (`"liked.post1"`). Setting a
/// path to `Value::Null` stores an explicit null (a tombstone), which is not
/// the same as deleting the key.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Set a (possibly nested) field to a literal value.
    Set { path: String, value: Value },
    /// Atomically add `amount` to a numeric field, treating a missing field as 0.
    Increment { path: String, amount: i64 },
    /// Set a field to the server-observed write time.
    ServerTime { path: String },
}

impl FieldOp {
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        FieldOp::Set {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn increment(path: impl Into<String>, amount: i64) -> Self {
        FieldOp::Increment {
            path: path.into(),
            amount,
        }
    }

    pub fn server_time(path: impl Into<String>) -> Self {
        FieldOp::ServerTime { path: path.into() }
    }
}

/// One write of an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Full-document upsert.
    Set {
        collection: String,
        key: String,
        fields: DocumentFields,
    },
    /// Partial update with field-level operations.
    UpdateFields {
        collection: String,
        key: String,
        ops: Vec<FieldOp>,
    },
    /// Delete the document if it exists.
    Delete { collection: String, key: String },
}

/// A trait for document store operations.
///
/// This is the narrow contract the workflows hold against the remote
/// document database: keyed reads, filtered queries, creates with
/// server-assigned timestamps, partial updates, deletes, and all-or-nothing
/// multi-document batches. The store is eventually read-consistent; nothing
/// here provides predicate isolation across a read followed by a write.
pub trait DocumentStore: Send + Sync {
    /// Error type returned by store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a document by key, or `None` if it does not exist.
    fn get(&self, collection: &str, key: &str) -> BoxFuture<'_, Option<Document>, Self::Error>;

    /// Return all documents of `collection` matching every filter.
    ///
    /// No ordering is guaranteed.
    fn query(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'_, Vec<Document>, Self::Error>;

    /// Create a document with a generated key and return that key.
    ///
    /// Fields named in `server_time_fields` are assigned the server-observed
    /// write time rather than a client clock.
    fn create(
        &self,
        collection: &str,
        fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, String, Self::Error>;

    /// Full-document upsert under a caller-chosen key.
    ///
    /// As with [`DocumentStore::create`], fields named in
    /// `server_time_fields` take the server-observed write time.
    fn set(
        &self,
        collection: &str,
        key: &str,
        fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Apply field-level operations to one document.
    fn update_fields(
        &self,
        collection: &str,
        key: &str,
        ops: Vec<FieldOp>,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Delete a document by key. Deleting a missing document is not an error.
    fn delete_document(&self, collection: &str, key: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Apply a list of writes across one or more documents with
    /// all-or-nothing semantics.
    fn atomic_batch(&self, ops: Vec<WriteOp>) -> BoxFuture<'_, (), Self::Error>;
}

/// A stored object handle returned by an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// The storage path the object was written under.
    pub path: String,
    /// A publicly resolvable URL for the object.
    pub public_url: String,
}

/// A trait for object storage operations.
pub trait ObjectStorage: Send + Sync {
    /// Error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Upload `bytes` under `path` and return the stored object handle.
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BoxFuture<'_, StoredObject, Self::Error>;

    /// The public URL an object at `path` resolves to.
    fn public_url(&self, path: &str) -> String;
}

/// A trait for push notification delivery.
///
/// Delivery is fan-out to every device registered for a user; the returned
/// list contains one message id per device reached.
pub trait PushSender: Send + Sync {
    /// Error type returned by push operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a notification to all devices registered for `user_id`.
    fn send_to_user(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: Option<std::collections::HashMap<String, String>>,
    ) -> BoxFuture<'_, Vec<String>, Self::Error>;
}

/// A factory for creating service instances.
///
/// This trait provides methods for obtaining the collaborator handles the
/// workflows need. The document store is always present; storage and push
/// delivery are optional and disabled by configuration.
pub trait ServiceFactory: Send + Sync {
    /// Get the document store instance.
    fn document_store(&self) -> Arc<dyn DocumentStore<Error = BoxedError>>;

    /// Get an object storage instance, if configured.
    fn object_storage(&self) -> Option<Arc<dyn ObjectStorage<Error = BoxedError>>>;

    /// Get a push sender instance, if configured.
    fn push_sender(&self) -> Option<Arc<dyn PushSender<Error = BoxedError>>>;
}

/// Adapter that erases a concrete store's error type to [`BoxedError`], so
/// workflows can hold `Arc<dyn DocumentStore<Error = BoxedError>>`.
pub struct BoxedStore<S>(pub S);

impl<S: DocumentStore> DocumentStore for BoxedStore<S> {
    type Error = BoxedError;

    fn get(&self, collection: &str, key: &str) -> BoxFuture<'_, Option<Document>, Self::Error> {
        let fut = self.0.get(collection, key);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn query(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'_, Vec<Document>, Self::Error> {
        let fut = self.0.query(collection, filters);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn create(
        &self,
        collection: &str,
        fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, String, Self::Error> {
        let fut = self.0.create(collection, fields, server_time_fields);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        fields: DocumentFields,
        server_time_fields: Vec<String>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.0.set(collection, key, fields, server_time_fields);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn update_fields(
        &self,
        collection: &str,
        key: &str,
        ops: Vec<FieldOp>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.0.update_fields(collection, key, ops);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn delete_document(&self, collection: &str, key: &str) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.0.delete_document(collection, key);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn atomic_batch(&self, ops: Vec<WriteOp>) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.0.atomic_batch(ops);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}

/// Adapter that erases a concrete storage client's error type to [`BoxedError`].
pub struct BoxedStorage<S>(pub S);

impl<S: ObjectStorage> ObjectStorage for BoxedStorage<S> {
    type Error = BoxedError;

    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BoxFuture<'_, StoredObject, Self::Error> {
        let fut = self.0.upload(path, bytes, content_type);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn public_url(&self, path: &str) -> String {
        self.0.public_url(path)
    }
}

/// Adapter that erases a concrete push client's error type to [`BoxedError`].
pub struct BoxedPush<S>(pub S);

impl<S: PushSender> PushSender for BoxedPush<S> {
    type Error = BoxedError;

    fn send_to_user(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: Option<std::collections::HashMap<String, String>>,
    ) -> BoxFuture<'_, Vec<String>, Self::Error> {
        let fut = self.0.send_to_user(user_id, title, body, data);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}
