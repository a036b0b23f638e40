// --- File: crates/patitas_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod memory; // In-memory document store (local dev + tests)
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, external_service_error, internal_error, not_found, validation_error,
    Context, HttpStatusCode, PatitasError,
};

// Re-export HTTP utilities for easier access
pub use http::{
    caller_id,
    client::{create_client, HTTP_CLIENT},
    handle_json_result, IntoHttpResponse, CALLER_ID_HEADER,
};

// Re-export the collaborator abstractions
pub use services::{
    BoxFuture, BoxedError, BoxedPush, BoxedStorage, BoxedStore, Document, DocumentFields,
    DocumentStore, FieldOp, Filter, FilterOp, ObjectStorage, PushSender, ServiceFactory,
    StoredObject, WriteOp,
};

// This crate provides common functionality that can be used across the application.
// It includes the shared service traits, error handling, logging, and HTTP utilities.
