//! Firebase backends for Patitas
//!
//! This crate provides the concrete collaborators behind the service traits
//! in `patitas-common`:
//!
//! - A Firestore client implementing `DocumentStore` over the REST API
//! - A Cloud Storage client implementing `ObjectStorage`
//! - A Firebase Cloud Messaging client implementing `PushSender`
//!
//! All three authenticate with a shared service-account key file.

pub mod auth;
pub mod firestore;
#[cfg(test)]
mod firestore_test;
pub mod messaging;
pub mod storage;
pub mod value;

// Re-export the clients for the composition root
pub use firestore::{FirestoreClient, FirestoreError};
pub use messaging::{FcmClient, FcmError, FcmPushSender};
pub use storage::{StorageClient, StorageError};
