// --- File: crates/services/patitas_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! This module provides an implementation of the ServiceFactory trait for the
//! backend service. It initializes the store, storage, and push collaborators
//! from the application configuration and hands them out as trait objects, so
//! the workflows never see a concrete client type.

use patitas_config::AppConfig;
use std::sync::Arc;

use patitas_common::error::{config_error, PatitasError};
use patitas_common::memory::MemoryStore;
use patitas_common::services::{
    BoxedError, BoxedPush, BoxedStorage, BoxedStore, DocumentStore, ObjectStorage, PushSender,
    ServiceFactory,
};
use patitas_firebase::{FcmPushSender, FirestoreClient, StorageClient};
use tracing::{info, warn};

/// Service factory for the Patitas backend.
///
/// The document store is always constructed: Firestore by default, or the
/// in-memory store when `use_memory_store` is set (local development).
/// Object storage and push delivery are optional; when their runtime flags
/// are off, the pin workflow is not mounted and submission pushes are
/// skipped.
pub struct PatitasServiceFactory {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
    storage: Option<Arc<dyn ObjectStorage<Error = BoxedError>>>,
    push: Option<Arc<dyn PushSender<Error = BoxedError>>>,
}

impl PatitasServiceFactory {
    /// Create a new service factory from the application configuration.
    pub fn new(config: &Arc<AppConfig>) -> Result<Self, PatitasError> {
        let store: Arc<dyn DocumentStore<Error = BoxedError>> = if config.use_memory_store {
            warn!("Using the in-memory document store; data will not survive a restart");
            Arc::new(BoxedStore(MemoryStore::new()))
        } else {
            let firebase = config
                .firebase
                .clone()
                .ok_or_else(|| config_error("firebase section is required without use_memory_store"))?;
            info!("ℹ️ Initializing Firestore client...");
            Arc::new(BoxedStore(FirestoreClient::new(firebase)))
        };

        let storage: Option<Arc<dyn ObjectStorage<Error = BoxedError>>> = if config.use_storage {
            let firebase = config
                .firebase
                .clone()
                .ok_or_else(|| config_error("firebase section is required for storage"))?;
            let bucket = config
                .storage
                .as_ref()
                .and_then(|storage| storage.bucket.clone())
                .ok_or_else(|| config_error("storage.bucket is required for storage"))?;
            info!("ℹ️ Initializing Cloud Storage client for bucket {}...", bucket);
            Some(Arc::new(BoxedStorage(StorageClient::new(firebase, bucket))))
        } else {
            None
        };

        let push: Option<Arc<dyn PushSender<Error = BoxedError>>> = if config.use_messaging {
            let firebase = config
                .firebase
                .clone()
                .ok_or_else(|| config_error("firebase section is required for messaging"))?;
            info!("ℹ️ Initializing FCM push sender...");
            Some(Arc::new(BoxedPush(FcmPushSender::new(
                firebase,
                store.clone(),
            ))))
        } else {
            None
        };

        Ok(Self {
            store,
            storage,
            push,
        })
    }
}

impl ServiceFactory for PatitasServiceFactory {
    fn document_store(&self) -> Arc<dyn DocumentStore<Error = BoxedError>> {
        self.store.clone()
    }

    fn object_storage(&self) -> Option<Arc<dyn ObjectStorage<Error = BoxedError>>> {
        self.storage.clone()
    }

    fn push_sender(&self) -> Option<Arc<dyn PushSender<Error = BoxedError>>> {
        self.push.clone()
    }
}
