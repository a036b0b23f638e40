//! Firebase Cloud Messaging client module
//!
//! This module provides a client for the Firebase Cloud Messaging (FCM) HTTP
//! v1 API, plus a [`PushSender`] implementation that fans a notification out
//! to every device token registered for a user. Device tokens live in the
//! `deviceTokens` collection, one document per user with a `tokens` array
//! maintained by the mobile clients.

use std::collections::HashMap;
use std::sync::Arc;

use patitas_common::http::client::HTTP_CLIENT;
use patitas_common::services::{BoxFuture, BoxedError, DocumentStore, PushSender};
use patitas_config::FirebaseConfig;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::auth::{get_google_auth_token, MESSAGING_SCOPE};

/// Collection holding one device-token document per user.
const DEVICE_TOKENS: &str = "deviceTokens";

/// Errors that can occur when sending push notifications.
#[derive(Error, Debug)]
pub enum FcmError {
    /// Error during authentication with Firebase
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the FCM API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the FCM API
    #[error("FCM API error: {0}")]
    ApiError(String),

    /// Device-token lookup failed
    #[error("Token lookup error: {0}")]
    TokenLookupError(#[from] BoxedError),
}

/// A message to be sent via Firebase Cloud Messaging.
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    /// The message payload
    pub message: Message,
}

/// The message payload for Firebase Cloud Messaging.
#[derive(Debug, Serialize)]
pub struct Message {
    /// Token identifying the target device
    pub token: String,

    /// The notification to be displayed on the user's device
    pub notification: Notification,

    /// Custom key-value data to be sent with the message
    pub data: Option<HashMap<String, String>>,
}

/// The notification to be displayed on the user's device.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// The title of the notification
    pub title: String,

    /// The body text of the notification
    pub body: String,
}

/// Response from the Firebase Cloud Messaging API.
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    /// The unique ID of the message, in the format
    /// "projects/{project_id}/messages/{message_id}"
    pub name: String,
}

/// Client for the Firebase Cloud Messaging HTTP v1 API.
pub struct FcmClient {
    client: Client,
    config: FirebaseConfig,
}

impl FcmClient {
    /// Creates a new FCM client with the given configuration.
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
        }
    }

    /// Sends one push notification and returns its message ID.
    pub async fn send_message(&self, message: FcmMessage) -> Result<String, FcmError> {
        let project_id = self.config.project_id.as_deref().ok_or_else(|| {
            FcmError::ConfigError("Missing project_id in FirebaseConfig".to_string())
        })?;

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            project_id
        );

        let token = get_google_auth_token(&self.config, MESSAGING_SCOPE)
            .await
            .map_err(|e| FcmError::AuthError(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FcmError::ApiError(error_text));
        }

        let fcm_response: FcmResponse = response.json().await?;
        Ok(fcm_response.name)
    }
}

/// [`PushSender`] over FCM with Firestore-backed device-token lookup.
pub struct FcmPushSender {
    fcm: FcmClient,
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
}

impl FcmPushSender {
    pub fn new(config: FirebaseConfig, store: Arc<dyn DocumentStore<Error = BoxedError>>) -> Self {
        Self {
            fcm: FcmClient::new(config),
            store,
        }
    }

    async fn tokens_for(&self, user_id: &str) -> Result<Vec<String>, FcmError> {
        let doc = self.store.get(DEVICE_TOKENS, user_id).await?;
        let tokens = doc
            .and_then(|doc| doc.fields.get("tokens").cloned())
            .and_then(|value| match value {
                Value::Array(items) => Some(
                    items
                        .into_iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default();
        Ok(tokens)
    }
}

impl PushSender for FcmPushSender {
    type Error = FcmError;

    fn send_to_user(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: Option<HashMap<String, String>>,
    ) -> BoxFuture<'_, Vec<String>, Self::Error> {
        let user_id = user_id.to_string();
        let notification = Notification {
            title: title.to_string(),
            body: body.to_string(),
        };
        Box::pin(async move {
            let tokens = self.tokens_for(&user_id).await?;

            let mut message_ids = Vec::new();
            for token in tokens {
                let message = FcmMessage {
                    message: Message {
                        token,
                        notification: notification.clone(),
                        data: data.clone(),
                    },
                };
                // One stale device token must not block delivery to the rest.
                match self.fcm.send_message(message).await {
                    Ok(id) => message_ids.push(id),
                    Err(err) => warn!("Skipping undeliverable device for {}: {}", user_id, err),
                }
            }
            Ok(message_ids)
        })
    }
}
