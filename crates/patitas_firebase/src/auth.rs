//! Authentication module for the Google REST backends.
//!
//! This module provides functionality to authenticate with Firestore, Cloud
//! Storage, and Firebase Cloud Messaging using a service account key file. It
//! generates OAuth2 tokens that can be used to authenticate API requests.

use patitas_config::FirebaseConfig;
use std::{error::Error, path::Path};
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

/// OAuth2 scope for Firestore access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
/// OAuth2 scope for Cloud Storage object read/write.
pub const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
/// OAuth2 scope for Firebase Cloud Messaging.
pub const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Obtains an OAuth2 access token for the given scope.
///
/// This function reads a service account key file from the path specified in
/// the FirebaseConfig and uses it to authenticate with Google's OAuth2
/// service.
///
/// # Arguments
///
/// * `config` - A reference to a FirebaseConfig containing the path to the service account key file
/// * `scope` - The OAuth2 scope to request a token for
///
/// # Errors
///
/// This function will return an error if:
/// * The key_path is missing from the FirebaseConfig
/// * The service account key file cannot be read
/// * Authentication with Google's OAuth2 service fails
/// * No token is returned from the authentication service
pub async fn get_google_auth_token(
    config: &FirebaseConfig,
    scope: &str,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in FirebaseConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    let auth_token = auth.token(&[scope]).await?;
    let token = match auth_token.token() {
        Some(token) => token,
        None => {
            return Err("No token available".into());
        }
    };

    Ok(token.to_string())
}
