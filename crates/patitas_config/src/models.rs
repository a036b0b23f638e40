// --- File: crates/patitas_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Firebase Config ---
// Holds non-secret Firebase project settings. The service-account key is
// referenced by path; its contents never enter the config tree.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FirebaseConfig {
    pub project_id: Option<String>,
    pub key_path: Option<String>,
}

// --- Object Storage Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    /// Cloud Storage bucket name, e.g. "my-project.appspot.com".
    pub bucket: Option<String>,
}

// --- Submission Limits ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    /// Adoption requests a user may submit per calendar day (UTC).
    #[serde(default = "default_adoption_requests_per_day")]
    pub adoption_requests_per_day: u32,
    /// Map pins a user may create per calendar day (UTC).
    #[serde(default = "default_pins_per_day")]
    pub pins_per_day: u32,
}

fn default_adoption_requests_per_day() -> u32 {
    5
}

fn default_pins_per_day() -> u32 {
    1
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            adoption_requests_per_day: default_adoption_requests_per_day(),
            pins_per_day: default_pins_per_day(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    /// Use the in-memory store instead of Firestore. Local development only.
    #[serde(default)]
    pub use_memory_store: bool,
    #[serde(default)]
    pub use_storage: bool,
    #[serde(default)]
    pub use_messaging: bool,

    // --- Service sections (optional, enable the matching flag to use) ---
    pub firebase: Option<FirebaseConfig>,
    pub storage: Option<StorageConfig>,

    #[serde(default)]
    pub limits: LimitsConfig,
}
