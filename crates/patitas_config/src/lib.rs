//! Typed configuration for the Patitas services.
//!
//! Configuration is layered: `config/default` is read first, then an
//! environment-specific file selected by `RUN_ENV`, then `PATITAS__`-prefixed
//! environment variables (double underscore as the section separator, e.g.
//! `PATITAS__SERVER__PORT=9000`). A `.env` file is honored once per process.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use tracing::debug;

pub mod models;
pub use models::{AppConfig, FirebaseConfig, LimitsConfig, ServerConfig, StorageConfig};

static DOTENV: OnceCell<()> = OnceCell::new();

/// Load `.env` into the process environment at most once.
pub fn ensure_dotenv_loaded() {
    DOTENV.get_or_init(|| {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
    });
}

/// Loads the application configuration.
///
/// Dependent crates call this so they do not need to know where configuration
/// comes from.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "default".to_string());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(Environment::with_prefix("PATITAS").separator("__"))
        .build()?
        .try_deserialize()
}
