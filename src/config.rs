use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Default values for configuration
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CART_KEY_PREFIX: &str = "guest_cart";
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const CONFIG_DIR: &str = "config";

/// Local persistence configuration.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Key prefix for the persisted cart; scoped per user via
    /// [`crate::models::StorageScope`].
    #[serde(default = "default_cart_key_prefix")]
    #[validate(length(min = 1))]
    pub cart_key_prefix: String,

    /// Debounce window for coalescing cart writes, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Directory for the file-backed store. When unset, state is kept in an
    /// in-memory store and lost on exit.
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cart_key_prefix: default_cart_key_prefix(),
            debounce_ms: default_debounce_ms(),
            data_dir: None,
        }
    }
}

/// Client configuration with validation. Loaded from defaults, an optional
/// `config/` file layer, and `STOREFRONT_`-prefixed environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Base URL of the storefront REST API.
    #[serde(default = "default_api_base_url")]
    #[validate(url)]
    pub api_base_url: String,

    /// Store this client sells for; sent when creating wishlists.
    #[serde(default)]
    pub estore_id: Uuid,

    /// Per-request timeout for remote calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Logging level used when no `RUST_LOG` filter is set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    #[validate]
    pub storage: StorageConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            estore_id: Uuid::nil(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_cart_key_prefix() -> String {
    DEFAULT_CART_KEY_PREFIX.to_string()
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl StorefrontConfig {
    /// Loads configuration in layers: built-in defaults, then
    /// `config/default` and `config/<env>` files when present, then
    /// environment variables prefixed with `STOREFRONT_` (nested fields
    /// separated by `__`, e.g. `STOREFRONT_STORAGE__DATA_DIR`).
    pub fn load() -> Result<Self, ConfigLoadError> {
        let run_env =
            std::env::var("STOREFRONT_ENV").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder();

        let default_file = Path::new(CONFIG_DIR).join("default");
        let env_file = Path::new(CONFIG_DIR).join(&run_env);
        builder = builder
            .add_source(File::from(default_file).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(Environment::with_prefix("STOREFRONT").separator("__"));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(environment = %run_env, api_base_url = %config.api_base_url, "configuration loaded");
        Ok(config)
    }
}
