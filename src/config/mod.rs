//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `GESTIA` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use gestia::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod backend;
mod error;
mod polling;

pub use backend::BackendConfig;
pub use error::{ConfigError, ValidationError};
pub use polling::PollingConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Assistant backend connection (base URL, API key, timeout)
    pub backend: BackendConfig,

    /// Side-channel polling
    #[serde(default)]
    pub polling: PollingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GESTIA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `GESTIA__BACKEND__BASE_URL=https://...` -> `backend.base_url`
    /// - `GESTIA__POLLING__INTERVAL_SECS=30` -> `polling.interval_secs`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into their expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GESTIA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.backend.validate()?;
        self.polling.validate()?;
        Ok(())
    }
}
