//! Tries to create an `AppConfig` from config files and the environment.
//! Sources are layered with `figment`: `base.toml`, then `{environment}.toml`, then `APP_*` env variables.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{AnalyticsConfig, AppConfig, Environment, MailingListConfig, NetConfig};

/// Prefix of the environment variables that override file configuration.
/// Nested keys are separated by a double underscore: `APP_MAILING_LIST_CONFIG__API_KEY`.
pub const ENV_PREFIX: &str = "APP_";

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<12} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");

        AppConfig::load(&config_dir, &environment)
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

impl AppConfig {
    /// Layers `base.toml`, the environment specific file and the `APP_*` variables on top of each other.
    pub fn load(config_dir: &Path, environment: &Environment) -> ConfigResult<Self> {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config = Figment::new()
            .merge(Toml::file_exact(config_dir.join("base.toml")))
            .merge(Toml::file_exact(config_dir.join(environment_filename)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

// ###################################
// ->   TESTS
// ###################################
