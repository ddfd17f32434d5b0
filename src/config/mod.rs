//! Builds the `AppConfig` from TOML files layered with environment overrides.
//! `base.toml` is read first, then `<environment>.toml`, then the `PORT` and `DATABASE_URL`
//! environment variables.
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
pub use types::{AppConfig, DbConfig, Environment, NetConfig};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<20} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");

        AppConfig::load(&config_dir, environment)
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

impl AppConfig {
    pub fn load(config_dir: &Path, environment: Environment) -> ConfigResult<Self> {
        let config = Self::figment(config_dir, environment).extract()?;
        Ok(config)
    }

    /// The layered configuration sources, lowest priority first.
    pub fn figment(config_dir: &Path, environment: Environment) -> Figment {
        Self::file_figment(config_dir, environment).merge(
            Env::raw()
                .only(&["PORT", "DATABASE_URL"])
                .map(|key| {
                    if key == "PORT" {
                        "net_config.app_port".into()
                    } else {
                        "db_config.url".into()
                    }
                }),
        )
    }

    fn file_figment(config_dir: &Path, environment: Environment) -> Figment {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
    }
}

// ###################################
// ->   TESTS
// ###################################
