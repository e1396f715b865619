//! The `config` module handles loading and merging harness configuration.
//!
//! Values come from an optional `config/default` file and the environment,
//! layered over built-in defaults.

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ClientSettings, LoggingSettings, Settings};

/// Loads the configuration from the default file and environment variables.
///
/// A `.env` file is honored before the environment is read. Whatever the
/// sources leave unspecified falls back to `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        client: ClientSettings {
            host: partial
                .client
                .as_ref()
                .and_then(|c| c.host.clone())
                .unwrap_or(default.client.host),
            port: partial
                .client
                .as_ref()
                .and_then(|c| c.port)
                .unwrap_or(default.client.port),
            protocol: partial
                .client
                .as_ref()
                .and_then(|c| c.protocol)
                .or(default.client.protocol),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
