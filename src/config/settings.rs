use serde::Deserialize;
use tracing::warn;

use crate::client::session::ProtocolVersion;

/// Top-level configuration for the harness.
///
/// Covers the client connection the requests will be published through and
/// the logging setup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Connection settings for the MQTT client under test.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    /// Protocol level the session is expected to negotiate (3, 4 or 5).
    /// Absent means the client decides.
    pub protocol: Option<u8>,
}

/// Logging settings consumed by `utils::logging::init`.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration loaded from files or the environment.
///
/// Allows partial specification of settings; missing values fall back to
/// defaults during the merge.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub client: Option<PartialClientSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

/// Partial client settings.
#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<u8>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientSettings {
                host: "127.0.0.1".to_string(),
                port: 1883,
                protocol: None,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Protocol version the session is configured to negotiate.
    ///
    /// Absent or unknown levels come back as `Unspecified`, leaving the
    /// decision to the client.
    pub fn protocol_version(&self) -> ProtocolVersion {
        match self.client.protocol {
            None => ProtocolVersion::Unspecified,
            Some(level) => match ProtocolVersion::from_level(level) {
                Some(version) => version,
                None => {
                    warn!(level, "unknown protocol level in settings, treating as unspecified");
                    ProtocolVersion::Unspecified
                }
            },
        }
    }
}
