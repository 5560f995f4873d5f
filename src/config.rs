use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::services::{BackendCollections, BoardSettings};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub collection: CollectionSettings,
    #[serde(default)]
    pub checkin: CheckinSettings,
    #[serde(default)]
    pub board: BoardWindowSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_events_collection")]
    pub events: String,
    #[serde(default = "default_interests_collection")]
    pub interests: String,
    #[serde(default = "default_checkins_collection")]
    pub checkins: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            events: default_events_collection(),
            interests: default_interests_collection(),
            checkins: default_checkins_collection(),
        }
    }
}

impl From<CollectionSettings> for BackendCollections {
    fn from(value: CollectionSettings) -> Self {
        Self {
            events: value.events,
            interests: value.interests,
            checkins: value.checkins,
        }
    }
}

fn default_events_collection() -> String { "events".to_string() }
fn default_interests_collection() -> String { "interests".to_string() }
fn default_checkins_collection() -> String { "checkins".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CheckinSettings {
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,
    #[serde(default = "default_location_timeout_secs")]
    pub location_timeout_secs: u64,
}

impl Default for CheckinSettings {
    fn default() -> Self {
        Self {
            radius_m: default_radius_m(),
            location_timeout_secs: default_location_timeout_secs(),
        }
    }
}

fn default_radius_m() -> f64 { 100.0 }
fn default_location_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct BoardWindowSettings {
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,
}

impl Default for BoardWindowSettings {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
        }
    }
}

fn default_window_days() -> u32 { 7 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCENE__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCENE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SCENE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SCENE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn board_settings(&self) -> BoardSettings {
        BoardSettings {
            checkin_radius_m: self.checkin.radius_m,
            location_timeout: Duration::from_secs(self.checkin.location_timeout_secs),
            default_window_days: self.board.default_window_days,
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs.unwrap_or(30))
    }
}

/// Let the conventional backend variables override the file values
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in [
        ("BACKEND_ENDPOINT", "backend.endpoint"),
        ("BACKEND_API_KEY", "backend.api_key"),
        ("BACKEND_PROJECT_ID", "backend.project_id"),
        ("BACKEND_DATABASE_ID", "backend.database_id"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_checkin_settings() {
        let checkin = CheckinSettings::default();
        assert_eq!(checkin.radius_m, 100.0);
        assert_eq!(checkin.location_timeout_secs, 10);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let settings = Settings::load_from("config/default.toml").unwrap();
        assert_eq!(settings.collection.events, "events");
        assert_eq!(settings.board_settings().location_timeout, Duration::from_secs(10));
        assert_eq!(settings.board_settings().checkin_radius_m, 100.0);
        assert_eq!(settings.board.default_window_days, 7);
    }
}
