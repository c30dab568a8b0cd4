//! Startup settings for the binary: broker endpoint plus the initial
//! simulator snapshot.
//!
//! Load is tolerant: a missing or invalid file logs a warning and falls
//! back to defaults, the module never refuses to start over configuration.

use crate::config::SimulatorConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable pointing at the settings file.
pub const CONFIG_ENV: &str = "SIMTEMP_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "simtemp.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mqtt: MqttSettings,
    /// Initial values for the live tunables; everything after startup goes
    /// through the configuration update path.
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "simtemp-module".to_string(),
            keep_alive_secs: 30,
        }
    }
}

impl Settings {
    /// Read from the path in `SIMTEMP_CONFIG` (default `simtemp.toml`).
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path, error = %e, "invalid settings file, using defaults");
                Self::default()
            }),
            Err(_) => {
                warn!(path = %path, "no settings file, using defaults");
                Self::default()
            }
        }
    }
}
