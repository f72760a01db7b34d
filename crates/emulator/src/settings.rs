//! Emulator Configuration
//!
//! Layered with the `config` crate: an optional file (YAML, TOML, JSON, ...)
//! overridden by `ELM327_EMULATOR_*` environment variables, where `__`
//! separates nested keys (`ELM327_EMULATOR_CONNECTION__PORT=/dev/ttyS1`).

use crate::error::EmulatorError;
use config::{Config, Environment, File};
use obd_protocol::{EngineConfig, DEFAULT_IDENTITY};
use serde::{Deserialize, Serialize};
use signal_source::{LiveApiConfig, ReplayConfig, SourceMode, StaticConfig};
use std::time::Duration;
use tracing::Level;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "ELM327_EMULATOR_CONFIG";

/// Configuration file used when [`CONFIG_ENV`] is unset (any extension)
pub const DEFAULT_CONFIG_PATH: &str = "config/emulator";

/// Prefix of environment overrides
const ENV_PREFIX: &str = "ELM327_EMULATOR";

/// Serial connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub port: String,
    /// Baud rate
    pub baudrate: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baudrate: 38400,
        }
    }
}

/// Protocol engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Transport poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Identity reported for ATZ / ATI
    pub identity: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            identity: DEFAULT_IDENTITY.to_string(),
        }
    }
}

impl ProtocolConfig {
    /// Engine configuration derived from these settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            identity: self.identity.clone(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, INFO when unrecognized
    pub fn max_level(&self) -> Level {
        self.level.trim().parse().unwrap_or(Level::INFO)
    }
}

/// Complete emulator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Serial connection
    pub connection: ConnectionConfig,
    /// Active signal source
    pub mode: SourceMode,
    /// Values for static mode
    #[serde(rename = "static")]
    pub static_values: StaticConfig,
    /// Settings for replay mode
    pub replay: ReplayConfig,
    /// Settings for the live telemetry API mode
    pub high_mobility: LiveApiConfig,
    /// Protocol engine tuning
    pub protocol: ProtocolConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl EmulatorConfig {
    /// Load from `path` (a missing file means defaults) plus environment
    /// overrides.
    pub fn load(path: &str) -> Result<Self, EmulatorError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
