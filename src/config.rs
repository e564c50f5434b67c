//! # Configuration Management
//!
//! Centralized configuration for packet framing, mapped files and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`WIRE_IO_*` variables)
//!
//! Durations are stored as integer milliseconds.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Buffer size used when a static output packet is declared with length 0
pub const DEFAULT_STATIC_LENGTH: usize = 8192;

/// Slice of a single blocking wait on a socket
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Most bytes captured by an "available" input packet
pub const DEFAULT_MAX_AVAILABLE_READ: usize = 64 * 1024;

/// Initial size and growth step of mapped outputs
pub const DEFAULT_MAPPED_CAPACITY: usize = 4096;
pub const DEFAULT_MAPPED_GROWTH: usize = 4096;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct IoConfig {
    /// Socket packet framing
    #[serde(default)]
    pub packet: PacketConfig,

    /// Memory-mapped outputs
    #[serde(default)]
    pub mapped: MappedConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl IoConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| IoError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| IoError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| IoError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(length) = std::env::var("WIRE_IO_DEFAULT_STATIC_LENGTH") {
            if let Ok(val) = length.parse::<usize>() {
                config.packet.default_static_length = val;
            }
        }

        if let Ok(interval) = std::env::var("WIRE_IO_POLL_INTERVAL_MS") {
            if let Ok(val) = interval.parse::<u64>() {
                config.packet.poll_interval = Duration::from_millis(val);
            }
        }

        if let Ok(timeout) = std::env::var("WIRE_IO_READ_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.packet.read_timeout = Some(Duration::from_millis(val));
            }
        }

        if let Ok(growth) = std::env::var("WIRE_IO_MAPPED_GROWTH") {
            if let Ok(val) = growth.parse::<usize>() {
                config.mapped.growth_increment = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| IoError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| IoError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.packet.validate());
        errors.extend(self.mapped.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Packet framing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PacketConfig {
    /// Buffer size for static output packets declared with length 0
    pub default_static_length: usize,

    /// Length of one blocking wait slice; cancellation is checked between slices
    #[serde(with = "duration_serde")]
    pub poll_interval: Duration,

    /// Overall deadline for waiting on packet data (`None` waits until cancelled)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "option_duration_serde"
    )]
    pub read_timeout: Option<Duration>,

    /// Most bytes captured for an "available" input packet
    pub max_available_read: usize,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            default_static_length: DEFAULT_STATIC_LENGTH,
            poll_interval: DEFAULT_POLL_INTERVAL,
            read_timeout: None,
            max_available_read: DEFAULT_MAX_AVAILABLE_READ,
        }
    }
}

impl PacketConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.default_static_length == 0 {
            errors.push("Default static length must be greater than 0".to_string());
        }

        if self.poll_interval.is_zero() {
            errors.push("Poll interval must be greater than 0".to_string());
        } else if self.poll_interval.as_secs() > 10 {
            errors.push("Poll interval too long (maximum: 10s)".to_string());
        }

        if let Some(timeout) = self.read_timeout {
            if timeout < self.poll_interval {
                errors.push("Read timeout cannot be shorter than the poll interval".to_string());
            }
        }

        if self.max_available_read == 0 {
            errors.push("Max available read must be greater than 0".to_string());
        }

        errors
    }
}

/// Memory-mapped output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MappedConfig {
    /// Bytes mapped when the file is created
    pub initial_capacity: usize,

    /// Bytes added each time a write runs past the mapping
    pub growth_increment: usize,
}

impl Default for MappedConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_MAPPED_CAPACITY,
            growth_increment: DEFAULT_MAPPED_GROWTH,
        }
    }
}

impl MappedConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.growth_increment == 0 {
            errors.push("Mapped growth increment must be greater than 0".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("wire-io"),
            log_level: Level::INFO,
            log_to_console: true,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Optional durations; `None` is omitted from the output entirely
mod option_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
