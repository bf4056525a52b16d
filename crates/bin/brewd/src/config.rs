//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `brewhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use brewhub_app::scheduler::SchedulerConfig;
use brewhub_domain::actuator::{ActuatorStep, Sequence};

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Wall-clock settings.
    pub clock: ClockConfig,
    /// Alarm wait-loop tuning.
    pub scheduler: SchedulerSettings,
    /// Actuator wiring.
    pub actuators: ActuatorsConfig,
    /// Brew sequence, one `[[sequence]]` table per step.
    pub sequence: Vec<ActuatorStep>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Local time zone of the machine.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Offset from UTC applied to the system clock.
    pub utc_offset_minutes: i32,
}

/// Clock-read retry backoff.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub retry_initial_ms: u64,
    pub retry_max_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActuatorsConfig {
    /// Pressed buttons drive their pin low.
    pub active_low: bool,
}

impl Config {
    /// Load configuration from `brewhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("brewhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BREWHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("BREWHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("BREWHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("BREWHUB_UTC_OFFSET_MINUTES") {
            if let Ok(offset) = val.parse() {
                self.clock.utc_offset_minutes = offset;
            }
        }
        if let Ok(val) = std::env::var("BREWHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.utc_offset()?;
        self.sequence()?;
        if self.scheduler.retry_initial_ms == 0 {
            return Err(ConfigError::Validation(
                "retry_initial_ms must be non-zero".to_string(),
            ));
        }
        if self.scheduler.retry_initial_ms > self.scheduler.retry_max_ms {
            return Err(ConfigError::Validation(
                "retry_initial_ms must not exceed retry_max_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The configured offset from UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] unless the offset lies strictly
    /// within one day.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        let minutes = self.clock.utc_offset_minutes;
        if minutes.abs() >= MINUTES_PER_DAY {
            return Err(ConfigError::Validation(format!(
                "utc_offset_minutes {minutes} is out of range"
            )));
        }
        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ConfigError::Validation(format!("utc_offset_minutes {minutes} is out of range"))
        })
    }

    /// The brew sequence built from the `[[sequence]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Sequence`] when no step is configured.
    pub fn sequence(&self) -> Result<Sequence, ConfigError> {
        Sequence::new(self.sequence.clone()).map_err(ConfigError::Sequence)
    }

    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            retry_initial: Duration::from_millis(self.scheduler.retry_initial_ms),
            retry_max: Duration::from_millis(self.scheduler.retry_max_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            clock: ClockConfig::default(),
            scheduler: SchedulerSettings::default(),
            actuators: ActuatorsConfig::default(),
            sequence: Sequence::default_brew().steps().to_vec(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "brewd=info,brewhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            retry_initial_ms: 1_000,
            retry_max_ms: 30_000,
        }
    }
}

impl Default for ActuatorsConfig {
    fn default() -> Self {
        Self { active_low: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// The configured brew sequence is unusable.
    #[error("invalid brew sequence")]
    Sequence(#[source] brewhub_domain::error::ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
