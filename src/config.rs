//! Configuration System using Figment
//!
//! Configuration is loaded from, in increasing precedence:
//! 1. Built-in defaults
//! 2. A TOML file (`--config <path>`, or `pwmtool.toml` in the working
//!    directory when it exists)
//! 3. Environment variables prefixed with `PWMTOOL_`, nested keys separated by
//!    `__` (e.g. `PWMTOOL_SYSFS__ROOT=/tmp/pwm`)
//!
//! # Example
//! ```no_run
//! use pwm_tool::config::Config;
//!
//! let config = Config::load(None)?;
//! config.validate()?;
//! println!("backend: {:?}", config.backend);
//! # Ok::<(), pwm_tool::error::ConfigError>(())
//! ```

use crate::error::ConfigError;
use clap::ValueEnum;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use pwm_driver_mock::{MockControllerConfig, MockMode};
use pwm_driver_sysfs::{SysfsConfig, MAX_FREQUENCY_HZ};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PWMTOOL_";

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pwmtool.toml";

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Which driver backend provides controllers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Linux `/sys/class/pwm`
    #[default]
    Sysfs,
    /// Simulated controllers from the `[mock]` table
    Mock,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable
    #[default]
    Compact,
    /// Multi-line human readable
    Pretty,
    /// One JSON object per line
    Json,
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log line format
    pub log_format: LogFormat,
    /// Driver backend
    pub backend: BackendKind,
    /// Sysfs backend settings
    pub sysfs: SysfsConfig,
    /// Mock backend settings
    pub mock: MockConfig,
}

/// Simulated controllers for the mock backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MockConfig {
    /// Latency model for every simulated driver call
    pub mode: MockMode,
    /// Controllers the mock provider enumerates, in order
    pub controllers: Vec<MockControllerConfig>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Instant,
            controllers: vec![MockControllerConfig::new("mock0", "PWM1")],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::default(),
            backend: BackendKind::default(),
            sysfs: SysfsConfig::default(),
            mock: MockConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from `pwmtool.toml` when
    /// present, then apply `PWMTOOL_` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let figment = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile(path.display().to_string()));
                }
                Figment::new().merge(Toml::file(path))
            }
            None => Figment::new().merge(Toml::file(DEFAULT_CONFIG_FILE)),
        };

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                VALID_LEVELS.join(", ")
            )));
        }

        let sysfs = &self.sysfs;
        check_bounds("sysfs", sysfs.min_frequency_hz, sysfs.max_frequency_hz)?;
        if sysfs.max_frequency_hz > MAX_FREQUENCY_HZ {
            return Err(ConfigError::Invalid(format!(
                "sysfs max_frequency_hz {} above {} (1 ns period)",
                sysfs.max_frequency_hz, MAX_FREQUENCY_HZ
            )));
        }
        if !(sysfs.min_frequency_hz..=sysfs.max_frequency_hz).contains(&sysfs.default_frequency_hz)
        {
            return Err(ConfigError::Invalid(format!(
                "sysfs default_frequency_hz {} outside [{}, {}]",
                sysfs.default_frequency_hz, sysfs.min_frequency_hz, sysfs.max_frequency_hz
            )));
        }

        let mut ids = HashSet::new();
        for controller in &self.mock.controllers {
            if !ids.insert(controller.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate mock controller ID: {}",
                    controller.id
                )));
            }
            check_bounds(
                &controller.id,
                controller.min_frequency_hz,
                controller.max_frequency_hz,
            )?;
        }

        Ok(())
    }
}

fn check_bounds(owner: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > 0.0 && min <= max {
        return Ok(());
    }
    Err(ConfigError::Invalid(format!(
        "{}: frequency bounds [{}, {}] must be positive and ordered",
        owner, min, max
    )))
}
