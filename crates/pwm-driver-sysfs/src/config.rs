//! Settings for the sysfs backend.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Highest frequency with a non-zero period (1 ns).
pub const MAX_FREQUENCY_HZ: f64 = 1e9;

/// Sysfs backend settings, the `[sysfs]` table of the application config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SysfsConfig {
    /// Directory holding the `pwmchipN` entries.
    pub root: PathBuf,

    /// Directory for the per-chip lock files.
    pub lock_dir: PathBuf,

    /// Lowest frequency reported for every chip. Sysfs exposes none.
    pub min_frequency_hz: f64,
    /// Highest frequency reported for every chip, at most [`MAX_FREQUENCY_HZ`].
    pub max_frequency_hz: f64,

    /// Frequency programmed into channels until the user sets one.
    pub default_frequency_hz: f64,

    /// How long to wait for `pwmN` to appear after an export.
    pub export_timeout_ms: u64,

    /// Friendly names keyed by chip name (`pwmchip0 = "PWM1"`).
    pub aliases: HashMap<String, String>,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/class/pwm"),
            lock_dir: PathBuf::from("/run/lock"),
            min_frequency_hz: 1.0,
            max_frequency_hz: 1_000_000.0,
            default_frequency_hz: 1000.0,
            export_timeout_ms: 1000,
            aliases: HashMap::new(),
        }
    }
}

impl SysfsConfig {
    /// Export wait as a [`Duration`].
    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }
}
