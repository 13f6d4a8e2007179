//! Plain data shared across the driver boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which logic level counts as "on" for the duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// The opposite polarity.
    pub fn toggled(self) -> Self {
        match self {
            Polarity::ActiveHigh => Polarity::ActiveLow,
            Polarity::ActiveLow => Polarity::ActiveHigh,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::ActiveHigh => write!(f, "ActiveHigh"),
            Polarity::ActiveLow => write!(f, "ActiveLow"),
        }
    }
}

/// Live capability fields of a controller, only readable while it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerCapabilities {
    pub pin_count: u32,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub actual_frequency: f64,
}

/// One controller as reported by discovery.
///
/// Discovery only knows the identity of a controller. `capabilities` stays
/// `None` until somebody binds it and reads the live fields back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerRecord {
    /// Opaque platform identifier, used to acquire the controller.
    pub id: String,
    /// Human readable name used for filtering; `None` if the platform has none.
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub capabilities: Option<ControllerCapabilities>,
}

impl ControllerRecord {
    pub fn new(id: impl Into<String>, friendly_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            friendly_name,
            capabilities: None,
        }
    }

    /// Attach the capability snapshot read from a bound controller.
    pub fn with_capabilities(mut self, capabilities: ControllerCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Whether this record passes a friendly-name filter.
    ///
    /// `None` and the empty string match everything; otherwise the friendly
    /// name must be equal (case-sensitive).
    pub fn matches(&self, filter: Option<&str>) -> bool {
        match normalize_filter(filter) {
            None => true,
            Some(name) => self.friendly_name.as_deref() == Some(name),
        }
    }
}

/// Treat an empty filter the same as no filter.
pub fn normalize_filter(filter: Option<&str>) -> Option<&str> {
    filter.filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_toggle_is_involution() {
        for polarity in [Polarity::ActiveHigh, Polarity::ActiveLow] {
            assert_ne!(polarity.toggled(), polarity);
            assert_eq!(polarity.toggled().toggled(), polarity);
        }
    }

    #[test]
    fn test_polarity_display() {
        assert_eq!(Polarity::ActiveHigh.to_string(), "ActiveHigh");
        assert_eq!(Polarity::ActiveLow.to_string(), "ActiveLow");
    }

    #[test]
    fn test_polarity_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            polarity: Polarity,
        }
        let w: Wrapper = toml::from_str("polarity = \"active_low\"").unwrap();
        assert_eq!(w.polarity, Polarity::ActiveLow);
    }

    #[test]
    fn test_record_matching() {
        let named = ControllerRecord::new("pwmchip0", Some("PWM1".to_string()));
        let anonymous = ControllerRecord::new("pwmchip1", None);

        assert!(named.matches(None));
        assert!(named.matches(Some("")));
        assert!(named.matches(Some("PWM1")));
        assert!(!named.matches(Some("pwm1")));
        assert!(!named.matches(Some("PWM2")));

        assert!(anonymous.matches(None));
        assert!(!anonymous.matches(Some("PWM1")));
    }

    #[test]
    fn test_record_capabilities_default_none() {
        let record = ControllerRecord::new("x", None);
        assert!(record.capabilities.is_none());

        let record = record.with_capabilities(ControllerCapabilities {
            pin_count: 4,
            min_frequency: 1.0,
            max_frequency: 1000.0,
            actual_frequency: 50.0,
        });
        assert_eq!(record.capabilities.map(|c| c.pin_count), Some(4));
    }
}
