//! Mock PWM Controllers for pwm_tool
//!
//! This crate provides simulated PWM controllers for testing without physical
//! hardware. All mock devices use async-safe operations (tokio::time::sleep,
//! not std::thread::sleep).
//!
//! # What is simulated
//!
//! - Discovery in configuration order, filtered by friendly name
//! - Exclusive claims: a controller held by one handle reports busy to the next
//!   `open_controller` call, and controllers can be marked as claimed by
//!   another process
//! - Driver-side validation: pin index, frequency bounds, duty fraction range
//! - A [`Journal`] of every request received, so tests can check exactly what
//!   was forwarded to the "hardware"
//! - Scenario based error injection through [`ErrorConfig`]
//!
//! # Example
//!
//! ```rust,ignore
//! use pwm_driver_mock::{MockControllerConfig, MockProvider};
//!
//! let provider = MockProvider::new(vec![MockControllerConfig::new("mock0", "PWM1")]);
//! let controller = provider.open_controller("mock0").await?.unwrap();
//! let mut pin = controller.open_pin(0).await?;
//! pin.set_active_duty_cycle(0.5).await?;
//! ```

pub mod common;
mod journal;
mod mock_provider;

// Re-export common types
pub use common::{ErrorConfig, ErrorScenario, MockMode};

pub use journal::{DriverCall, Journal};
pub use mock_provider::{MockController, MockControllerConfig, MockPin, MockProvider};

/// Backend name reported by mock drivers.
pub const BACKEND: &str = "mock";
