//! Driver traits implemented by every PWM backend.
//!
//! All hardware round trips are `async`. Callers are expected to await each
//! call before issuing the next one; the traits make no promises about
//! concurrent use of a single controller.
//!
//! # Example: driving a pin
//!
//! ```rust,ignore
//! use pwm_core::{Polarity, PwmProvider};
//!
//! let records = provider.find_all(Some("PWM1")).await?;
//! let controller = provider
//!     .open_controller(&records[0].id)
//!     .await?
//!     .ok_or("controller busy")?;
//!
//! controller.set_desired_frequency(1000.0).await?;
//! let mut pin = controller.open_pin(0).await?;
//! pin.set_active_duty_cycle(0.25).await?;
//! pin.set_polarity(Polarity::ActiveLow).await?;
//! pin.start().await?;
//! ```

use crate::error::DriverResult;
use crate::types::{ControllerCapabilities, ControllerRecord, Polarity};
use async_trait::async_trait;

/// Entry point of a backend: discovery and exclusive acquisition.
#[async_trait]
pub trait PwmProvider: Send + Sync {
    /// Short backend name used in logs and errors ("sysfs", "mock").
    fn backend(&self) -> &'static str;

    /// Enumerate controllers, optionally restricted to one friendly name.
    ///
    /// Records are returned in platform order. An empty result is not an
    /// error.
    async fn find_all(&self, friendly_name: Option<&str>) -> DriverResult<Vec<ControllerRecord>>;

    /// Acquire exclusive access to the controller with the given id.
    ///
    /// Returns `Ok(None)` when the controller exists but is already claimed
    /// (by this or another process).
    async fn open_controller(&self, id: &str) -> DriverResult<Option<Box<dyn PwmController>>>;
}

/// An exclusively owned PWM controller.
///
/// The frequency is shared by all pins of the controller.
#[async_trait]
pub trait PwmController: Send + Sync {
    fn id(&self) -> &str;

    fn pin_count(&self) -> u32;

    fn min_frequency(&self) -> f64;

    fn max_frequency(&self) -> f64;

    /// Frequency currently produced by the hardware, read back on every call.
    async fn actual_frequency(&self) -> DriverResult<f64>;

    /// Request a new output frequency in Hz.
    ///
    /// Returns the frequency the hardware actually settled on. Values outside
    /// the controller's bounds are rejected with
    /// [`DriverErrorKind::InvalidParameter`](crate::DriverErrorKind::InvalidParameter).
    async fn set_desired_frequency(&self, hz: f64) -> DriverResult<f64>;

    /// Open a single output pin.
    async fn open_pin(&self, pin: u32) -> DriverResult<Box<dyn PwmPin>>;

    /// Snapshot of the live capability fields.
    async fn capabilities(&self) -> DriverResult<ControllerCapabilities> {
        Ok(ControllerCapabilities {
            pin_count: self.pin_count(),
            min_frequency: self.min_frequency(),
            max_frequency: self.max_frequency(),
            actual_frequency: self.actual_frequency().await?,
        })
    }
}

/// A single open output pin. Dropping it releases the pin.
#[async_trait]
pub trait PwmPin: Send + Sync {
    fn pin_number(&self) -> u32;

    /// Begin pulse generation. Starting a running pin is a no-op.
    async fn start(&mut self) -> DriverResult<()>;

    /// Stop pulse generation.
    async fn stop(&mut self) -> DriverResult<()>;

    async fn is_started(&self) -> DriverResult<bool>;

    async fn polarity(&self) -> DriverResult<Polarity>;

    async fn set_polarity(&mut self, polarity: Polarity) -> DriverResult<()>;

    /// Active duty cycle as a fraction of the period, read from hardware.
    async fn active_duty_cycle(&self) -> DriverResult<f64>;

    /// Set the active duty cycle as a fraction in `[0, 1]`.
    ///
    /// Backends reject fractions outside that range.
    async fn set_active_duty_cycle(&mut self, fraction: f64) -> DriverResult<()>;
}
