//! Controller Binder: turns a friendly-name filter into one exclusively held
//! controller.
//!
//! Binding never waits. If the first matching controller is claimed by
//! someone else the bind fails with [`BindError::Busy`].

use crate::directory::find_controllers;
use crate::error::BindError;
use pwm_core::{ControllerRecord, DriverResult, PwmController, PwmPin, PwmProvider};
use tracing::{debug, info, instrument};

/// The session's live, exclusively owned controller.
///
/// Dropping it releases the controller.
pub struct BoundController {
    record: ControllerRecord,
    handle: Box<dyn PwmController>,
}

impl std::fmt::Debug for BoundController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundController")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl BoundController {
    /// Identity of the controller as discovered.
    pub fn record(&self) -> &ControllerRecord {
        &self.record
    }

    /// Platform identifier of the bound controller.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Number of pins, valid indices are `0..pin_count`.
    pub fn pin_count(&self) -> u32 {
        self.handle.pin_count()
    }

    /// Lowest supported frequency in Hz.
    pub fn min_frequency(&self) -> f64 {
        self.handle.min_frequency()
    }

    /// Highest supported frequency in Hz.
    pub fn max_frequency(&self) -> f64 {
        self.handle.max_frequency()
    }

    /// Read back from the hardware on every call.
    pub async fn actual_frequency(&self) -> DriverResult<f64> {
        self.handle.actual_frequency().await
    }

    /// Forwarded as-is; the driver decides whether `hz` is acceptable.
    pub async fn set_desired_frequency(&self, hz: f64) -> DriverResult<f64> {
        let actual = self.handle.set_desired_frequency(hz).await?;
        debug!(requested = hz, actual, "frequency set");
        Ok(actual)
    }

    /// Discovery record completed with the live capability fields.
    pub async fn snapshot(&self) -> DriverResult<ControllerRecord> {
        let capabilities = self.handle.capabilities().await?;
        Ok(self.record.clone().with_capabilities(capabilities))
    }

    pub(crate) async fn open_pin(&self, pin: u32) -> DriverResult<Box<dyn PwmPin>> {
        self.handle.open_pin(pin).await
    }
}

/// Acquire the controller behind `record`. `Ok(None)` means it is busy.
pub async fn acquire(
    provider: &dyn PwmProvider,
    record: &ControllerRecord,
) -> DriverResult<Option<BoundController>> {
    let handle = provider.open_controller(&record.id).await?;
    Ok(handle.map(|handle| BoundController {
        record: record.clone(),
        handle,
    }))
}

/// Bind the first controller matching `filter`.
#[instrument(skip(provider), fields(backend = provider.backend()))]
pub async fn bind(
    provider: &dyn PwmProvider,
    filter: Option<&str>,
) -> Result<BoundController, BindError> {
    let records = find_controllers(provider, filter).await?;
    let Some(first) = records.first() else {
        return Err(BindError::NotFound);
    };

    match acquire(provider, first).await? {
        Some(controller) => {
            info!(id = %first.id, "bound pwm controller");
            Ok(controller)
        }
        None => Err(BindError::Busy {
            id: first.id.clone(),
        }),
    }
}
