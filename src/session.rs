//! Pin Session: at most one open pin on the bound controller.
//!
//! Operations that need a pin return [`SessionError::NoOpenPin`] when there
//! is none. Nothing is cached: every query goes back to the hardware.

use crate::binder::BoundController;
use crate::error::SessionError;
use pwm_core::{ControllerCapabilities, Polarity, PwmPin};
use tracing::{debug, warn};

/// Live state of the open pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinInfo {
    /// Pin index
    pub pin: u32,
    /// Whether the pin is generating output
    pub is_started: bool,
    /// Current polarity
    pub polarity: Polarity,
    /// Duty cycle read back from hardware, in percent.
    pub duty_cycle_percent: f64,
}

/// Everything the `info` command shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionInfo {
    /// Controller fields, frequency read back live
    pub controller: ControllerCapabilities,
    /// The open pin, if any
    pub pin: Option<PinInfo>,
}

/// Holder of the session's single pin handle.
#[derive(Default)]
pub struct PinSession {
    pin: Option<Box<dyn PwmPin>>,
}

impl std::fmt::Debug for PinSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinSession")
            .field("pin", &self.pin_number())
            .finish()
    }
}

impl PinSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pin is open.
    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// Number of the open pin, if any.
    pub fn pin_number(&self) -> Option<u32> {
        self.pin.as_ref().map(|p| p.pin_number())
    }

    fn pin_mut(&mut self) -> Result<&mut Box<dyn PwmPin>, SessionError> {
        self.pin.as_mut().ok_or(SessionError::NoOpenPin)
    }

    fn pin_ref(&self) -> Result<&dyn PwmPin, SessionError> {
        self.pin.as_deref().ok_or(SessionError::NoOpenPin)
    }

    /// Open `pin`, silently releasing any pin opened before.
    ///
    /// The old pin is released first, without an explicit stop, so reopening
    /// the same number works. If the open fails the session has no pin.
    pub async fn open(&mut self, controller: &BoundController, pin: u32) -> Result<(), SessionError> {
        if let Some(old) = self.pin.take() {
            debug!(old = old.pin_number(), new = pin, "replacing open pin");
        }
        self.pin = Some(controller.open_pin(pin).await?);
        debug!(pin, "pin opened");
        Ok(())
    }

    /// Start the open pin.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        self.pin_mut()?.start().await?;
        Ok(())
    }

    /// Whether the open pin is running. `Ok(None)` when no pin is open.
    pub async fn is_started(&self) -> Result<Option<bool>, SessionError> {
        match self.pin.as_deref() {
            Some(pin) => Ok(Some(pin.is_started().await?)),
            None => Ok(None),
        }
    }

    /// Stop the pin, running or not.
    pub async fn stop(&mut self) -> Result<(), SessionError> {
        let pin = self.pin_mut()?;
        if !pin.is_started().await? {
            warn!(pin = pin.pin_number(), "stopping a pin that is not started");
        }
        pin.stop().await?;
        Ok(())
    }

    /// Forward `percent / 100` to the driver. No local range check.
    pub async fn set_duty_cycle(&mut self, percent: f64) -> Result<(), SessionError> {
        self.pin_mut()?
            .set_active_duty_cycle(percent / 100.0)
            .await?;
        Ok(())
    }

    /// Flip the polarity and return the new value.
    pub async fn toggle_polarity(&mut self) -> Result<Polarity, SessionError> {
        let pin = self.pin_mut()?;
        let polarity = pin.polarity().await?.toggled();
        pin.set_polarity(polarity).await?;
        Ok(polarity)
    }

    /// Snapshot of the controller fields plus the open pin, if any.
    pub async fn info(&self, controller: &BoundController) -> Result<SessionInfo, SessionError> {
        let capabilities = ControllerCapabilities {
            pin_count: controller.pin_count(),
            min_frequency: controller.min_frequency(),
            max_frequency: controller.max_frequency(),
            actual_frequency: controller.actual_frequency().await?,
        };

        let pin = match self.pin_ref() {
            Ok(pin) => Some(PinInfo {
                pin: pin.pin_number(),
                is_started: pin.is_started().await?,
                polarity: pin.polarity().await?,
                duty_cycle_percent: pin.active_duty_cycle().await? * 100.0,
            }),
            Err(_) => None,
        };

        Ok(SessionInfo {
            controller: capabilities,
            pin,
        })
    }
}
