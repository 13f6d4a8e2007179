//! Mock PWM provider, controller and pin.

use crate::common::{ErrorConfig, MockMode};
use crate::journal::{DriverCall, Journal};
use crate::BACKEND;
use async_trait::async_trait;
use pwm_core::{
    ControllerRecord, DriverError, DriverErrorKind, DriverResult, Polarity, PwmController, PwmPin,
    PwmProvider,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for one simulated controller.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MockControllerConfig {
    /// Opaque controller id
    pub id: String,

    /// Friendly name used for discovery filtering
    #[serde(default)]
    pub friendly_name: Option<String>,

    /// Number of pins (default: 4)
    #[serde(default = "default_pin_count")]
    pub pin_count: u32,

    /// Lowest accepted frequency (default: 1 Hz)
    #[serde(default = "default_min_frequency")]
    pub min_frequency_hz: f64,

    /// Highest accepted frequency (default: 1 MHz)
    #[serde(default = "default_max_frequency")]
    pub max_frequency_hz: f64,

    /// Frequency after power-up (default: 1 kHz)
    #[serde(default = "default_initial_frequency")]
    pub initial_frequency_hz: f64,

    /// Simulate a claim held by another process
    #[serde(default)]
    pub claimed_elsewhere: bool,
}

fn default_pin_count() -> u32 {
    4
}

fn default_min_frequency() -> f64 {
    1.0
}

fn default_max_frequency() -> f64 {
    1_000_000.0
}

fn default_initial_frequency() -> f64 {
    1000.0
}

impl MockControllerConfig {
    pub fn new(id: impl Into<String>, friendly_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            friendly_name: Some(friendly_name.into()),
            pin_count: default_pin_count(),
            min_frequency_hz: default_min_frequency(),
            max_frequency_hz: default_max_frequency(),
            initial_frequency_hz: default_initial_frequency(),
            claimed_elsewhere: false,
        }
    }

    /// A controller without a friendly name.
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            friendly_name: None,
            ..Self::new(id, "")
        }
    }

    pub fn with_pin_count(mut self, pin_count: u32) -> Self {
        self.pin_count = pin_count;
        self
    }

    pub fn with_frequency_range(mut self, min_hz: f64, max_hz: f64) -> Self {
        self.min_frequency_hz = min_hz;
        self.max_frequency_hz = max_hz;
        self.initial_frequency_hz = self.initial_frequency_hz.clamp(min_hz, max_hz);
        self
    }

    pub fn claimed_elsewhere(mut self) -> Self {
        self.claimed_elsewhere = true;
        self
    }

    fn record(&self) -> ControllerRecord {
        ControllerRecord::new(self.id.clone(), self.friendly_name.clone())
    }
}

// =============================================================================
// Simulated hardware state
// =============================================================================

#[derive(Debug)]
struct PinState {
    open: bool,
    started: bool,
    polarity: Polarity,
    duty: f64,
}

impl Default for PinState {
    fn default() -> Self {
        Self {
            open: false,
            started: false,
            polarity: Polarity::ActiveHigh,
            duty: 0.0,
        }
    }
}

#[derive(Debug)]
struct ControllerState {
    frequency: f64,
    pins: HashMap<u32, PinState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MockProvider
// =============================================================================

/// Simulated discovery and acquisition service.
///
/// Hardware state (frequency, pin configuration) lives in the provider and
/// survives release and re-acquisition, like a real device would.
pub struct MockProvider {
    controllers: Vec<MockControllerConfig>,
    states: HashMap<String, Arc<Mutex<ControllerState>>>,
    claims: Arc<Mutex<HashSet<String>>>,
    journal: Journal,
    errors: ErrorConfig,
    mode: MockMode,
}

impl MockProvider {
    /// Create a provider that reports the given controllers, in order.
    pub fn new(controllers: Vec<MockControllerConfig>) -> Self {
        let states = controllers
            .iter()
            .map(|c| {
                let state = ControllerState {
                    frequency: c.initial_frequency_hz,
                    pins: HashMap::new(),
                };
                (c.id.clone(), Arc::new(Mutex::new(state)))
            })
            .collect();

        Self {
            controllers,
            states,
            claims: Arc::new(Mutex::new(HashSet::new())),
            journal: Journal::new(),
            errors: ErrorConfig::none(),
            mode: MockMode::default(),
        }
    }

    /// A provider with no controllers at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_errors(mut self, errors: ErrorConfig) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_mode(mut self, mode: MockMode) -> Self {
        self.mode = mode;
        self
    }

    /// Handle on the call journal shared by everything this provider hands out.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Whether a handle for `id` is currently alive.
    pub fn is_claimed(&self, id: &str) -> bool {
        lock(&self.claims).contains(id)
    }
}

#[async_trait]
impl PwmProvider for MockProvider {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn find_all(&self, friendly_name: Option<&str>) -> DriverResult<Vec<ControllerRecord>> {
        self.mode.settle().await;
        self.journal.record(DriverCall::FindAll {
            filter: friendly_name.map(str::to_string),
        });
        self.errors.check_operation("find_all")?;

        Ok(self
            .controllers
            .iter()
            .map(MockControllerConfig::record)
            .filter(|r| r.matches(friendly_name))
            .collect())
    }

    async fn open_controller(&self, id: &str) -> DriverResult<Option<Box<dyn PwmController>>> {
        self.mode.settle().await;
        self.journal.record(DriverCall::OpenController { id: id.to_string() });
        self.errors.check_operation("open_controller")?;

        let (config, state) = match (
            self.controllers.iter().find(|c| c.id == id),
            self.states.get(id),
        ) {
            (Some(config), Some(state)) => (config, state),
            _ => {
                return Err(DriverError::new(
                    BACKEND,
                    DriverErrorKind::Configuration,
                    format!("No controller with id '{}'", id),
                ))
            }
        };

        if config.claimed_elsewhere {
            debug!(id, "mock controller claimed by another process");
            return Ok(None);
        }

        if !lock(&self.claims).insert(id.to_string()) {
            debug!(id, "mock controller already claimed");
            return Ok(None);
        }

        Ok(Some(Box::new(MockController {
            config: config.clone(),
            state: state.clone(),
            claims: self.claims.clone(),
            journal: self.journal.clone(),
            errors: self.errors.clone(),
            mode: self.mode,
        })))
    }
}

// =============================================================================
// MockController
// =============================================================================

/// Exclusive handle on a simulated controller. Dropping it releases the claim.
pub struct MockController {
    config: MockControllerConfig,
    state: Arc<Mutex<ControllerState>>,
    claims: Arc<Mutex<HashSet<String>>>,
    journal: Journal,
    errors: ErrorConfig,
    mode: MockMode,
}

impl Drop for MockController {
    fn drop(&mut self) {
        lock(&self.claims).remove(&self.config.id);
        self.journal.record(DriverCall::ReleaseController {
            id: self.config.id.clone(),
        });
    }
}

#[async_trait]
impl PwmController for MockController {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn pin_count(&self) -> u32 {
        self.config.pin_count
    }

    fn min_frequency(&self) -> f64 {
        self.config.min_frequency_hz
    }

    fn max_frequency(&self) -> f64 {
        self.config.max_frequency_hz
    }

    async fn actual_frequency(&self) -> DriverResult<f64> {
        self.mode.settle().await;
        self.errors.check_operation("read")?;
        Ok(lock(&self.state).frequency)
    }

    async fn set_desired_frequency(&self, hz: f64) -> DriverResult<f64> {
        self.mode.settle().await;
        self.journal.record(DriverCall::SetFrequency {
            id: self.config.id.clone(),
            hz,
        });
        self.errors.check_operation("set_frequency")?;

        let (min, max) = (self.config.min_frequency_hz, self.config.max_frequency_hz);
        if !(min..=max).contains(&hz) {
            return Err(DriverError::invalid_parameter(
                BACKEND,
                format!("Frequency {} Hz outside range [{}, {}] Hz", hz, min, max),
            ));
        }

        lock(&self.state).frequency = hz;
        Ok(hz)
    }

    async fn open_pin(&self, pin: u32) -> DriverResult<Box<dyn PwmPin>> {
        self.mode.settle().await;
        self.journal.record(DriverCall::OpenPin {
            id: self.config.id.clone(),
            pin,
        });
        self.errors.check_operation("open_pin")?;

        if pin >= self.config.pin_count {
            return Err(DriverError::invalid_parameter(
                BACKEND,
                format!(
                    "Pin {} out of range: controller '{}' has {} pins",
                    pin, self.config.id, self.config.pin_count
                ),
            ));
        }

        {
            let mut state = lock(&self.state);
            let slot = state.pins.entry(pin).or_default();
            if slot.open {
                return Err(DriverError::new(
                    BACKEND,
                    DriverErrorKind::Busy,
                    format!("Pin {} is already open", pin),
                ));
            }
            *slot = PinState {
                open: true,
                ..PinState::default()
            };
        }

        Ok(Box::new(MockPin {
            controller_id: self.config.id.clone(),
            pin,
            state: self.state.clone(),
            journal: self.journal.clone(),
            errors: self.errors.clone(),
            mode: self.mode,
        }))
    }
}

// =============================================================================
// MockPin
// =============================================================================

/// An open pin on a simulated controller. Dropping it stops and releases it.
pub struct MockPin {
    controller_id: String,
    pin: u32,
    state: Arc<Mutex<ControllerState>>,
    journal: Journal,
    errors: ErrorConfig,
    mode: MockMode,
}

impl MockPin {
    fn with_state<R>(&self, f: impl FnOnce(&mut PinState) -> R) -> R {
        let mut state = lock(&self.state);
        f(state.pins.entry(self.pin).or_default())
    }
}

impl Drop for MockPin {
    fn drop(&mut self) {
        self.with_state(|p| {
            p.open = false;
            p.started = false;
        });
        self.journal.record(DriverCall::ReleasePin {
            id: self.controller_id.clone(),
            pin: self.pin,
        });
    }
}

#[async_trait]
impl PwmPin for MockPin {
    fn pin_number(&self) -> u32 {
        self.pin
    }

    async fn start(&mut self) -> DriverResult<()> {
        self.mode.settle().await;
        self.journal.record(DriverCall::Start { pin: self.pin });
        self.errors.check_operation("start")?;
        self.with_state(|p| p.started = true);
        Ok(())
    }

    async fn stop(&mut self) -> DriverResult<()> {
        self.mode.settle().await;
        self.journal.record(DriverCall::Stop { pin: self.pin });
        self.errors.check_operation("stop")?;
        self.with_state(|p| p.started = false);
        Ok(())
    }

    async fn is_started(&self) -> DriverResult<bool> {
        self.mode.settle().await;
        self.errors.check_operation("read")?;
        Ok(self.with_state(|p| p.started))
    }

    async fn polarity(&self) -> DriverResult<Polarity> {
        self.mode.settle().await;
        self.errors.check_operation("read")?;
        Ok(self.with_state(|p| p.polarity))
    }

    async fn set_polarity(&mut self, polarity: Polarity) -> DriverResult<()> {
        self.mode.settle().await;
        self.journal.record(DriverCall::SetPolarity {
            pin: self.pin,
            polarity,
        });
        self.errors.check_operation("set_polarity")?;
        self.with_state(|p| p.polarity = polarity);
        Ok(())
    }

    async fn active_duty_cycle(&self) -> DriverResult<f64> {
        self.mode.settle().await;
        self.errors.check_operation("read")?;
        Ok(self.with_state(|p| p.duty))
    }

    async fn set_active_duty_cycle(&mut self, fraction: f64) -> DriverResult<()> {
        self.mode.settle().await;
        self.journal.record(DriverCall::SetDutyCycle {
            pin: self.pin,
            fraction,
        });
        self.errors.check_operation("set_duty_cycle")?;

        if !(0.0..=1.0).contains(&fraction) {
            return Err(DriverError::invalid_parameter(
                BACKEND,
                format!("Duty cycle {} outside [0, 1]", fraction),
            ));
        }

        self.with_state(|p| p.duty = fraction);
        Ok(())
    }
}
