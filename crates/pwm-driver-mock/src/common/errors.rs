//! Error injection framework for mock devices.
//!
//! Enables configurable failures so the application's error paths can be
//! exercised without broken hardware. Failures surface as ordinary
//! [`DriverError`]s.

use pwm_core::{DriverError, DriverErrorKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Error injection configuration for mock devices
#[derive(Clone, Debug, Default)]
pub struct ErrorConfig {
    /// Specific failure scenarios
    scenarios: Arc<Vec<ErrorScenario>>,
    /// State tracking for scenarios
    state: Arc<Mutex<ErrorState>>,
}

#[derive(Debug, Clone)]
pub enum ErrorScenario {
    /// Fail after N successful operations
    FailAfterN {
        operation: &'static str,
        count: u32,
    },
    /// Fail every call of one operation
    Fail { operation: &'static str },
    /// Hardware fault with specific code; every later call fails too
    HardwareFault { code: u32 },
}

#[derive(Default, Debug)]
struct ErrorState {
    /// Operation counters for FailAfterN scenarios
    operation_counts: HashMap<&'static str, u32>,
    /// Hardware fault code (0 = no fault)
    hardware_fault_code: u32,
}

impl ErrorConfig {
    /// Create error config with no errors (default)
    pub fn none() -> Self {
        Self::default()
    }

    /// Create error config with a single scenario
    pub fn scenario(scenario: ErrorScenario) -> Self {
        Self::scenarios(vec![scenario])
    }

    /// Create error config with multiple scenarios
    pub fn scenarios(scenarios: Vec<ErrorScenario>) -> Self {
        Self {
            scenarios: Arc::new(scenarios),
            state: Arc::new(Mutex::new(ErrorState::default())),
        }
    }

    /// Check if an operation should fail and return appropriate error
    pub fn check_operation(&self, operation: &'static str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.hardware_fault_code != 0 {
            return Err(DriverError::new(
                crate::BACKEND,
                DriverErrorKind::Hardware,
                format!("Hardware fault: {}", state.hardware_fault_code),
            ));
        }

        for scenario in self.scenarios.iter() {
            match scenario {
                ErrorScenario::FailAfterN {
                    operation: op,
                    count,
                } if *op == operation => {
                    let current = state.operation_counts.entry(operation).or_insert(0);
                    *current += 1;
                    if *current > *count {
                        return Err(DriverError::new(
                            crate::BACKEND,
                            DriverErrorKind::Hardware,
                            format!("Injected failure after {} operations", count),
                        ));
                    }
                }
                ErrorScenario::Fail { operation: op } if *op == operation => {
                    return Err(DriverError::new(
                        crate::BACKEND,
                        DriverErrorKind::Hardware,
                        format!("Injected failure on operation '{}'", operation),
                    ));
                }
                ErrorScenario::HardwareFault { code } => {
                    state.hardware_fault_code = *code;
                    return Err(DriverError::new(
                        crate::BACKEND,
                        DriverErrorKind::Hardware,
                        format!("Hardware fault: {}", code),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Reset error state (clear counters, faults)
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = ErrorState::default();
    }
}
