//! Driver error type shared by all backends.
//!
//! Every backend reports failures as a [`DriverError`]: the backend name, a
//! coarse [`DriverErrorKind`] category and a human readable message. The
//! application decides what to do with an error from its kind alone.

use thiserror::Error;

/// Convenience alias for results returned across the driver boundary.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Coarse classification of driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    Initialization,
    Configuration,
    Communication,
    Hardware,
    Timeout,
    Permission,
    /// The driver refused a value (frequency, duty cycle, pin index).
    InvalidParameter,
    /// The controller or pin is held by someone else.
    Busy,
    Unknown,
}

impl std::fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DriverErrorKind::Initialization => "initialization",
            DriverErrorKind::Configuration => "configuration",
            DriverErrorKind::Communication => "communication",
            DriverErrorKind::Hardware => "hardware",
            DriverErrorKind::Timeout => "timeout",
            DriverErrorKind::Permission => "permission",
            DriverErrorKind::InvalidParameter => "invalid_parameter",
            DriverErrorKind::Busy => "busy",
            DriverErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Driver '{driver_type}' {kind} error: {message}")]
pub struct DriverError {
    pub driver_type: String,
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(
        driver_type: impl Into<String>,
        kind: DriverErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            driver_type: driver_type.into(),
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an [`DriverErrorKind::InvalidParameter`] error.
    pub fn invalid_parameter(driver_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(driver_type, DriverErrorKind::InvalidParameter, message)
    }

    /// True when the hardware refused a value rather than failing outright.
    pub fn is_rejection(&self) -> bool {
        self.kind == DriverErrorKind::InvalidParameter
    }
}
