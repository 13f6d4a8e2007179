//! Error types for the application.
//!
//! Each stage of a session has its own error enum so callers can tell fatal
//! failures from recoverable ones by type:
//!
//! - **`BindError`**: startup binding failed. Always fatal; the process exits 1.
//! - **`SessionError`**: a pin operation failed. Reported, the REPL continues.
//!   `NoOpenPin` is the report-then-attempt case; a driver rejection
//!   (`HardwareRejected` in operator terms) arrives as `Driver` with an
//!   `InvalidParameter` kind.
//! - **`CommandError`**: a line could not be turned into a command. The line is
//!   discarded with a hint.
//! - **`ConfigError`**: configuration could not be loaded or is inconsistent.
//! - **`InventoryError`**: list mode failed outright (busy entries are not errors).
//!
//! The `Display` text of every variant is the exact message shown to the
//! operator.

use pwm_core::DriverError;
use thiserror::Error;

/// Failure to bind the session's controller.
#[derive(Error, Debug)]
pub enum BindError {
    /// The directory returned no controller for the filter
    #[error("pwm controller not found")]
    NotFound,

    /// The first matching controller is claimed elsewhere
    #[error("Pwm controller {id} is in use. Please ensure that no other applications are using pwm.")]
    Busy {
        /// Identifier of the busy controller
        id: String,
    },

    /// Enumeration or acquisition failed in the driver
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Failure of a pin session operation.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The operation needs an open pin and there is none
    #[error("No open pin")]
    NoOpenPin,

    /// The driver failed or rejected a value
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl SessionError {
    /// True when the hardware refused a value (frequency, duty cycle, pin index).
    pub fn is_hardware_rejection(&self) -> bool {
        matches!(self, Self::Driver(e) if e.is_rejection())
    }
}

/// A REPL line that does not form a valid command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// First word is not a command
    #[error("Unrecognized command: {0}. Type 'help' for command usage.")]
    Unrecognized(String),

    /// The argument is missing or not a number; the message is the hint
    #[error("{hint}")]
    ArgumentFormat {
        /// Example of the expected form
        hint: &'static str,
    },
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly named file is missing
    #[error("Configuration file '{0}' does not exist")]
    MissingFile(String),

    /// Parse or merge failure
    #[error("Failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    /// Loaded but inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// List mode failures.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Enumeration failed
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Writing the listing failed
    #[error("Failed to write inventory: {0}")]
    Io(#[from] std::io::Error),
}
