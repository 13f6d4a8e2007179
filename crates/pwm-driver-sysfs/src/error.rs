//! Error types for sysfs PWM operations.
//!
//! [`SysfsError`] keeps the file path or channel involved in each failure;
//! it is folded into a [`DriverError`] at the trait boundary.

use crate::BACKEND;
use pwm_core::{DriverError, DriverErrorKind};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for sysfs operations.
pub type Result<T> = std::result::Result<T, SysfsError>;

/// Errors that can occur when working with sysfs PWM chips.
#[derive(Error, Debug)]
pub enum SysfsError {
    /// Reading or writing a sysfs attribute failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An attribute held something other than what the kernel documents
    #[error("Unexpected value '{value}' in '{}'", path.display())]
    Parse { path: PathBuf, value: String },

    /// No `pwmchipN` with this name under the sysfs root
    #[error("PWM chip '{chip}' not found")]
    ChipNotFound { chip: String },

    /// Channel index past `npwm`
    #[error("Invalid channel {channel}: chip has {max} channels")]
    InvalidChannel { channel: u32, max: u32 },

    /// Channel already opened through this controller handle
    #[error("Channel {channel} is already open")]
    ChannelBusy { channel: u32 },

    /// Exported channel directory never appeared
    #[error("Channel {channel} of '{chip}' did not appear within {timeout_ms} ms of export")]
    ExportTimeout {
        chip: String,
        channel: u32,
        timeout_ms: u64,
    },

    /// Frequency outside the configured bounds
    #[error("Frequency {hz} Hz outside range [{min}, {max}] Hz")]
    InvalidFrequency { hz: f64, min: f64, max: f64 },

    /// Duty fraction outside [0, 1]
    #[error("Duty cycle {fraction} outside [0, 1]")]
    InvalidDutyCycle { fraction: f64 },

    /// The lock file could not be locked for a reason other than contention
    #[error("Failed to lock '{}': {errno}", path.display())]
    Lock { path: PathBuf, errno: nix::Error },
}

impl SysfsError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Check if this error came from an attribute the kernel refused to accept.
    pub fn is_rejected_write(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.raw_os_error() == Some(nix::libc::EINVAL))
    }
}

impl From<SysfsError> for DriverError {
    fn from(err: SysfsError) -> Self {
        let kind = match &err {
            SysfsError::Io { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => DriverErrorKind::Permission,
                io::ErrorKind::NotFound => DriverErrorKind::Configuration,
                _ if err.is_rejected_write() => DriverErrorKind::InvalidParameter,
                _ => DriverErrorKind::Communication,
            },
            SysfsError::Parse { .. } => DriverErrorKind::Hardware,
            SysfsError::ChipNotFound { .. } => DriverErrorKind::Configuration,
            SysfsError::InvalidChannel { .. }
            | SysfsError::InvalidFrequency { .. }
            | SysfsError::InvalidDutyCycle { .. } => DriverErrorKind::InvalidParameter,
            SysfsError::ChannelBusy { .. } => DriverErrorKind::Busy,
            SysfsError::ExportTimeout { .. } => DriverErrorKind::Timeout,
            SysfsError::Lock { .. } => DriverErrorKind::Communication,
        };

        DriverError::new(BACKEND, kind, err.to_string())
    }
}
