//! Linux sysfs PWM backend for pwm_tool
//!
//! Drives the kernel's generic PWM class interface:
//!
//! ```text
//! /sys/class/pwm/pwmchipN/
//!     npwm            number of channels
//!     export          write N to create pwmN/
//!     unexport        write N to remove pwmN/
//!     device -> ...   bound platform device
//!     pwmN/
//!         period      ns
//!         duty_cycle  ns, never above period
//!         polarity    normal | inversed
//!         enable      0 | 1
//! ```
//!
//! Each chip is one controller and each channel one pin. The kernel has no
//! notion of a chip-wide frequency, so the controller keeps one and programs
//! it as the `period` of every channel it opens. Frequency bounds come from
//! [`SysfsConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use pwm_driver_sysfs::{SysfsConfig, SysfsProvider};
//!
//! let provider = SysfsProvider::new(SysfsConfig::default());
//! for record in provider.find_all(None).await? {
//!     println!("{} {:?}", record.id, record.friendly_name);
//! }
//! ```

mod attr;
mod channel;
mod chip;
pub mod config;
mod controller;
pub mod error;
mod provider;

pub use channel::SysfsPin;
pub use config::{SysfsConfig, MAX_FREQUENCY_HZ};
pub use controller::SysfsController;
pub use error::SysfsError;
pub use provider::SysfsProvider;

/// Backend name reported by the sysfs driver.
pub const BACKEND: &str = "sysfs";
