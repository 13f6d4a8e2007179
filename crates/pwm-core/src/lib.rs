//! Core types and driver traits shared by the PWM tool and its backends.
//!
//! Backends (sysfs, mock) implement the traits in [`driver`]; the application
//! crate only ever talks to hardware through them.
//!
//! # Architecture
//!
//! ```text
//! PwmProvider::find_all()        -> Vec<ControllerRecord>
//! PwmProvider::open_controller() -> Option<Box<dyn PwmController>>   (None = busy)
//! PwmController::open_pin()      -> Box<dyn PwmPin>
//! ```
//!
//! Dropping a pin releases the channel. Dropping a controller releases the
//! exclusive claim.

pub mod driver;
pub mod error;
pub mod types;

pub use driver::{PwmController, PwmPin, PwmProvider};
pub use error::{DriverError, DriverErrorKind, DriverResult};
pub use types::{normalize_filter, ControllerCapabilities, ControllerRecord, Polarity};
