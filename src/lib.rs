//! # pwm_tool
//!
//! Interactive command-line utility for discovering, binding and driving a
//! single PWM controller and one of its pins.
//!
//! ## Crate Structure
//!
//! - **`directory`**: Controller Directory, enumeration with an optional
//!   friendly-name filter.
//! - **`binder`**: Controller Binder, exclusive acquisition of the first match.
//! - **`session`**: Pin Session, the single open pin and its operations.
//! - **`command`** / **`interpreter`**: the REPL grammar and state machine.
//! - **`inventory`**: list mode.
//! - **`cli`**, **`app`**: argument handling and the process-level flow.
//! - **`config`**, **`logging`**, **`backend`**: figment configuration,
//!   tracing setup and driver selection.
//! - **`error`**: the error enums shared by the above.
//!
//! Hardware access goes through the `pwm-core` traits, implemented by
//! `pwm-driver-sysfs` (Linux) and `pwm-driver-mock` (tests and demos).

pub mod app;
pub mod backend;
pub mod binder;
pub mod cli;
pub mod command;
pub mod config;
pub mod directory;
pub mod error;
pub mod interpreter;
pub mod inventory;
pub mod logging;
pub mod session;

pub use binder::{bind, BoundController};
pub use directory::find_controllers;
pub use error::{BindError, CommandError, ConfigError, InventoryError, SessionError};
pub use interpreter::Interpreter;
pub use inventory::list_controllers;
pub use session::PinSession;
