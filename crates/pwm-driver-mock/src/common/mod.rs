//! Common infrastructure for mock devices.
//!
//! - **mode**: Operational modes (Instant, Realistic)
//! - **errors**: Error injection framework

pub mod errors;
pub mod mode;

// Re-export commonly used types
pub use errors::{ErrorConfig, ErrorScenario};
pub use mode::MockMode;
