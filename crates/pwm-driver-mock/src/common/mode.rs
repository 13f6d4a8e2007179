//! Operational modes for mock devices.
//!
//! - **Instant**: Zero delays, deterministic behavior for unit tests
//! - **Realistic**: Every driver call takes a short round trip, like real
//!   hardware behind a kernel interface

use serde::Deserialize;
use std::time::Duration;

/// Operational modes for mock devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockMode {
    /// Zero delays, deterministic - for unit tests
    #[default]
    Instant,
    /// Hardware-like latency on every call - for interactive demos
    Realistic,
}

impl MockMode {
    /// Simulated latency of a single driver round trip.
    pub fn round_trip(self) -> Duration {
        match self {
            MockMode::Instant => Duration::ZERO,
            MockMode::Realistic => Duration::from_millis(2),
        }
    }

    /// Wait for one simulated round trip.
    pub async fn settle(self) {
        let delay = self.round_trip();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
