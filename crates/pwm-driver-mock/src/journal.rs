//! Record of every request a mock backend received.

use pwm_core::Polarity;
use std::sync::{Arc, Mutex, PoisonError};

/// One request received by a mock driver, recorded before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    FindAll { filter: Option<String> },
    OpenController { id: String },
    ReleaseController { id: String },
    SetFrequency { id: String, hz: f64 },
    OpenPin { id: String, pin: u32 },
    ReleasePin { id: String, pin: u32 },
    Start { pin: u32 },
    Stop { pin: u32 },
    SetPolarity { pin: u32, polarity: Polarity },
    SetDutyCycle { pin: u32, fraction: f64 },
}

/// Shared, append-only call log. Clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<DriverCall>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, call: DriverCall) {
        tracing::trace!(?call, "mock driver call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Copy of all calls recorded so far.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded calls matching a predicate.
    pub fn filtered(&self, mut predicate: impl FnMut(&DriverCall) -> bool) -> Vec<DriverCall> {
        self.calls().into_iter().filter(|c| predicate(c)).collect()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let journal = Journal::new();
        let other = journal.clone();
        journal.record(DriverCall::Start { pin: 1 });
        assert_eq!(other.calls(), vec![DriverCall::Start { pin: 1 }]);

        other.clear();
        assert!(journal.calls().is_empty());
    }

    #[test]
    fn test_filtered() {
        let journal = Journal::new();
        journal.record(DriverCall::Start { pin: 0 });
        journal.record(DriverCall::Stop { pin: 0 });
        journal.record(DriverCall::Start { pin: 1 });

        let starts = journal.filtered(|c| matches!(c, DriverCall::Start { .. }));
        assert_eq!(starts.len(), 2);
    }
}
