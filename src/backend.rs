//! Construction of the configured driver backend.

use crate::config::{BackendKind, Config};
use pwm_core::PwmProvider;
use pwm_driver_mock::MockProvider;
use pwm_driver_sysfs::SysfsProvider;
use tracing::info;

/// Build the provider selected by `config.backend`.
pub fn build_provider(config: &Config) -> Box<dyn PwmProvider> {
    info!(backend = ?config.backend, "initializing pwm backend");
    match config.backend {
        BackendKind::Sysfs => Box::new(SysfsProvider::new(config.sysfs.clone())),
        BackendKind::Mock => Box::new(
            MockProvider::new(config.mock.controllers.clone()).with_mode(config.mock.mode),
        ),
    }
}
