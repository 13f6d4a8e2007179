//! Discovery and acquisition over `/sys/class/pwm`.

use crate::chip;
use crate::config::SysfsConfig;
use crate::controller::{claim, SysfsController};
use crate::BACKEND;
use async_trait::async_trait;
use pwm_core::{ControllerRecord, DriverResult, PwmController, PwmProvider};
use std::sync::Arc;
use tracing::{debug, instrument};

/// PWM provider backed by the Linux sysfs interface.
#[derive(Debug, Clone)]
pub struct SysfsProvider {
    config: Arc<SysfsConfig>,
}

impl SysfsProvider {
    pub fn new(config: SysfsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SysfsConfig {
        &self.config
    }
}

impl Default for SysfsProvider {
    fn default() -> Self {
        Self::new(SysfsConfig::default())
    }
}

#[async_trait]
impl PwmProvider for SysfsProvider {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    #[instrument(skip(self))]
    async fn find_all(&self, friendly_name: Option<&str>) -> DriverResult<Vec<ControllerRecord>> {
        let chips = chip::scan(&self.config).await?;
        debug!(count = chips.len(), "scanned pwm chips");

        Ok(chips
            .iter()
            .map(chip::ChipInfo::record)
            .filter(|r| r.matches(friendly_name))
            .collect())
    }

    #[instrument(skip(self))]
    async fn open_controller(&self, id: &str) -> DriverResult<Option<Box<dyn PwmController>>> {
        let info = chip::find(&self.config, id).await?;
        let npwm = info.npwm().await?;

        let Some(lock) = claim(&self.config.lock_dir, &info.name)? else {
            return Ok(None);
        };

        debug!(chip = %info.name, npwm, "claimed pwm chip");
        Ok(Some(Box::new(SysfsController::new(
            info,
            npwm,
            self.config.clone(),
            lock,
        ))))
    }
}
