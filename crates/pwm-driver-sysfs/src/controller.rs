//! Exclusive handle on one `pwmchipN`.
//!
//! Exclusivity across processes comes from an advisory `flock` on
//! `<lock_dir>/<chip>.lock`, held for the lifetime of the handle.

use crate::attr;
use crate::channel::SysfsPin;
use crate::chip::ChipInfo;
use crate::config::{SysfsConfig, MAX_FREQUENCY_HZ};
use crate::error::{Result, SysfsError};
use async_trait::async_trait;
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use pwm_core::{DriverResult, PwmController, PwmPin};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};

const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub(crate) struct ChipState {
    pub frequency: f64,
    pub open: HashSet<u32>,
}

/// State shared between a controller and the pins it opened.
#[derive(Debug)]
pub(crate) struct ChipShared {
    pub info: ChipInfo,
    pub npwm: u32,
    pub config: Arc<SysfsConfig>,
    state: Mutex<ChipState>,
}

impl ChipShared {
    pub fn state(&self) -> MutexGuard<'_, ChipState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn period_ns(&self) -> u64 {
        attr::period_ns(self.state().frequency)
    }
}

/// Try to take the chip's lock file. `Ok(None)` means someone else holds it.
pub(crate) fn claim(lock_dir: &Path, chip: &str) -> Result<Option<Flock<File>>> {
    std::fs::create_dir_all(lock_dir).map_err(|e| SysfsError::io(lock_dir, e))?;

    let path = lock_dir.join(format!("{}.lock", chip));
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|e| SysfsError::io(&path, e))?;

    match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(lock) => Ok(Some(lock)),
        Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
            debug!(path = %path.display(), "lock held elsewhere");
            Ok(None)
        }
        Err((_, errno)) => Err(SysfsError::Lock { path, errno }),
    }
}

/// An exclusively claimed sysfs PWM chip. Dropping it releases the lock.
pub struct SysfsController {
    shared: Arc<ChipShared>,
    _lock: Flock<File>,
}

impl SysfsController {
    pub(crate) fn new(
        info: ChipInfo,
        npwm: u32,
        config: Arc<SysfsConfig>,
        lock: Flock<File>,
    ) -> Self {
        let state = ChipState {
            frequency: config.default_frequency_hz,
            open: HashSet::new(),
        };
        Self {
            shared: Arc::new(ChipShared {
                info,
                npwm,
                config,
                state: Mutex::new(state),
            }),
            _lock: lock,
        }
    }

    async fn wait_for_export(&self, dir: &Path, channel: u32) -> Result<()> {
        let timeout = self.shared.config.export_timeout();
        let deadline = tokio::time::Instant::now() + timeout;

        while !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            if tokio::time::Instant::now() >= deadline {
                return Err(SysfsError::ExportTimeout {
                    chip: self.shared.info.name.clone(),
                    channel,
                    timeout_ms: self.shared.config.export_timeout_ms,
                });
            }
            tokio::time::sleep(EXPORT_POLL_INTERVAL).await;
        }
        Ok(())
    }

    /// Move one channel to a new period, keeping its duty fraction.
    async fn reprogram(&self, channel: u32, new_period: u64) -> Result<()> {
        let dir = self.shared.info.channel_dir(channel);
        let old_period = attr::read_u64(&dir.join("period")).await?;
        let old_duty = attr::read_u64(&dir.join("duty_cycle")).await?;

        let fraction = if old_period == 0 {
            0.0
        } else {
            old_duty as f64 / old_period as f64
        };
        let new_duty = (fraction * new_period as f64).round() as u64;

        // The kernel refuses duty_cycle > period at every step.
        if new_period >= old_period {
            attr::write(&dir.join("period"), new_period).await?;
            attr::write(&dir.join("duty_cycle"), new_duty).await?;
        } else {
            attr::write(&dir.join("duty_cycle"), new_duty).await?;
            attr::write(&dir.join("period"), new_period).await?;
        }
        Ok(())
    }

    async fn set_frequency(&self, hz: f64) -> Result<f64> {
        let (min, max) = (
            self.shared.config.min_frequency_hz,
            self.shared.config.max_frequency_hz.min(MAX_FREQUENCY_HZ),
        );
        if !(min..=max).contains(&hz) {
            return Err(SysfsError::InvalidFrequency { hz, min, max });
        }

        let period = attr::period_ns(hz);
        let mut channels: Vec<u32> = self.shared.state().open.iter().copied().collect();
        channels.sort_unstable();
        for channel in channels {
            self.reprogram(channel, period).await?;
        }

        let actual = 1e9 / period as f64;
        self.shared.state().frequency = actual;
        Ok(actual)
    }

    async fn open_channel(&self, channel: u32) -> Result<SysfsPin> {
        if channel >= self.shared.npwm {
            return Err(SysfsError::InvalidChannel {
                channel,
                max: self.shared.npwm,
            });
        }
        if !self.shared.state().open.insert(channel) {
            return Err(SysfsError::ChannelBusy { channel });
        }

        let dir = self.shared.info.channel_dir(channel);
        let exported = !tokio::fs::try_exists(&dir).await.unwrap_or(false);
        // From here on the pin's Drop undoes the claim and the export.
        let pin = SysfsPin::new(self.shared.clone(), channel, dir.clone(), exported);

        if exported {
            attr::write(&self.shared.info.dir.join("export"), channel).await?;
            self.wait_for_export(&dir, channel).await?;
        }
        pin.reset().await?;
        Ok(pin)
    }
}

#[async_trait]
impl PwmController for SysfsController {
    fn id(&self) -> &str {
        &self.shared.info.name
    }

    fn pin_count(&self) -> u32 {
        self.shared.npwm
    }

    fn min_frequency(&self) -> f64 {
        self.shared.config.min_frequency_hz
    }

    fn max_frequency(&self) -> f64 {
        self.shared.config.max_frequency_hz
    }

    async fn actual_frequency(&self) -> DriverResult<f64> {
        Ok(self.shared.state().frequency)
    }

    #[instrument(skip(self), fields(chip = %self.shared.info.name))]
    async fn set_desired_frequency(&self, hz: f64) -> DriverResult<f64> {
        Ok(self.set_frequency(hz).await?)
    }

    #[instrument(skip(self), fields(chip = %self.shared.info.name))]
    async fn open_pin(&self, pin: u32) -> DriverResult<Box<dyn PwmPin>> {
        Ok(Box::new(self.open_channel(pin).await?))
    }
}
