//! One exported `pwmN` channel.

use crate::attr;
use crate::controller::ChipShared;
use crate::error::{Result, SysfsError};
use async_trait::async_trait;
use pwm_core::{DriverResult, Polarity, PwmPin};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// An open sysfs PWM channel. Dropping it unexports the channel if this
/// handle exported it.
pub struct SysfsPin {
    shared: Arc<ChipShared>,
    channel: u32,
    dir: PathBuf,
    exported: bool,
}

fn polarity_to_sysfs(polarity: Polarity) -> &'static str {
    match polarity {
        Polarity::ActiveHigh => "normal",
        Polarity::ActiveLow => "inversed",
    }
}

impl SysfsPin {
    pub(crate) fn new(shared: Arc<ChipShared>, channel: u32, dir: PathBuf, exported: bool) -> Self {
        Self {
            shared,
            channel,
            dir,
            exported,
        }
    }

    fn attr(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Bring the channel to a known state: stopped, active high, zero duty,
    /// running at the controller frequency.
    pub(crate) async fn reset(&self) -> Result<()> {
        attr::write(&self.attr("enable"), 0).await?;
        attr::write(&self.attr("duty_cycle"), 0).await?;
        attr::write(&self.attr("period"), self.shared.period_ns()).await?;
        attr::write(&self.attr("polarity"), polarity_to_sysfs(Polarity::ActiveHigh)).await
    }

    async fn enabled(&self) -> Result<bool> {
        let path = self.attr("enable");
        match attr::read(&path).await?.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(SysfsError::Parse {
                path,
                value: other.to_string(),
            }),
        }
    }

    async fn read_polarity(&self) -> Result<Polarity> {
        let path = self.attr("polarity");
        match attr::read(&path).await?.as_str() {
            "normal" => Ok(Polarity::ActiveHigh),
            "inversed" => Ok(Polarity::ActiveLow),
            other => Err(SysfsError::Parse {
                path,
                value: other.to_string(),
            }),
        }
    }

    async fn write_polarity(&self, polarity: Polarity) -> Result<()> {
        // Most drivers only accept a polarity change while disabled.
        let running = self.enabled().await?;
        if running {
            attr::write(&self.attr("enable"), 0).await?;
        }
        attr::write(&self.attr("polarity"), polarity_to_sysfs(polarity)).await?;
        if running {
            attr::write(&self.attr("enable"), 1).await?;
        }
        Ok(())
    }

    async fn duty_fraction(&self) -> Result<f64> {
        let period = attr::read_u64(&self.attr("period")).await?;
        if period == 0 {
            return Ok(0.0);
        }
        let duty = attr::read_u64(&self.attr("duty_cycle")).await?;
        Ok(duty as f64 / period as f64)
    }

    async fn write_duty_fraction(&self, fraction: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(SysfsError::InvalidDutyCycle { fraction });
        }
        let period = attr::read_u64(&self.attr("period")).await?;
        let duty = (fraction * period as f64).round() as u64;
        attr::write(&self.attr("duty_cycle"), duty).await
    }
}

impl Drop for SysfsPin {
    fn drop(&mut self) {
        self.shared.state().open.remove(&self.channel);

        if self.exported {
            let unexport = self.shared.info.dir.join("unexport");
            if let Err(e) = attr::write_blocking(&unexport, self.channel) {
                warn!(channel = self.channel, error = %e, "failed to unexport pwm channel");
            }
        }
    }
}

#[async_trait]
impl PwmPin for SysfsPin {
    fn pin_number(&self) -> u32 {
        self.channel
    }

    async fn start(&mut self) -> DriverResult<()> {
        Ok(attr::write(&self.attr("enable"), 1).await?)
    }

    async fn stop(&mut self) -> DriverResult<()> {
        Ok(attr::write(&self.attr("enable"), 0).await?)
    }

    async fn is_started(&self) -> DriverResult<bool> {
        Ok(self.enabled().await?)
    }

    async fn polarity(&self) -> DriverResult<Polarity> {
        Ok(self.read_polarity().await?)
    }

    async fn set_polarity(&mut self, polarity: Polarity) -> DriverResult<()> {
        Ok(self.write_polarity(polarity).await?)
    }

    async fn active_duty_cycle(&self) -> DriverResult<f64> {
        Ok(self.duty_fraction().await?)
    }

    async fn set_active_duty_cycle(&mut self, fraction: f64) -> DriverResult<()> {
        Ok(self.write_duty_fraction(fraction).await?)
    }
}
