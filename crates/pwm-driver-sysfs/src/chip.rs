//! `pwmchipN` discovery and naming.

use crate::attr;
use crate::config::SysfsConfig;
use crate::error::{Result, SysfsError};
use pwm_core::ControllerRecord;
use std::io;
use std::path::{Path, PathBuf};

const CHIP_PREFIX: &str = "pwmchip";

/// Static facts about one chip.
#[derive(Debug, Clone)]
pub(crate) struct ChipInfo {
    pub name: String,
    pub dir: PathBuf,
    pub friendly_name: String,
}

impl ChipInfo {
    pub fn record(&self) -> ControllerRecord {
        ControllerRecord::new(self.name.clone(), Some(self.friendly_name.clone()))
    }

    pub async fn npwm(&self) -> Result<u32> {
        let path = self.dir.join("npwm");
        let count = attr::read_u64(&path).await?;
        u32::try_from(count).map_err(|_| SysfsError::Parse {
            path,
            value: count.to_string(),
        })
    }

    pub fn channel_dir(&self, channel: u32) -> PathBuf {
        self.dir.join(format!("pwm{}", channel))
    }
}

/// Friendly name: configured alias, else the bound device, else the chip itself.
fn friendly_name(config: &SysfsConfig, name: &str, dir: &Path) -> String {
    if let Some(alias) = config.aliases.get(name) {
        return alias.clone();
    }

    std::fs::read_link(dir.join("device"))
        .ok()
        .and_then(|target| target.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| name.to_string())
}

/// List chips in directory order. A missing root means no controllers.
pub(crate) async fn scan(config: &SysfsConfig) -> Result<Vec<ChipInfo>> {
    let mut entries = match tokio::fs::read_dir(&config.root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(root = %config.root.display(), "no pwm class directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(SysfsError::io(&config.root, e)),
    };

    let mut chips = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SysfsError::io(&config.root, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(CHIP_PREFIX) {
            continue;
        }
        let dir = entry.path();
        chips.push(ChipInfo {
            friendly_name: friendly_name(config, &name, &dir),
            name,
            dir,
        });
    }

    Ok(chips)
}

/// Look up one chip by name.
pub(crate) async fn find(config: &SysfsConfig, name: &str) -> Result<ChipInfo> {
    let dir = config.root.join(name);
    if !name.starts_with(CHIP_PREFIX) || !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
        return Err(SysfsError::ChipNotFound {
            chip: name.to_string(),
        });
    }

    Ok(ChipInfo {
        friendly_name: friendly_name(config, name, &dir),
        name: name.to_string(),
        dir,
    })
}
