//! Reading and writing sysfs attribute files.

use crate::error::{Result, SysfsError};
use std::path::Path;

pub(crate) async fn read(path: &Path) -> Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SysfsError::io(path, e))?;
    Ok(raw.trim().to_string())
}

pub(crate) async fn read_u64(path: &Path) -> Result<u64> {
    let value = read(path).await?;
    value.parse().map_err(|_| SysfsError::Parse {
        path: path.to_path_buf(),
        value,
    })
}

pub(crate) async fn write(path: &Path, value: impl ToString) -> Result<()> {
    let value = value.to_string();
    tracing::trace!(path = %path.display(), %value, "sysfs write");
    tokio::fs::write(path, value)
        .await
        .map_err(|e| SysfsError::io(path, e))
}

/// Blocking write for use in `Drop`.
pub(crate) fn write_blocking(path: &Path, value: impl ToString) -> Result<()> {
    std::fs::write(path, value.to_string()).map_err(|e| SysfsError::io(path, e))
}

/// Period in nanoseconds for a frequency in Hz.
pub(crate) fn period_ns(hz: f64) -> u64 {
    (1e9 / hz).round() as u64
}
