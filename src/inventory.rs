//! Inventory Reporter: `-list` mode.
//!
//! Every controller is bound just long enough to read its capabilities.
//! Busy controllers are reported and skipped. A controller that fails to
//! bind or probe gets an `Error:` row and the listing moves on; only
//! enumeration and output failures end it.

use crate::binder::acquire;
use crate::directory::find_controllers;
use crate::error::InventoryError;
use pwm_core::{ControllerRecord, DriverError, PwmProvider};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

const HEADER: &str = "  SchematicName Id pincount minFrequency maxFrequency";

/// Outcome for one listed controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEntry {
    /// Bound and probed; `capabilities` is filled in.
    Available(ControllerRecord),
    /// Claimed by someone else.
    InUse(ControllerRecord),
    /// Could not be bound or probed, e.g. it vanished after enumeration.
    Failed {
        /// The record as enumerated
        record: ControllerRecord,
        /// Driver error text shown in the row
        message: String,
    },
}

impl InventoryEntry {
    /// The controller this entry describes.
    pub fn record(&self) -> &ControllerRecord {
        match self {
            Self::Available(record) | Self::InUse(record) | Self::Failed { record, .. } => record,
        }
    }
}

/// Enumerate all controllers and print one row per controller to `out`.
///
/// No controller stays bound after this returns.
#[instrument(skip_all, fields(backend = provider.backend()))]
pub async fn list_controllers<W: AsyncWrite + Unpin>(
    provider: &dyn PwmProvider,
    out: &mut W,
) -> Result<Vec<InventoryEntry>, InventoryError> {
    out.write_all(b"Finding PwmControllers\n").await?;

    let records = find_controllers(provider, None).await?;
    if records.is_empty() {
        out.write_all(b"There are no pwm controllers on this system.\n")
            .await?;
        return Ok(Vec::new());
    }

    out.write_all(format!("Found {} PwmControllers\n{}\n", records.len(), HEADER).as_bytes())
        .await?;

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let prefix = format!(
            "  {} {} ",
            record.friendly_name.as_deref().unwrap_or("<null>"),
            record.id
        );

        let bound = match acquire(provider, &record).await {
            Ok(Some(bound)) => bound,
            Ok(None) => {
                debug!(id = %record.id, "controller busy, skipping");
                out.write_all(
                    format!("{}Pwm controller {} is in use.\n", prefix, record.id).as_bytes(),
                )
                .await?;
                entries.push(InventoryEntry::InUse(record));
                continue;
            }
            Err(e) => {
                entries.push(failed_row(out, &prefix, record, e).await?);
                continue;
            }
        };

        let probed = bound.snapshot().await;
        drop(bound);

        let snapshot = match probed {
            Ok(snapshot) => snapshot,
            Err(e) => {
                entries.push(failed_row(out, &prefix, record, e).await?);
                continue;
            }
        };

        if let Some(caps) = &snapshot.capabilities {
            out.write_all(
                format!(
                    "{}{} {} {}\n",
                    prefix, caps.pin_count, caps.min_frequency, caps.max_frequency
                )
                .as_bytes(),
            )
            .await?;
        }
        entries.push(InventoryEntry::Available(snapshot));
    }

    out.flush().await?;
    Ok(entries)
}

async fn failed_row<W: AsyncWrite + Unpin>(
    out: &mut W,
    prefix: &str,
    record: ControllerRecord,
    error: DriverError,
) -> Result<InventoryEntry, InventoryError> {
    warn!(id = %record.id, error = %error, "controller could not be listed");
    out.write_all(format!("{}Error: {}\n", prefix, error).as_bytes())
        .await?;
    Ok(InventoryEntry::Failed {
        record,
        message: error.to_string(),
    })
}
