use core::fmt;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{DisplayIdentity, PathRecord, RawDeviceRecord, WmiRecord};

/// Which of the two joins a correlation error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Monitor handles joined to display paths on the source device name.
    Path,

    /// Monitor handles joined to WMI records on the sub-id.
    Wmi,
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("display path"),
            Self::Wmi => f.write_str("WMI"),
        }
    }
}

/// The enumerations do not describe the same set of displays.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    /// A display matched more than one record, or a record matched more than one display.
    #[error("Display {source_device_name} has more than one {join} record for '{key}'")]
    Ambiguous {
        /// The join that failed.
        join: Join,
        /// Source device name of the display that could not be matched uniquely.
        source_device_name: String,
        /// The join key that was duplicated.
        key: String,
    },

    /// A display matched no record.
    #[error("Display {source_device_name} has no {join} record for '{key}'")]
    Incomplete {
        /// The join that failed.
        join: Join,
        /// Source device name of the unmatched display.
        source_device_name: String,
        /// The join key that found no record.
        key: String,
    },
}

impl CorrelationError {
    /// The join that failed.
    pub fn join(&self) -> Join {
        match self {
            Self::Ambiguous { join, .. } | Self::Incomplete { join, .. } => *join,
        }
    }
}

/// Joins monitor handles with display paths and WMI records.
///
/// Every handle must match exactly one path on its source device name and exactly
/// one WMI record on its sub-id, and no record may match two handles. Records that
/// match no handle are skipped. Either every handle resolves or nothing is returned.
#[instrument(level = "debug", skip_all, err)]
pub fn correlate<H: Clone>(
    handles: &[RawDeviceRecord<H>],
    paths: &[PathRecord],
    wmi: &[WmiRecord],
) -> Result<Vec<DisplayIdentity<H>>, CorrelationError> {
    let matched_paths = join(
        Join::Path,
        handles,
        paths,
        |handle| handle.source_device_name.as_str(),
        |path| path.source_device_name.as_str(),
    )?;

    let matched_wmi = join(
        Join::Wmi,
        handles,
        wmi,
        |handle| handle.sub_id(),
        |record| record.sub_id(),
    )?;

    let identities = handles
        .iter()
        .zip(matched_paths)
        .zip(matched_wmi)
        .map(|((handle, path), record)| DisplayIdentity {
            handle: handle.handle.clone(),
            friendly_name: path.target_friendly_name.clone(),
            serial: record.serial_number.clone(),
            source_device_name: handle.source_device_name.clone(),
            sub_id: handle.sub_id().to_string(),
        })
        .collect();

    Ok(identities)
}

/// Matches each record against every handle, failing as soon as a match is not unique.
/// Returns the matched record for each handle, in handle order.
fn join<'r, H, R: fmt::Debug>(
    join: Join,
    handles: &[RawDeviceRecord<H>],
    records: &'r [R],
    handle_key: impl Fn(&RawDeviceRecord<H>) -> &str,
    record_key: impl Fn(&R) -> &str,
) -> Result<Vec<&'r R>, CorrelationError> {
    let mut matches: Vec<Option<&'r R>> = vec![None; handles.len()];

    for record in records {
        let key = record_key(record);
        let mut claimed = false;

        for (handle, slot) in handles.iter().zip(matches.iter_mut()) {
            if handle_key(handle) != key {
                continue;
            }

            if claimed || slot.is_some() {
                return Err(CorrelationError::Ambiguous {
                    join,
                    source_device_name: handle.source_device_name.clone(),
                    key: key.to_string(),
                });
            }

            claimed = true;
            *slot = Some(record);
        }

        if !claimed {
            debug!("Unclaimed {join} record {record:?}");
        }
    }

    handles
        .iter()
        .zip(matches)
        .map(|(handle, slot)| {
            slot.ok_or_else(|| CorrelationError::Incomplete {
                join,
                source_device_name: handle.source_device_name.clone(),
                key: handle_key(handle).to_string(),
            })
        })
        .collect()
}
