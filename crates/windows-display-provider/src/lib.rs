//! Windows implementations of the display enumerations and DDC/CI monitor control.
//!
//! Monitor handles come from GDI, display paths from the display configuration API, serial
//! numbers from the `WmiMonitorID` WMI class, and monitor control from the DDC/CI calls in
//! `dxva2`.

#![cfg(windows)]

mod display_paths;
mod monitor_handle;
mod monitors;
mod physical_monitors;
mod result;
mod variant;
mod wide;
mod wmi;

use std::time::Instant;

use display_identity::{DeviceEnumerator, MonitorControl, PathRecord, RawDeviceRecord, WmiRecord};
use mccs_capabilities::INPUT_SELECT_CODE;
use thiserror::Error;
use tracing::{debug, instrument};

pub use display_paths::display_paths;
pub use monitor_handle::MonitorHandle;
pub use monitors::monitor_handles;
pub use physical_monitors::PhysicalMonitors;
pub use result::{LabelledWinResult, WinError, WinErrorSource};
pub use wmi::WmiConnection;

/// Failure of a Windows display call.
#[derive(Debug, Error)]
pub enum Error {
    /// A Windows call failed.
    #[error(transparent)]
    Windows(#[from] WinError),

    /// A WMI monitor record is missing a property.
    #[error("WMI monitor record has no {property}")]
    MissingProperty {
        /// The missing property.
        property: &'static str,
    },

    /// A WMI monitor record has an empty serial number.
    #[error("WMI monitor record {instance_id} has an empty serial number")]
    EmptySerial {
        /// The record's instance name.
        instance_id: String,
    },

    /// The monitor handle has no DDC/CI endpoint.
    #[error("Display has no physical monitors")]
    NoPhysicalMonitors,
}

/// The displays attached to this machine.
///
/// Holds a WMI connection, so COM stays initialized on the creating thread for its lifetime.
pub struct WindowsDisplays {
    wmi: WmiConnection,
}

impl WindowsDisplays {
    /// Connects to WMI.
    #[instrument(skip_all, err)]
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            wmi: WmiConnection::connect()?,
        })
    }
}

impl DeviceEnumerator for WindowsDisplays {
    type Handle = MonitorHandle;
    type Error = Error;

    fn monitor_handles(&self) -> Result<Vec<RawDeviceRecord<MonitorHandle>>, Error> {
        Ok(monitor_handles()?)
    }

    fn display_paths(&self) -> Result<Vec<PathRecord>, Error> {
        Ok(display_paths()?)
    }

    fn monitor_serials(&self) -> Result<Vec<WmiRecord>, Error> {
        self.wmi.monitor_ids()
    }
}

impl MonitorControl for WindowsDisplays {
    type Handle = MonitorHandle;
    type Error = Error;

    #[instrument(skip_all, err)]
    fn capabilities_string(&self, handle: &MonitorHandle) -> Result<String, Error> {
        let start = Instant::now();

        let capabilities = PhysicalMonitors::open(handle.0)?.capabilities_string()?;

        debug!(
            "[capabilities_string]
  [TIMING] {}ms",
            start.elapsed().as_millis()
        );

        Ok(capabilities)
    }

    fn input_select(&self, handle: &MonitorHandle) -> Result<u32, Error> {
        let value = PhysicalMonitors::open(handle.0)?.vcp_feature(INPUT_SELECT_CODE)?;

        // Some monitors report flags in the high byte.
        Ok(value % 256)
    }

    #[instrument(skip(self, handle), err)]
    fn set_input_select(&self, handle: &MonitorHandle, value: u16) -> Result<(), Error> {
        PhysicalMonitors::open(handle.0)?.set_vcp_feature(INPUT_SELECT_CODE, u32::from(value))
    }
}
