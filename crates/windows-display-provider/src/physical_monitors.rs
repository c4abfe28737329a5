use tracing::{debug, warn};
use windows::Win32::{
    Devices::Display::{
        CapabilitiesRequestAndCapabilitiesReply, DestroyPhysicalMonitors,
        GetCapabilitiesStringLength, GetNumberOfPhysicalMonitorsFromHMONITOR,
        GetPhysicalMonitorsFromHMONITOR, GetVCPFeatureAndVCPFeatureReply, PHYSICAL_MONITOR,
        SetVCPFeature,
    },
    Foundation::HANDLE,
    Graphics::Gdi::HMONITOR,
};

use crate::{Error, LabelledWinResult, WinError, result::LabelledWinResultExt, wide::from_ascii_reply};

/// The DDC/CI endpoints behind one monitor handle, released on drop.
pub struct PhysicalMonitors {
    monitors: Vec<PHYSICAL_MONITOR>,
}

impl PhysicalMonitors {
    /// Opens the physical monitors behind `monitor`.
    pub fn open(monitor: HMONITOR) -> Result<Self, Error> {
        let mut count = 0;
        unsafe {
            GetNumberOfPhysicalMonitorsFromHMONITOR(monitor, &mut count)
                .label("GetNumberOfPhysicalMonitorsFromHMONITOR")?;
        }

        if count == 0 {
            return Err(Error::NoPhysicalMonitors);
        }

        let mut monitors = vec![PHYSICAL_MONITOR::default(); count as usize];
        unsafe {
            GetPhysicalMonitorsFromHMONITOR(monitor, &mut monitors)
                .label("GetPhysicalMonitorsFromHMONITOR")?;
        }

        Ok(Self { monitors })
    }

    fn handles(&self) -> impl Iterator<Item = HANDLE> + '_ {
        // Packed struct, copy the field out.
        self.monitors.iter().map(|monitor| monitor.hPhysicalMonitor)
    }

    /// The capability string of the first physical monitor that replies.
    pub fn capabilities_string(&self) -> Result<String, Error> {
        let mut last_error = None;

        for handle in self.handles() {
            match unsafe { capabilities_string(handle) } {
                Ok(capabilities) => return Ok(capabilities),
                Err(e) => {
                    debug!("Physical monitor did not reply with capabilities: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or(Error::NoPhysicalMonitors, Error::from))
    }

    /// Reads a VCP feature's current value from the first physical monitor.
    pub fn vcp_feature(&self, code: u8) -> Result<u32, Error> {
        let handle = self.handles().next().ok_or(Error::NoPhysicalMonitors)?;

        let mut current = 0;
        let mut maximum = 0;
        let replied = unsafe {
            GetVCPFeatureAndVCPFeatureReply(handle, code, None, &mut current, Some(&raw mut maximum))
        };
        if replied == 0 {
            return Err(WinError::last_error("GetVCPFeatureAndVCPFeatureReply").into());
        }

        Ok(current)
    }

    /// Writes a VCP feature to every physical monitor.
    pub fn set_vcp_feature(&self, code: u8, value: u32) -> Result<(), Error> {
        let mut result = Ok(());

        for handle in self.handles() {
            let accepted = unsafe { SetVCPFeature(handle, code, value) };
            if accepted == 0 {
                let error = WinError::last_error("SetVCPFeature");
                warn!("Physical monitor rejected VCP {code:02X}: {error}");
                result = Err(error.into());
            }
        }

        result
    }
}

impl Drop for PhysicalMonitors {
    fn drop(&mut self) {
        if let Err(e) = unsafe { DestroyPhysicalMonitors(&self.monitors) } {
            warn!("Failed to destroy physical monitors: {e}");
        }
    }
}

unsafe fn capabilities_string(handle: HANDLE) -> LabelledWinResult<String> {
    let mut length = 0;
    if unsafe { GetCapabilitiesStringLength(handle, &mut length) } == 0 {
        return Err(WinError::last_error("GetCapabilitiesStringLength"));
    }

    let mut buffer = vec![0_u8; length as usize];
    if unsafe { CapabilitiesRequestAndCapabilitiesReply(handle, &mut buffer) } == 0 {
        return Err(WinError::last_error("CapabilitiesRequestAndCapabilitiesReply"));
    }

    Ok(from_ascii_reply(&buffer))
}
