use display_identity::RawDeviceRecord;
use tracing::{debug, instrument};
use windows::Win32::{
    Foundation::{LPARAM, RECT},
    Graphics::Gdi::{
        DISPLAY_DEVICEW, EnumDisplayDevicesW, EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR,
        MONITORINFO, MONITORINFOEXW,
    },
};
use windows_core::{BOOL, PCWSTR};

use crate::{LabelledWinResult, MonitorHandle, WinError, result::LabelledWinResultExt, wide::from_wide};

/// Lists every active monitor handle with its GDI source name and device interface id.
#[instrument(level = "debug", err)]
pub fn monitor_handles() -> LabelledWinResult<Vec<RawDeviceRecord<MonitorHandle>>> {
    let mut handles: Vec<HMONITOR> = Vec::new();

    unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor),
            LPARAM(&mut handles as *mut Vec<HMONITOR> as isize),
        )
        .ok()
        .label("EnumDisplayMonitors")?;
    }

    let records = handles
        .into_iter()
        .map(|handle| unsafe { describe(handle) })
        .collect::<LabelledWinResult<Vec<_>>>()?;

    debug!("Found {} monitor handle(s)", records.len());

    Ok(records)
}

// The LPARAM is a pointer to the list of handles being collected.
unsafe extern "system" fn enum_monitor(
    monitor: HMONITOR,
    _: HDC,
    _: *mut RECT,
    state: LPARAM,
) -> BOOL {
    let handles = unsafe { &mut *(state.0 as *mut Vec<HMONITOR>) };
    handles.push(monitor);
    true.into()
}

unsafe fn describe(handle: HMONITOR) -> LabelledWinResult<RawDeviceRecord<MonitorHandle>> {
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = size_of::<MONITORINFOEXW>() as u32;

    unsafe {
        GetMonitorInfoW(handle, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO)
            .ok()
            .label("GetMonitorInfoW")?;
    }

    let mut device = DISPLAY_DEVICEW {
        cb: size_of::<DISPLAY_DEVICEW>() as u32,
        ..Default::default()
    };

    unsafe {
        let found = EnumDisplayDevicesW(PCWSTR(info.szDevice.as_ptr()), 0, &mut device, 0);
        if !found.as_bool() {
            return Err(WinError::last_error("EnumDisplayDevicesW"));
        }
    }

    Ok(RawDeviceRecord::new(
        MonitorHandle(handle),
        from_wide(&info.szDevice),
        from_wide(&device.DeviceID),
    ))
}
