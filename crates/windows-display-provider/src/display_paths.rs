use display_identity::PathRecord;
use tracing::{debug, instrument};
use windows::Win32::Devices::Display::{
    DISPLAYCONFIG_DEVICE_INFO_GET_SOURCE_NAME, DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME,
    DISPLAYCONFIG_DEVICE_INFO_HEADER, DISPLAYCONFIG_MODE_INFO, DISPLAYCONFIG_PATH_INFO,
    DISPLAYCONFIG_SOURCE_DEVICE_NAME, DISPLAYCONFIG_TARGET_DEVICE_NAME,
    DisplayConfigGetDeviceInfo, GetDisplayConfigBufferSizes, QDC_ONLY_ACTIVE_PATHS,
    QueryDisplayConfig,
};
use windows_core::HRESULT;

use crate::{LabelledWinResult, WinError, wide::from_wide};

/// Lists every active display path with its GDI source name and the monitor's friendly name.
#[instrument(level = "debug", err)]
pub fn display_paths() -> LabelledWinResult<Vec<PathRecord>> {
    let mut path_elements = 0;
    let mut mode_info_elements = 0;
    unsafe {
        let result = GetDisplayConfigBufferSizes(
            QDC_ONLY_ACTIVE_PATHS,
            &mut path_elements,
            &mut mode_info_elements,
        );

        if result.is_err() {
            return Err(WinError::from_win32(result, "GetDisplayConfigBufferSizes"));
        }
    }

    let mut paths = vec![DISPLAYCONFIG_PATH_INFO::default(); path_elements as usize];
    let mut mode_infos = vec![DISPLAYCONFIG_MODE_INFO::default(); mode_info_elements as usize];
    unsafe {
        let result = QueryDisplayConfig(
            QDC_ONLY_ACTIVE_PATHS,
            &mut path_elements,
            paths.as_mut_ptr(),
            &mut mode_info_elements,
            mode_infos.as_mut_ptr(),
            None,
        );

        if result.is_err() {
            return Err(WinError::from_win32(result, "QueryDisplayConfig"));
        }
    }
    paths.truncate(path_elements as usize);

    let records = paths
        .iter()
        .map(|path| {
            let source = unsafe { source_name(path)? };
            let target = unsafe { target_name(path)? };
            Ok(PathRecord::new(source, target))
        })
        .collect::<LabelledWinResult<Vec<_>>>()?;

    debug!("Found {} display path(s)", records.len());

    Ok(records)
}

/// GDI device name of the path's source, matches the monitor's `szDevice`.
unsafe fn source_name(path: &DISPLAYCONFIG_PATH_INFO) -> LabelledWinResult<String> {
    let mut config = DISPLAYCONFIG_SOURCE_DEVICE_NAME::default();
    config.header.adapterId = path.sourceInfo.adapterId;
    config.header.id = path.sourceInfo.id;
    config.header.r#type = DISPLAYCONFIG_DEVICE_INFO_GET_SOURCE_NAME;
    config.header.size = size_of::<DISPLAYCONFIG_SOURCE_DEVICE_NAME>() as u32;

    unsafe { device_info(&mut config.header)? };

    Ok(from_wide(&config.viewGdiDeviceName))
}

/// Friendly name of the monitor at the path's target.
unsafe fn target_name(path: &DISPLAYCONFIG_PATH_INFO) -> LabelledWinResult<String> {
    let mut config = DISPLAYCONFIG_TARGET_DEVICE_NAME::default();
    config.header.adapterId = path.targetInfo.adapterId;
    config.header.id = path.targetInfo.id;
    config.header.r#type = DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME;
    config.header.size = size_of::<DISPLAYCONFIG_TARGET_DEVICE_NAME>() as u32;

    unsafe { device_info(&mut config.header)? };

    Ok(from_wide(&config.monitorFriendlyDeviceName))
}

unsafe fn device_info(header: &mut DISPLAYCONFIG_DEVICE_INFO_HEADER) -> LabelledWinResult<()> {
    let result = unsafe { DisplayConfigGetDeviceInfo(header) };

    let hresult = HRESULT::from_win32(result as u32);
    if hresult.is_err() {
        return Err(WinError::from_hresult(
            hresult,
            "DisplayConfigGetDeviceInfo",
        ));
    }

    Ok(())
}
