use crate::sub_id;

/// A monitor handle from the monitor enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeviceRecord<H> {
    /// Opaque monitor handle.
    pub handle: H,

    /// GDI source device name, e.g. `\\.\DISPLAY1`.
    pub source_device_name: String,

    /// Device id of the monitor attached to the source, e.g.
    /// `MONITOR\DEL4123\{4d36e96e-e325-11ce-bfc1-08002be10318}\0001`.
    pub device_id: String,
}

impl<H> RawDeviceRecord<H> {
    /// Creates a new record.
    pub fn new<S: Into<String>, D: Into<String>>(
        handle: H,
        source_device_name: S,
        device_id: D,
    ) -> Self {
        Self {
            handle,
            source_device_name: source_device_name.into(),
            device_id: device_id.into(),
        }
    }

    /// The key used to join against WMI records.
    pub fn sub_id(&self) -> &str {
        sub_id(&self.device_id)
    }
}

/// An active display path from the display configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    /// GDI source device name of the path.
    pub source_device_name: String,

    /// Friendly name of the monitor at the target of the path.
    pub target_friendly_name: String,
}

impl PathRecord {
    /// Creates a new record.
    pub fn new<S: Into<String>, T: Into<String>>(
        source_device_name: S,
        target_friendly_name: T,
    ) -> Self {
        Self {
            source_device_name: source_device_name.into(),
            target_friendly_name: target_friendly_name.into(),
        }
    }
}

/// A `WmiMonitorID` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmiRecord {
    /// WMI instance name, e.g. `DISPLAY\DEL4123\5&1b7e7b0a&0&UID4352_0`.
    pub instance_id: String,

    /// Serial number reported by the monitor.
    pub serial_number: String,
}

impl WmiRecord {
    /// Creates a new record.
    pub fn new<I: Into<String>, S: Into<String>>(instance_id: I, serial_number: S) -> Self {
        Self {
            instance_id: instance_id.into(),
            serial_number: serial_number.into(),
        }
    }

    /// The key used to join against monitor handles.
    pub fn sub_id(&self) -> &str {
        sub_id(&self.instance_id)
    }
}

/// Decodes a WMI character code array such as `SerialNumberID`.
///
/// Each element holds one character in its low byte, the array is zero padded.
pub fn serial_from_char_codes<I: IntoIterator<Item = i32>>(codes: I) -> String {
    let serial: String = codes
        .into_iter()
        .map(|code| (code & 0xff) as u8)
        .take_while(|&byte| byte != 0)
        .map(char::from)
        .collect();

    serial.trim().to_string()
}
