//! In-memory displays for exercising commands without any hardware.

use core::cell::{Cell, RefCell};

use display_identity::{DeviceEnumerator, MonitorControl, PathRecord, RawDeviceRecord, WmiRecord};

#[derive(Debug, thiserror::Error)]
#[error("fake failure: {0}")]
pub struct FakeError(&'static str);

pub struct FakeDisplays {
    /// Model, friendly name and serial of each display.
    models: Vec<(&'static str, &'static str, &'static str)>,
    capabilities: &'static str,
    pub inputs: RefCell<Vec<u32>>,
    /// Accept writes without ever switching.
    pub stuck: Cell<bool>,
    pub writes: Cell<usize>,
}

impl FakeDisplays {
    pub fn new() -> Self {
        Self {
            models: vec![
                ("DEL4123", "DELL U2415", "7MT0186K1ABL"),
                ("GSM5B7F", "LG ULTRAGEAR", "104NTAB12345"),
                ("ACR0A1B", "Acer XF270H", "T77AA0012345"),
            ],
            capabilities: "(prot(monitor)type(lcd)model(U2415)vcp(02 10 12 60(0F 11 12)))",
            inputs: RefCell::new(vec![0x0F, 0x11, 0x0111]),
            stuck: Cell::new(false),
            writes: Cell::new(0),
        }
    }
}

impl DeviceEnumerator for FakeDisplays {
    type Handle = usize;
    type Error = FakeError;

    fn monitor_handles(&self) -> Result<Vec<RawDeviceRecord<usize>>, FakeError> {
        Ok(self
            .models
            .iter()
            .enumerate()
            .map(|(index, (model, _, _))| {
                RawDeviceRecord::new(
                    index,
                    format!(r"\\.\DISPLAY{}", index + 1),
                    format!(r"MONITOR\{model}\{{4d36e96e-e325-11ce-bfc1-08002be10318}}\000{index}"),
                )
            })
            .collect())
    }

    fn display_paths(&self) -> Result<Vec<PathRecord>, FakeError> {
        Ok(self
            .models
            .iter()
            .enumerate()
            .map(|(index, (_, name, _))| PathRecord::new(format!(r"\\.\DISPLAY{}", index + 1), *name))
            .collect())
    }

    fn monitor_serials(&self) -> Result<Vec<WmiRecord>, FakeError> {
        Ok(self
            .models
            .iter()
            .map(|(model, _, serial)| {
                WmiRecord::new(format!(r"DISPLAY\{model}\5&1b7e7b0a&0&UID4352_0"), *serial)
            })
            .collect())
    }
}

impl MonitorControl for FakeDisplays {
    type Handle = usize;
    type Error = FakeError;

    fn capabilities_string(&self, _: &usize) -> Result<String, FakeError> {
        Ok(self.capabilities.to_string())
    }

    fn input_select(&self, handle: &usize) -> Result<u32, FakeError> {
        self.inputs
            .borrow()
            .get(*handle)
            .copied()
            .ok_or(FakeError("no reply"))
    }

    fn set_input_select(&self, handle: &usize, value: u16) -> Result<(), FakeError> {
        self.writes.set(self.writes.get() + 1);

        if !self.stuck.get() {
            let mut inputs = self.inputs.borrow_mut();
            let input = inputs.get_mut(*handle).ok_or(FakeError("no reply"))?;
            *input = u32::from(value);
        }

        Ok(())
    }
}
