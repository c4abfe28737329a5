use core::hash::{Hash, Hasher};
use std::ops::Deref;

use windows::Win32::Graphics::Gdi::HMONITOR;

/// Wrapper around an `HMONITOR` to make it `Send`.
///
/// The handle is only valid until the display topology changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorHandle(pub HMONITOR);

unsafe impl Send for MonitorHandle {}
unsafe impl Sync for MonitorHandle {}

impl Hash for MonitorHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0.0 as usize).hash(state);
    }
}

impl Deref for MonitorHandle {
    type Target = HMONITOR;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
