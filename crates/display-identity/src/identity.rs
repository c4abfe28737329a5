use core::fmt;

/// A fully correlated display.
///
/// Only produced by a correlation pass in which every join succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DisplayIdentity<H> {
    /// Opaque monitor handle.
    pub handle: H,

    /// Friendly name from the matched display path.
    pub friendly_name: String,

    /// Serial number from the matched WMI record.
    pub serial: String,

    /// GDI source device name the path join used.
    pub source_device_name: String,

    /// Sub-id the WMI join used.
    pub sub_id: String,
}

impl<H> fmt::Display for DisplayIdentity<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({})",
            self.friendly_name, self.serial, self.source_device_name
        )
    }
}
