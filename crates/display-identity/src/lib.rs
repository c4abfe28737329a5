//! # Display Identity
//! Joins the monitor handle, display path and WMI enumerations of the same
//! physical displays into one identity per display.
//!

mod collection;
mod control;
mod correlate;
mod identity;
mod records;
mod sub_id;

pub use collection::{DisplayCollection, RefreshError};
pub use control::{DeviceEnumerator, InputSourcesError, MonitorControl};
pub use correlate::{CorrelationError, Join, correlate};
pub use identity::DisplayIdentity;
pub use records::{PathRecord, RawDeviceRecord, WmiRecord, serial_from_char_codes};
pub use sub_id::sub_id;
