use mccs_capabilities::{
    INPUT_SELECT_CODE, InputSource, MalformedCapabilityString, format_input_code,
    parse_input_sources,
};
use thiserror::Error;
use tracing::debug;

use crate::{PathRecord, RawDeviceRecord, WmiRecord};

/// Source of the three display enumerations a refresh correlates.
///
/// Each call should reflect the same device topology for the duration of one refresh.
pub trait DeviceEnumerator {
    /// Opaque monitor handle.
    type Handle: Clone;

    /// Enumeration failure.
    type Error: core::error::Error + 'static;

    /// One record per active monitor handle.
    fn monitor_handles(&self) -> Result<Vec<RawDeviceRecord<Self::Handle>>, Self::Error>;

    /// One record per active display path.
    fn display_paths(&self) -> Result<Vec<PathRecord>, Self::Error>;

    /// One record per monitor known to WMI.
    fn monitor_serials(&self) -> Result<Vec<WmiRecord>, Self::Error>;
}

/// Failed to list the input sources of a display.
#[derive(Debug, Error)]
pub enum InputSourcesError<E: core::error::Error + 'static> {
    /// The capability string could not be retrieved.
    #[error("Failed to get capability string:\n{0}")]
    Capabilities(#[source] E),

    /// The capability string could not be parsed.
    #[error("Failed to parse capability string:\n{0}")]
    Malformed(#[from] MalformedCapabilityString),
}

/// Request and response calls to a single display.
pub trait MonitorControl {
    /// Opaque monitor handle.
    type Handle;

    /// Call failure.
    type Error: core::error::Error + 'static;

    /// Retrieves the raw capability string. This is slow, it may take seconds.
    fn capabilities_string(&self, handle: &Self::Handle) -> Result<String, Self::Error>;

    /// Reads the raw input select value.
    fn input_select(&self, handle: &Self::Handle) -> Result<u32, Self::Error>;

    /// Writes the input select value.
    fn set_input_select(&self, handle: &Self::Handle, value: u16) -> Result<(), Self::Error>;

    /// Lists the inputs the display advertises, `None` when it does not advertise input select.
    fn input_sources(
        &self,
        handle: &Self::Handle,
    ) -> Result<Option<Vec<InputSource>>, InputSourcesError<Self::Error>> {
        let capabilities = self
            .capabilities_string(handle)
            .map_err(InputSourcesError::Capabilities)?;
        debug!("Capabilities: {capabilities}");

        let sources = parse_input_sources(&capabilities)?;
        if sources.is_none() {
            debug!("Display does not advertise VCP {INPUT_SELECT_CODE:02X}");
        }

        Ok(sources)
    }

    /// The input the display is currently showing.
    fn current_input(&self, handle: &Self::Handle) -> Result<InputSource, Self::Error> {
        let value = self.input_select(handle)?;
        Ok(InputSource::from_code(format_input_code(value)))
    }
}
