use std::{sync::Arc, time::Instant};

use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::{CorrelationError, DeviceEnumerator, DisplayIdentity, correlate};

/// Failed to refresh the display collection.
#[derive(Debug, Error)]
pub enum RefreshError<E: core::error::Error + 'static> {
    /// Monitor handles could not be enumerated.
    #[error("Failed to enumerate monitor handles:\n{0}")]
    MonitorHandles(#[source] E),

    /// Display paths could not be enumerated.
    #[error("Failed to enumerate display paths:\n{0}")]
    DisplayPaths(#[source] E),

    /// Monitor serials could not be enumerated.
    #[error("Failed to enumerate monitor serials:\n{0}")]
    MonitorSerials(#[source] E),

    /// The enumerations did not agree.
    #[error("Failed to correlate displays:\n{0}")]
    Correlate(#[from] CorrelationError),
}

/// The displays found by the last successful refresh.
///
/// A refresh builds a whole new generation before replacing the current one, a
/// failed refresh leaves the current generation untouched.
#[derive(Debug)]
pub struct DisplayCollection<H> {
    displays: Arc<[DisplayIdentity<H>]>,
}

impl<H> Default for DisplayCollection<H> {
    fn default() -> Self {
        Self {
            displays: Arc::new([]),
        }
    }
}

impl<H: Clone> DisplayCollection<H> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerates and correlates the current displays, replacing the current generation.
    #[instrument(skip_all, err)]
    pub fn refresh<E>(&mut self, enumerator: &E) -> Result<(), RefreshError<E::Error>>
    where
        E: DeviceEnumerator<Handle = H>,
    {
        let start = Instant::now();

        let handles = enumerator
            .monitor_handles()
            .map_err(RefreshError::MonitorHandles)?;
        let paths = enumerator
            .display_paths()
            .map_err(RefreshError::DisplayPaths)?;
        let wmi = enumerator
            .monitor_serials()
            .map_err(RefreshError::MonitorSerials)?;

        let displays = correlate(&handles, &paths, &wmi).inspect_err(|e| {
            error!(
                "{} handle(s), {} path(s), {} WMI record(s) could not be correlated: {e}",
                handles.len(),
                paths.len(),
                wmi.len()
            )
        })?;

        self.displays = displays.into();

        debug!(
            "[refresh]{}
  [TIMING] {}ms",
            self.displays
                .iter()
                .fold(String::new(), |acc, display| format!("{acc}\n  {display}")),
            start.elapsed().as_millis()
        );

        Ok(())
    }

    /// The current generation.
    pub fn displays(&self) -> &[DisplayIdentity<H>] {
        &self.displays
    }

    /// A shared handle to the current generation that later refreshes will not change.
    pub fn snapshot(&self) -> Arc<[DisplayIdentity<H>]> {
        Arc::clone(&self.displays)
    }

    /// Finds a display by its serial number.
    pub fn by_serial(&self, serial: &str) -> Option<&DisplayIdentity<H>> {
        self.displays.iter().find(|display| display.serial == serial)
    }

    /// Number of displays in the current generation.
    pub fn len(&self) -> usize {
        self.displays.len()
    }

    /// Whether the current generation has no displays.
    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }
}
