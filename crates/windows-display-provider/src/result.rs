use core::fmt::Display;

use thiserror::Error;
use windows::Win32::Foundation::WIN32_ERROR;
use windows_core::HRESULT;

/// A shortcut for `Result<T, WinError>`.
pub type LabelledWinResult<T> = Result<T, WinError>;

/// A failed Windows call, labelled with the name of the call.
#[derive(Debug, Error)]
pub struct WinError {
    call: &'static str,
    #[source]
    source: WinErrorSource,
}

/// What a Windows call reported when it failed.
#[derive(Debug, Error)]
pub enum WinErrorSource {
    /// A [windows_result::Error].
    #[error(transparent)]
    WindowsError(#[from] windows_result::Error),

    /// An [HRESULT].
    #[error("HRESULT: {0}")]
    HResult(HRESULT),

    /// A [WIN32_ERROR].
    #[error("Win32: {0:?}")]
    Win32(WIN32_ERROR),
}

impl WinError {
    /// Label a `windows_result::Error`.
    pub fn new(source: windows_result::Error, call: &'static str) -> Self {
        Self {
            call,
            source: source.into(),
        }
    }

    /// Label the calling thread's last error. For calls that only report success as a `BOOL`.
    pub fn last_error(call: &'static str) -> Self {
        Self::new(windows_result::Error::from_win32(), call)
    }

    /// Label a `WIN32_ERROR`.
    pub fn from_win32(source: WIN32_ERROR, call: &'static str) -> Self {
        Self {
            call,
            source: WinErrorSource::Win32(source),
        }
    }

    /// Label an `HRESULT`.
    pub fn from_hresult(source: HRESULT, call: &'static str) -> Self {
        Self {
            call,
            source: WinErrorSource::HResult(source),
        }
    }
}

impl Display for WinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Windows {} call failed:\n{}", self.call, self.source)
    }
}

/// Extension for labelling the error of a `windows_result::Result`.
pub trait LabelledWinResultExt<T> {
    /// Label the error with the call that produced it.
    fn label(self, call: &'static str) -> LabelledWinResult<T>;
}

impl<T> LabelledWinResultExt<T> for windows_result::Result<T> {
    fn label(self, call: &'static str) -> LabelledWinResult<T> {
        self.map_err(|e| WinError::new(e, call))
    }
}
