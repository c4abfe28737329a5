use tracing::error;

/// An error that has already been shown to the user.
#[derive(Debug)]
pub struct Reported;

/// Log the error so the user sees it, to be followed by a failure exit code.
pub fn report<Err: core::fmt::Display>(error: Err, message: &str) -> Reported {
    error!("{message}:\n{error}");

    // Without the logger nothing else reaches the console.
    #[cfg(not(feature = "log"))]
    eprintln!("ERROR: {message}:\n{error}");

    Reported
}

pub trait Failure<T> {
    fn report(self, message: &str) -> Result<T, Reported>;
}

impl<T, E: core::fmt::Display> Failure<T> for Result<T, E> {
    fn report(self, message: &str) -> Result<T, Reported> {
        self.map_err(|error| report(error, message))
    }
}
