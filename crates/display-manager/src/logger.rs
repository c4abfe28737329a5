use std::path::Path;

use tracing::{
    Level,
    subscriber::{SetGlobalDefaultError, set_global_default},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Targets, fmt::format::FmtSpan, layer::SubscriberExt};

const LOG_FILE: &str = "display-manager.log";

/// Log to stderr and to a file in `log_dir`. The guards must be held until exit.
///
/// Stdout is left to command output.
pub fn setup_logger(
    log_dir: &Path,
    should_debug: bool,
) -> Result<[WorkerGuard; 2], SetGlobalDefaultError> {
    let level = if should_debug {
        Level::TRACE
    } else {
        Level::INFO
    };
    let filter = Targets::new().with_default(level);

    // stderr logger
    let (std_writer, std_guard) = tracing_appender::non_blocking(std::io::stderr());
    let std_logger = tracing_subscriber::fmt::layer()
        .with_writer(std_writer)
        .with_ansi(false)
        .with_target(false);

    // file logger
    let file = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file);
    let file_logger = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(should_debug)
        .with_span_events(FmtSpan::CLOSE | FmtSpan::ENTER);

    // Register loggers
    let collector = tracing_subscriber::registry()
        .with(std_logger)
        .with(file_logger)
        .with(filter);

    set_global_default(collector)?;

    Ok([std_guard, file_guard])
}
