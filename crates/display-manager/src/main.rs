//! # Display Manager
//! Lists the connected displays and switches their inputs over DDC/CI.
//!

#![allow(clippy::std_instead_of_alloc)]
// Everything but the entry point only runs on Windows or in tests.
#![cfg_attr(not(windows), allow(dead_code))]

use std::{path::Path, process::ExitCode};

use clap::Parser;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use utilities::directories::config_dir;

use cli::{Cli, Command};
use config::Config;
use tracing::{info, info_span};
use utilities::failure::{Failure, Reported};

mod cli;
mod commands;
mod config;
#[cfg(feature = "log")]
mod logger;
mod select;
#[cfg(test)]
mod test_displays;
mod utilities;

/// The Cargo package version.
#[cfg(not(debug_assertions))]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The Cargo package version or '0.0.0' if a non-release build.
#[cfg(debug_assertions)]
pub const VERSION: &str = "0.0.0";

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The logger lives in the config directory, so these can only go to stderr.
    let config_dir = match config_dir() {
        Ok(config_dir) => config_dir,
        Err(error) => {
            eprintln!("ERROR: Could not create the config directory:\n{error}");
            return ExitCode::FAILURE;
        }
    };

    // Set up logger
    #[cfg(feature = "log")]
    let _logger_guards = match logger::setup_logger(&config_dir, cli.debug) {
        Ok(guards) => guards,
        Err(error) => {
            eprintln!("ERROR: Could not set up logging:\n{error}");
            return ExitCode::FAILURE;
        }
    };

    // Log application start
    let _span = info_span!("[Main Thread]").entered();
    info!("Display Manager v{}", VERSION);

    match run(cli, &config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Reported) => ExitCode::FAILURE,
    }
}

fn run(cli: Cli, config_dir: &Path) -> Result<(), Reported> {
    let config_path = Config::file_path(config_dir);

    let mut config = load_config(&config_path, cli.reset_config)?;
    let loaded = config.clone();

    execute(cli.command, &mut config)?;

    if config != loaded {
        config
            .save(&config_path)
            .report("Could not save the configuration file")?;
    }

    Ok(())
}

fn load_config(path: &Path, reset: bool) -> Result<Config, Reported> {
    let maybe_config = if reset {
        info!("Resetting config file.");
        None
    } else {
        Config::try_load(path)
            .report("Your config file is invalid, run with --reset-config to replace it")?
    };

    match maybe_config {
        Some(config) => Ok(config),
        None => {
            let config = Config::default();
            config
                .save(path)
                .report("Could not save the configuration file")?;
            Ok(config)
        }
    }
}

#[cfg(windows)]
fn execute(command: Command, config: &mut Config) -> Result<(), Reported> {
    use commands::Session;
    use windows_display_provider::WindowsDisplays;

    let displays = WindowsDisplays::new().report("Could not connect to WMI")?;

    let mut session = Session::new(&displays, config, std::io::stdout())
        .report("Could not identify the connected displays")?;

    session.run(command).report("Command failed")
}

#[cfg(not(windows))]
fn execute(_: Command, _: &mut Config) -> Result<(), Reported> {
    Err(utilities::failure::report(
        "DDC/CI and WMI are only available on Windows",
        "Display Manager does not support this platform",
    ))
}
