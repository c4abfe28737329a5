use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "display-manager")]
#[command(about = "Lists displays and switches their inputs over DDC/CI")]
#[command(version = crate::VERSION)]
pub struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Replace the config file with the default config
    #[arg(long, global = true)]
    pub reset_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the connected displays
    List,

    /// List the inputs a display advertises, this may take a few seconds
    Inputs {
        /// Index, serial number or name of the display
        display: String,
    },

    /// Show the input a display is currently showing
    Current {
        /// Index, serial number or name of the display
        display: String,
    },

    /// Switch a display to another input
    Set {
        /// Index, serial number or name of the display
        display: String,

        /// Input code in hex, as listed by `inputs`
        code: String,
    },

    /// Give a display a name, an empty name removes it
    Rename {
        /// Index, serial number or name of the display
        display: String,

        name: String,
    },

    /// Save and restore the inputs of every display
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Save the current input of every display
    Save { name: String },

    /// Switch every display in the profile to its saved input
    Load { name: String },

    /// Load the first profile, or the second if the first was the last one loaded
    Toggle { first: String, second: String },

    /// List the saved profiles
    List,
}
