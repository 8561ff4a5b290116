use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Path of the configuration file
    #[arg(long, short, default_value = "pad-lights.yml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// List connected dance pads
    List,
    /// Drive the pad until it disconnects
    Run {
        /// Serial number of the pad, overriding the configuration file
        #[arg(long)]
        serial: Option<String>,
    },
    /// Load the configuration and LED files, then exit
    VerifyConfig,
}
