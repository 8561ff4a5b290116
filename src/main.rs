mod brightness;
mod cli;
mod config;
mod error;
mod input_classifier;
mod key_output;
mod led_scheduler;
mod led_source;
mod logging;
mod pad_controller;
mod pad_device;
mod panel;
mod rate_counters;

use std::path::PathBuf;
use std::thread;
use std::time::SystemTime;

use cli::{Cli, Command};
use config::Config;
use error::Error;
use led_source::LedSources;
use pad_controller::PadController;
use panel::PANEL_COUNT;

fn main() -> Result<(), Error> {
    let cli = <Cli as clap::Parser>::parse();
    logging::setup(cli.verbosity);

    match cli.command {
        Command::List => list_pads(),
        Command::VerifyConfig => {
            let config = Config::load(&cli.config)?;
            LedSources::from_files(&config.led_files)?;
            tracing::info!("Configuration verified");
            Ok(())
        }
        Command::Run { serial } => {
            let mut config = Config::load(&cli.config)?;
            if serial.is_some() {
                config.serial = serial;
            }
            run(&config)
        }
    }
}

fn list_pads() -> Result<(), Error> {
    let pads = pad_device::enumerate()?;
    if pads.is_empty() {
        tracing::info!("No dance pads connected");
    }
    for pad in pads {
        println!(
            "bus {:03} address {:03}  serial {:<16}  {}",
            pad.bus,
            pad.address,
            pad.serial.as_deref().unwrap_or("<unreadable>"),
            pad.product.as_deref().unwrap_or("<unknown product>"),
        );
    }
    Ok(())
}

fn run(config: &Config) -> Result<(), Error> {
    let mut controller = PadController::connect(config)?;
    let mut led_files = LedFileWatch::new(config.led_files.clone());

    while controller.is_running() {
        thread::sleep(config.report_interval());

        tracing::info!(
            samples = controller.sample_rate(),
            frames = controller.write_rate(),
            interval_ms = config.report_interval_ms,
            "loop rates"
        );

        if led_files.changed() {
            match LedSources::from_files(led_files.paths()) {
                Ok(sources) => {
                    tracing::info!("LED files changed, reloading");
                    if let Err(err) = controller.assign_led_sources(sources) {
                        tracing::warn!("could not hand over LED sources: {err}");
                    }
                }
                Err(err) => tracing::warn!("keeping previous LED sources: {err}"),
            }
        }
    }

    controller.stop()
}

/// Tracks modification times of the LED files so edits show up on the pad
/// without a restart.
struct LedFileWatch {
    paths: [PathBuf; PANEL_COUNT],
    modified: [Option<SystemTime>; PANEL_COUNT],
}

impl LedFileWatch {
    fn new(paths: [PathBuf; PANEL_COUNT]) -> Self {
        let modified = Self::modified_times(&paths);
        Self { paths, modified }
    }

    fn paths(&self) -> &[PathBuf; PANEL_COUNT] {
        &self.paths
    }

    fn changed(&mut self) -> bool {
        let modified = Self::modified_times(&self.paths);
        if modified == self.modified {
            return false;
        }
        self.modified = modified;
        true
    }

    fn modified_times(paths: &[PathBuf; PANEL_COUNT]) -> [Option<SystemTime>; PANEL_COUNT] {
        std::array::from_fn(|i| {
            std::fs::metadata(&paths[i])
                .and_then(|meta| meta.modified())
                .ok()
        })
    }
}
