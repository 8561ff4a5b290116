use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::error::Error;
use crate::input_classifier::{InputClassifier, ThresholdClassifier};
use crate::key_output::{KeyboardInput, VirtualKeyboard};
use crate::led_scheduler::{LedScheduler, LedSlot, Sweep};
use crate::led_source::LedSources;
use crate::pad_device::{PadDevice, PadTransport, PanelData, PanelSums, REPORT_SIZE};
use crate::rate_counters::RateCounters;

const THREAD_NAME: &str = "pad-lights-loop";

/// Runs the sensor/LED loop of one pad on a background thread.
///
/// Each slot of the LED sweep reads one report, updates press state, and
/// writes one LED command, so LED refresh and sensor sampling share a rate.
pub struct PadController {
    running: Arc<AtomicBool>,
    counters: Arc<RateCounters>,
    tx: Sender<Command>,
    thread: Option<JoinHandle<Result<(), Error>>>,
}

impl PadController {
    /// Open the configured pad and start its loop. Presses are typed on a
    /// virtual keyboard when the config binds keys to the panels.
    pub fn connect(config: &Config) -> Result<Self, Error> {
        let sources = LedSources::from_files(&config.led_files)?;
        let keyboard = match &config.keys {
            Some(keys) => Some((VirtualKeyboard::create(keys)?, *keys)),
            None => None,
        };
        let device = PadDevice::open(config.serial.as_deref(), config.transfer_timeout())?;
        let sensitivities = config.sensitivities;

        match keyboard {
            Some((keyboard, keys)) => Self::launch(device, sources, move |sums| {
                KeyboardInput::new(ThresholdClassifier::new(sums, sensitivities), keyboard, keys)
            }),
            None => Self::launch(device, sources, move |sums| {
                ThresholdClassifier::new(sums, sensitivities)
            }),
        }
    }

    /// Prime the loop with one report and start it on a background thread.
    ///
    /// `make_classifier` receives the panel sums of the priming read. Returns
    /// once the thread is running.
    pub fn launch<T, C, F>(
        mut transport: T,
        sources: LedSources,
        make_classifier: F,
    ) -> Result<Self, Error>
    where
        T: PadTransport + Send + 'static,
        C: InputClassifier + Send + 'static,
        F: FnOnce(&PanelSums) -> C,
    {
        let mut report = [0u8; REPORT_SIZE];
        let sums = read_panel_sums(&mut transport, &mut report)?;
        tracing::debug!(?sums, "primed panel sums");

        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(RateCounters::new());
        let (tx, rx) = mpsc::channel::<Command>();

        let control_loop = ControlLoop {
            transport,
            classifier: make_classifier(&sums),
            scheduler: LedScheduler::new(sources),
            report,
            counters: Arc::clone(&counters),
            commands: rx,
        };

        let thread = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn({
                let running = Arc::clone(&running);
                move || control_loop.run(&running)
            })
            .map_err(Error::WorkerSpawn)?;

        Ok(Self {
            running,
            counters,
            tx,
            thread: Some(thread),
        })
    }

    /// Replace the LED sources; the loop picks them up at the next slot.
    pub fn assign_led_sources(&self, sources: LedSources) -> Result<(), Error> {
        self.tx
            .send(Command::AssignLedSources(sources))
            .map_err(|_| Error::WorkerGone)
    }

    /// `false` once the loop has exited, whether stopped or failed.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Sensor reads since the previous call.
    pub fn sample_rate(&self) -> u64 {
        self.counters.take_samples()
    }

    /// LED frames written since the previous call.
    pub fn write_rate(&self) -> u64 {
        self.counters.take_frames()
    }

    /// Ask the loop to exit at the next slot boundary and wait for it.
    ///
    /// Returns the error that ended the loop, if it failed on its own.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.running.store(false, Ordering::Release);
        match self.thread.take() {
            Some(handle) => handle.join().map_err(|_| Error::WorkerPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for PadController {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::debug!("control loop had ended with: {err}");
        }
    }
}

enum Command {
    AssignLedSources(LedSources),
}

struct ControlLoop<T, C> {
    transport: T,
    classifier: C,
    scheduler: LedScheduler,
    report: [u8; REPORT_SIZE],
    counters: Arc<RateCounters>,
    commands: Receiver<Command>,
}

impl<T: PadTransport, C: InputClassifier> ControlLoop<T, C> {
    fn run(mut self, running: &AtomicBool) -> Result<(), Error> {
        tracing::info!("control loop started");
        let result = self.run_sweeps(running);
        // Release the device and the command channel before reporting the exit.
        drop(self);
        running.store(false, Ordering::Release);

        match &result {
            Ok(()) => tracing::info!("control loop stopped"),
            Err(err) => tracing::error!("control loop terminated: {err}"),
        }
        result
    }

    fn run_sweeps(&mut self, running: &AtomicBool) -> Result<(), Error> {
        loop {
            for slot in Sweep::new() {
                if !running.load(Ordering::Acquire) {
                    return Ok(());
                }
                self.apply_commands();
                self.run_slot(slot)?;
            }
        }
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::AssignLedSources(sources) => {
                    tracing::debug!("installing new LED sources");
                    self.scheduler.set_sources(sources);
                }
            }
        }
    }

    /// One read, one classifier poll, one animation step, one LED write.
    fn run_slot(&mut self, slot: LedSlot) -> Result<(), Error> {
        let sums = read_panel_sums(&mut self.transport, &mut self.report)?;
        self.classifier.poll(&sums);
        self.counters.record_sample();

        let just_pressed = self.classifier.take_just_pressed(slot.panel);
        let command = self.scheduler.render_slot(slot, just_pressed);
        self.transport.write_command(command.as_bytes())?;
        self.counters.record_write();
        Ok(())
    }
}

fn read_panel_sums<T: PadTransport>(
    transport: &mut T,
    report: &mut [u8; REPORT_SIZE],
) -> Result<PanelSums, Error> {
    let len = transport.read_report(report)?;
    let received = report.get(..len).ok_or(Error::MalformedReport {
        len,
        expected: REPORT_SIZE,
    })?;
    let data = PanelData::from_report(received)?;
    tracing::trace!(values = ?data.values(), "sensor report");
    Ok(data.panel_sums())
}
