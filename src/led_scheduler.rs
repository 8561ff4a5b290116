use crate::brightness::PanelBrightness;
use crate::led_source::{LedSources, SEGMENT_COUNT};
use crate::panel::{Panel, PANEL_COUNT};

/// Multiplexing frames per segment.
pub const FRAME_COUNT: usize = 16;
/// Slots in one full sweep of the LED matrix.
pub const SLOTS_PER_SWEEP: usize = FRAME_COUNT * PANEL_COUNT * SEGMENT_COUNT;

/// Report id leading every LED command.
const LED_REPORT_ID: u8 = 0x00;

/// One multiplexed position of the LED matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedSlot {
    pub frame: u8,
    pub panel: Panel,
    pub segment: u8,
}

impl LedSlot {
    /// Packed address byte: `panel << 6 | segment << 4 | frame`.
    pub fn address(self) -> u8 {
        (self.panel as u8) << 6 | self.segment << 4 | self.frame
    }
}

/// Slots of one sweep, frame outermost and segment innermost.
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    position: usize,
}

impl Sweep {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for Sweep {
    type Item = LedSlot;

    fn next(&mut self) -> Option<LedSlot> {
        if self.position >= SLOTS_PER_SWEEP {
            return None;
        }
        let position = self.position;
        self.position += 1;

        let panel = Panel::from_index((position / SEGMENT_COUNT) % PANEL_COUNT)?;
        Some(LedSlot {
            frame: (position / (SEGMENT_COUNT * PANEL_COUNT)) as u8,
            panel,
            segment: (position % SEGMENT_COUNT) as u8,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = SLOTS_PER_SWEEP.saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sweep {}

/// Scale an intensity byte by `brightness`, saturating at 0 and 255 and
/// truncating in between.
pub fn scale_intensity(value: u8, brightness: f64) -> u8 {
    let scaled = f64::from(value) * brightness;
    if scaled > 255.0 {
        255
    } else if scaled < 0.0 {
        0
    } else {
        scaled as u8
    }
}

/// Output report addressing one slot: report id, address, scaled intensities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedCommand {
    bytes: Vec<u8>,
}

impl LedCommand {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[allow(dead_code)]
    pub fn address(&self) -> Option<u8> {
        self.bytes.get(1).copied()
    }

    #[allow(dead_code)]
    pub fn intensities(&self) -> &[u8] {
        self.bytes.get(2..).unwrap_or(&[])
    }

    fn rebuild(&mut self, address: u8, data: &[u8], brightness: f64) {
        self.bytes.clear();
        self.bytes.reserve(data.len() + 2);
        self.bytes.push(LED_REPORT_ID);
        self.bytes.push(address);
        self.bytes
            .extend(data.iter().map(|&value| scale_intensity(value, brightness)));
    }
}

/// Builds the LED command for each slot, animating each panel's brightness.
pub struct LedScheduler {
    sources: LedSources,
    panels: [PanelBrightness; PANEL_COUNT],
    command: LedCommand,
}

impl LedScheduler {
    pub fn new(sources: LedSources) -> Self {
        Self {
            sources,
            panels: Default::default(),
            command: LedCommand::default(),
        }
    }

    pub fn set_sources(&mut self, sources: LedSources) {
        self.sources = sources;
    }

    #[allow(dead_code)]
    pub fn brightness(&self, panel: Panel) -> f64 {
        self.panels[panel.index()].brightness()
    }

    /// Step the slot's panel animation and build the command for the slot.
    ///
    /// `just_pressed` is the panel's press edge; the caller must have consumed
    /// it so it is applied exactly once.
    pub fn render_slot(&mut self, slot: LedSlot, just_pressed: bool) -> &LedCommand {
        let address = slot.address();
        let data = self
            .sources
            .get(slot.panel)
            .segment_data(usize::from(slot.segment));
        let brightness = self.panels[slot.panel.index()].step(just_pressed);
        self.command.rebuild(address, data, brightness);
        &self.command
    }
}
