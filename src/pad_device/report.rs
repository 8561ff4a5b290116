use crate::error::Error;
use crate::panel::PANEL_COUNT;

/// Size of one input report from the pad.
pub const REPORT_SIZE: usize = 64;
/// Number of 12-bit sensor channels carried by a report.
pub const SENSOR_COUNT: usize = REPORT_SIZE / 2;
/// Sensors summed into each panel total.
pub const SENSORS_PER_PANEL: usize = 4;

const SENSOR_MASK: u16 = 0x0FFF;

/// Per-panel sensor totals, ordered left, down, up, right.
pub type PanelSums = [u32; PANEL_COUNT];

/// Decoded sensor readings from one input report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelData {
    values: [u16; SENSOR_COUNT],
}

impl Default for PanelData {
    fn default() -> Self {
        Self {
            values: [0; SENSOR_COUNT],
        }
    }
}

impl PanelData {
    /// Parse sensor readings from a raw input report.
    ///
    /// Each channel is a little-endian byte pair; only the low nibble of the
    /// high byte is used, giving a 12-bit ADC value.
    pub fn from_report(report: &[u8]) -> Result<Self, Error> {
        if report.len() != REPORT_SIZE {
            return Err(Error::MalformedReport {
                len: report.len(),
                expected: REPORT_SIZE,
            });
        }

        let mut values = [0u16; SENSOR_COUNT];
        for (value, pair) in values.iter_mut().zip(report.chunks_exact(2)) {
            *value = u16::from(pair[0]) | ((u16::from(pair[1]) << 8) & SENSOR_MASK);
        }

        Ok(Self { values })
    }

    pub fn values(&self) -> &[u16; SENSOR_COUNT] {
        &self.values
    }

    /// Sum the sensors of each panel.
    ///
    /// Only the first `PANEL_COUNT * SENSORS_PER_PANEL` channels belong to
    /// panels; the upper bank is decoded but not aggregated.
    pub fn panel_sums(&self) -> PanelSums {
        let mut sums = [0u32; PANEL_COUNT];
        for (sum, sensors) in sums.iter_mut().zip(self.values.chunks_exact(SENSORS_PER_PANEL)) {
            *sum = sensors.iter().map(|&v| u32::from(v)).sum();
        }
        sums
    }
}
