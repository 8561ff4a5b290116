use crate::pad_device::PanelSums;
use crate::panel::{Panel, PANEL_COUNT};

/// Turns panel sums into press state.
pub trait InputClassifier {
    /// Update press state from a fresh set of panel sums.
    fn poll(&mut self, sums: &PanelSums);

    fn is_pressed(&self, panel: Panel) -> bool;

    /// Consume the press edge of `panel`. Returns `true` at most once per press.
    fn take_just_pressed(&mut self, panel: Panel) -> bool;
}

/// Per-panel press threshold above the resting sensor level.
pub type Sensitivities = [u32; PANEL_COUNT];

/// Classifies a panel as pressed once its sum rises more than its sensitivity
/// above the resting level captured at startup. A pressed panel is released
/// when it falls back below half that margin, and always once it is back at
/// the resting level.
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    baseline: PanelSums,
    sensitivities: Sensitivities,
    is_pressed: [bool; PANEL_COUNT],
    just_pressed: [bool; PANEL_COUNT],
}

impl ThresholdClassifier {
    pub fn new(baseline: &PanelSums, sensitivities: Sensitivities) -> Self {
        Self {
            baseline: *baseline,
            sensitivities,
            is_pressed: [false; PANEL_COUNT],
            just_pressed: [false; PANEL_COUNT],
        }
    }
}

impl InputClassifier for ThresholdClassifier {
    fn poll(&mut self, sums: &PanelSums) {
        for panel in Panel::ALL {
            let i = panel.index();
            let load = sums[i].saturating_sub(self.baseline[i]);
            let pressed = if self.is_pressed[i] {
                load >= (self.sensitivities[i] / 2).max(1)
            } else {
                load > self.sensitivities[i]
            };

            if pressed != self.is_pressed[i] {
                tracing::debug!(%panel, pressed, load, "panel state changed");
                if pressed {
                    self.just_pressed[i] = true;
                }
                self.is_pressed[i] = pressed;
            }
        }
    }

    fn is_pressed(&self, panel: Panel) -> bool {
        self.is_pressed[panel.index()]
    }

    fn take_just_pressed(&mut self, panel: Panel) -> bool {
        std::mem::take(&mut self.just_pressed[panel.index()])
    }
}
