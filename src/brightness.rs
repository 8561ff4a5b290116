pub const BRIGHTNESS_MIN: f64 = 0.1;
pub const BRIGHTNESS_MAX: f64 = 1.2;

/// Steps spent rising from minimum to maximum after a press edge.
pub const ATTACK_STEPS: u32 = 6;
/// Steps spent falling from maximum back to minimum.
pub const DECAY_STEPS: u32 = 60;

/// Animator steps per LED frame: the animator runs once per segment write,
/// and every panel has four segments.
#[allow(dead_code)]
pub const ANIMATOR_STEPS_PER_FRAME: u32 = 4;

const ATTACK_DELTA: f64 = (BRIGHTNESS_MAX - BRIGHTNESS_MIN) / ATTACK_STEPS as f64;
const DECAY_DELTA: f64 = -(BRIGHTNESS_MAX - BRIGHTNESS_MIN) / DECAY_STEPS as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Attack,
    Decay,
}

/// Attack/decay brightness envelope of one panel.
///
/// A press edge restarts the attack from whatever brightness the panel is at;
/// once the attack steps run out the panel decays linearly to the minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelBrightness {
    brightness: f64,
    phase: Phase,
    attack_steps_left: u32,
}

impl Default for PanelBrightness {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelBrightness {
    pub fn new() -> Self {
        Self {
            brightness: BRIGHTNESS_MIN,
            phase: Phase::Decay,
            attack_steps_left: 0,
        }
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance the envelope by one step and return the new brightness.
    pub fn step(&mut self, just_pressed: bool) -> f64 {
        if just_pressed {
            self.phase = Phase::Attack;
            self.attack_steps_left = ATTACK_STEPS;
        }

        let delta = if self.attack_steps_left > 0 {
            self.attack_steps_left -= 1;
            ATTACK_DELTA
        } else {
            self.phase = Phase::Decay;
            DECAY_DELTA
        };

        self.brightness = (self.brightness + delta).clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX);
        self.brightness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn first_attack_step_from_minimum() {
        let mut panel = PanelBrightness::new();
        let brightness = panel.step(true);
        assert!((brightness - (0.1 + 1.1 / 6.0)).abs() < EPSILON);
        assert!((brightness - 0.2833).abs() < 1e-3);
        assert_eq!(panel.phase(), Phase::Attack);
    }

    #[test]
    fn edge_gives_six_equal_rising_steps_then_decay() {
        let mut panel = PanelBrightness::new();
        let mut previous = panel.brightness();
        for step in 0..ATTACK_STEPS {
            let brightness = panel.step(step == 0);
            let rise = brightness - previous;
            assert!(rise > 0.0, "step {step} did not rise");
            if brightness < BRIGHTNESS_MAX {
                assert!((rise - ATTACK_DELTA).abs() < EPSILON);
            }
            previous = brightness;
        }
        assert!((panel.brightness() - BRIGHTNESS_MAX).abs() < EPSILON);

        let brightness = panel.step(false);
        assert_eq!(panel.phase(), Phase::Decay);
        assert!((previous - brightness - (1.1 / 60.0)).abs() < EPSILON);
    }

    #[test]
    fn decay_returns_to_minimum_and_stays() {
        let mut panel = PanelBrightness::new();
        panel.step(true);
        for _ in 1..ATTACK_STEPS {
            panel.step(false);
        }
        for _ in 0..DECAY_STEPS + 10 {
            panel.step(false);
        }
        assert_eq!(panel.brightness(), BRIGHTNESS_MIN);
    }

    #[test]
    fn full_decay_spans_fifteen_frames() {
        let mut panel = PanelBrightness::new();
        panel.step(true);
        for _ in 1..ATTACK_STEPS {
            panel.step(false);
        }
        let frames = DECAY_STEPS / ANIMATOR_STEPS_PER_FRAME;
        assert_eq!(frames, 15);
        for _ in 0..(frames - 1) * ANIMATOR_STEPS_PER_FRAME {
            panel.step(false);
        }
        assert!(panel.brightness() > BRIGHTNESS_MIN);
        for _ in 0..ANIMATOR_STEPS_PER_FRAME {
            panel.step(false);
        }
        assert!((panel.brightness() - BRIGHTNESS_MIN).abs() < EPSILON);
    }

    #[test]
    fn edge_mid_decay_restarts_attack() {
        let mut panel = PanelBrightness::new();
        panel.step(true);
        for _ in 0..20 {
            panel.step(false);
        }
        let before = panel.brightness();
        assert_eq!(panel.phase(), Phase::Decay);

        let after = panel.step(true);
        assert_eq!(panel.phase(), Phase::Attack);
        assert!((after - (before + ATTACK_DELTA)).abs() < EPSILON);
    }

    #[test]
    fn brightness_never_leaves_bounds() {
        let mut panel = PanelBrightness::new();
        // Pseudo-random edge pattern.
        let mut seed: u32 = 0x2545_F491;
        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let brightness = panel.step(seed % 7 == 0);
            assert!((BRIGHTNESS_MIN..=BRIGHTNESS_MAX).contains(&brightness));
        }
    }
}
