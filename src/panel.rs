use std::fmt;

pub const PANEL_COUNT: usize = 4;

/// One of the four directional zones of the pad.
///
/// The discriminant is the LED addressing index; the order also defines the
/// layout of `PanelSums`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Left = 0,
    Down = 1,
    Up = 2,
    Right = 3,
}

impl Panel {
    pub const ALL: [Panel; PANEL_COUNT] = [Panel::Left, Panel::Down, Panel::Up, Panel::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Orientation of the panel's LED ring, handed to its color source.
    /// Must match the physical mounting of each ring.
    pub fn rotation_degrees(self) -> u16 {
        match self {
            Panel::Left => 90,
            Panel::Down => 180,
            Panel::Up => 0,
            Panel::Right => 270,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Panel::Left => "left",
            Panel::Down => "down",
            Panel::Up => "up",
            Panel::Right => "right",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Panel;

    #[test]
    fn identity_mapping_is_fixed() {
        let expected = [(0, 90), (1, 180), (2, 0), (3, 270)];
        for (panel, (index, rotation)) in Panel::ALL.iter().zip(expected) {
            assert_eq!(panel.index(), index);
            assert_eq!(panel.rotation_degrees(), rotation);
            assert_eq!(Panel::from_index(index), Some(*panel));
        }
        assert_eq!(Panel::from_index(4), None);
    }
}
