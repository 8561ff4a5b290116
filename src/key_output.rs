use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use serde::Deserialize;

use crate::error::Error;
use crate::input_classifier::InputClassifier;
use crate::pad_device::PanelSums;
use crate::panel::{Panel, PANEL_COUNT};

const KEYBOARD_NAME: &str = "RE:Flex Dance Pad keys";

/// Keys a panel can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadKey {
    Left,
    Down,
    Up,
    Right,
    W,
    A,
    S,
    D,
    Space,
    Enter,
}

impl PadKey {
    fn code(self) -> Key {
        match self {
            PadKey::Left => Key::KEY_LEFT,
            PadKey::Down => Key::KEY_DOWN,
            PadKey::Up => Key::KEY_UP,
            PadKey::Right => Key::KEY_RIGHT,
            PadKey::W => Key::KEY_W,
            PadKey::A => Key::KEY_A,
            PadKey::S => Key::KEY_S,
            PadKey::D => Key::KEY_D,
            PadKey::Space => Key::KEY_SPACE,
            PadKey::Enter => Key::KEY_ENTER,
        }
    }
}

/// Key bound to each panel, ordered left, down, up, right.
pub type PanelKeys = [PadKey; PANEL_COUNT];

/// Receives key transitions.
pub trait KeySink {
    fn send(&mut self, key: PadKey, pressed: bool) -> Result<(), Error>;
}

/// uinput keyboard that types the panels' keys.
pub struct VirtualKeyboard {
    device: VirtualDevice,
}

impl VirtualKeyboard {
    pub fn create(keys: &PanelKeys) -> Result<Self, Error> {
        let mut supported = AttributeSet::<Key>::new();
        for key in keys {
            supported.insert(key.code());
        }

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(KEYBOARD_NAME).with_keys(&supported))
            .and_then(|builder| builder.build())
            .map_err(Error::Keyboard)?;
        tracing::info!(name = KEYBOARD_NAME, ?keys, "created virtual keyboard");
        Ok(Self { device })
    }
}

impl KeySink for VirtualKeyboard {
    fn send(&mut self, key: PadKey, pressed: bool) -> Result<(), Error> {
        let event = InputEvent::new(EventType::KEY, key.code().code(), i32::from(pressed));
        self.device.emit(&[event]).map_err(Error::Keyboard)
    }
}

/// Wraps a classifier and turns its press and release transitions into key
/// events.
pub struct KeyboardInput<C, S> {
    inner: C,
    sink: S,
    keys: PanelKeys,
}

impl<C: InputClassifier, S: KeySink> KeyboardInput<C, S> {
    pub fn new(inner: C, sink: S, keys: PanelKeys) -> Self {
        Self { inner, sink, keys }
    }
}

impl<C: InputClassifier, S: KeySink> InputClassifier for KeyboardInput<C, S> {
    fn poll(&mut self, sums: &PanelSums) {
        let before = Panel::ALL.map(|panel| self.inner.is_pressed(panel));
        self.inner.poll(sums);

        for panel in Panel::ALL {
            let pressed = self.inner.is_pressed(panel);
            if pressed == before[panel.index()] {
                continue;
            }
            let key = self.keys[panel.index()];
            if let Err(err) = self.sink.send(key, pressed) {
                tracing::warn!(%panel, ?key, "could not send key event: {err}");
            }
        }
    }

    fn is_pressed(&self, panel: Panel) -> bool {
        self.inner.is_pressed(panel)
    }

    fn take_just_pressed(&mut self, panel: Panel) -> bool {
        self.inner.take_just_pressed(panel)
    }
}
