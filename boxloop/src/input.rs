use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// The directional keys the loop reads every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::Up, Key::Down, Key::Left, Key::Right];

    /// Physical key code on a standard keyboard.
    pub fn code(self) -> KeyCode {
        match self {
            Key::Up => KeyCode::ArrowUp,
            Key::Down => KeyCode::ArrowDown,
            Key::Left => KeyCode::ArrowLeft,
            Key::Right => KeyCode::ArrowRight,
        }
    }
}

/// Tracks which keys are currently held.
///
/// A key is down from its press event until its release event.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.set_key(code, event.state);
        }
    }

    /// Record a press or release of `code`.
    pub fn set_key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys_down.insert(code);
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
            }
        }
    }

    /// Forget every held key. Release events are not delivered to an
    /// unfocused window, so this runs on focus loss.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key.code())
    }
}

/// A one-dimensional axis made of two opposing keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisBinding {
    pub negative: Key,
    pub positive: Key,
}

impl AxisBinding {
    pub const HORIZONTAL: Self = Self::new(Key::Left, Key::Right);
    pub const VERTICAL: Self = Self::new(Key::Up, Key::Down);

    pub const fn new(negative: Key, positive: Key) -> Self {
        Self { negative, positive }
    }

    /// Axis value in `-1..=1`. Holding both keys cancels out.
    pub fn value(&self, key_down: impl Fn(Key) -> bool) -> i32 {
        i32::from(key_down(self.positive)) - i32::from(key_down(self.negative))
    }
}
