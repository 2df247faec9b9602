// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keyboard and mouse state tracking.
//!
//! [`InputState`] keeps the current and previous frame's device state. The
//! platform layer reports raw transitions through the `process_*` methods, which
//! update the state and fire the matching [`SystemEventCode`] on the bus. Only
//! actual changes are reported: pressing an already-held key fires nothing.

use crate::event::{EventBus, EventContext, SystemEventCode};

/// The number of tracked key codes.
pub const MAX_KEYS: usize = 256;

/// The number of tracked mouse buttons.
pub const MAX_BUTTONS: usize = 3;

/// A keyboard key, identified by its virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u16);

impl Key {
    /// Backspace.
    pub const BACKSPACE: Key = Key(0x08);
    /// Tab.
    pub const TAB: Key = Key(0x09);
    /// Enter / return.
    pub const ENTER: Key = Key(0x0D);
    /// Shift.
    pub const SHIFT: Key = Key(0x10);
    /// Control.
    pub const CONTROL: Key = Key(0x11);
    /// Escape.
    pub const ESCAPE: Key = Key(0x1B);
    /// Space bar.
    pub const SPACE: Key = Key(0x20);
    /// Left arrow.
    pub const LEFT: Key = Key(0x25);
    /// Up arrow.
    pub const UP: Key = Key(0x26);
    /// Right arrow.
    pub const RIGHT: Key = Key(0x27);
    /// Down arrow.
    pub const DOWN: Key = Key(0x28);
    /// The `A` key.
    pub const A: Key = Key(0x41);
    /// The `B` key.
    pub const B: Key = Key(0x42);
    /// The `D` key.
    pub const D: Key = Key(0x44);
    /// The `S` key.
    pub const S: Key = Key(0x53);
    /// The `W` key.
    pub const W: Key = Key(0x57);

    /// Maps an ASCII letter or digit to its key. Letters are case-insensitive.
    pub const fn from_ascii(c: u8) -> Option<Key> {
        match c {
            b'0'..=b'9' | b'A'..=b'Z' => Some(Key(c as u16)),
            b'a'..=b'z' => Some(Key(c.to_ascii_uppercase() as u16)),
            _ => None,
        }
    }

    fn slot(self) -> Option<usize> {
        let index = usize::from(self.0);
        if index < MAX_KEYS {
            Some(index)
        } else {
            log::warn!("Key code {:#x} is outside the tracked range.", self.0);
            None
        }
    }
}

/// A mouse button.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left = 0,
    /// The right mouse button.
    Right = 1,
    /// The middle mouse button.
    Middle = 2,
}

impl MouseButton {
    /// Returns the code carried in button event payloads.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Maps a payload code back to a button.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Middle),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyboardState {
    keys: [bool; MAX_KEYS],
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            keys: [false; MAX_KEYS],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MouseState {
    buttons: [bool; MAX_BUTTONS],
    x: i32,
    y: i32,
}

/// The current and previous frame's keyboard and mouse state.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keyboard_current: KeyboardState,
    keyboard_previous: KeyboardState,
    mouse_current: MouseState,
    mouse_previous: MouseState,
}

impl InputState {
    /// Creates a state with every key and button up and the cursor at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the current state as the previous one. Call once at the end of a frame.
    pub fn update(&mut self) {
        self.keyboard_previous = self.keyboard_current;
        self.mouse_previous = self.mouse_current;
    }

    /// Records a key transition and fires `KeyPressed`/`KeyReleased` if it changed.
    ///
    /// The payload carries the key code in `u16[0]`.
    pub fn process_key(&mut self, events: &EventBus, key: Key, pressed: bool) {
        let Some(slot) = key.slot() else {
            return;
        };
        if self.keyboard_current.keys[slot] == pressed {
            return;
        }
        self.keyboard_current.keys[slot] = pressed;

        let mut context = EventContext::new();
        context.set_u16(0, key.0);
        let code = if pressed {
            SystemEventCode::KeyPressed
        } else {
            SystemEventCode::KeyReleased
        };
        events.fire(code, None, context);
    }

    /// Records a button transition and fires `ButtonPressed`/`ButtonReleased` if it changed.
    ///
    /// The payload carries the button code in `u16[0]`.
    pub fn process_button(&mut self, events: &EventBus, button: MouseButton, pressed: bool) {
        let slot = button.slot();
        if self.mouse_current.buttons[slot] == pressed {
            return;
        }
        self.mouse_current.buttons[slot] = pressed;

        let mut context = EventContext::new();
        context.set_u16(0, button.code());
        let code = if pressed {
            SystemEventCode::ButtonPressed
        } else {
            SystemEventCode::ButtonReleased
        };
        events.fire(code, None, context);
    }

    /// Records a cursor move and fires `MouseMoved` if the position changed.
    ///
    /// The payload carries `x` in `u16[0]` and `y` in `u16[1]`, clamped to the
    /// `u16` range.
    pub fn process_mouse_move(&mut self, events: &EventBus, x: i32, y: i32) {
        if self.mouse_current.x == x && self.mouse_current.y == y {
            return;
        }
        log::trace!("Mouse pos: {x}, {y}");
        self.mouse_current.x = x;
        self.mouse_current.y = y;

        let mut context = EventContext::new();
        context.set_u16(0, clamp_to_u16(x));
        context.set_u16(1, clamp_to_u16(y));
        events.fire(SystemEventCode::MouseMoved, None, context);
    }

    /// Fires `MouseWheel` with the delta in `i8[0]`. No state is kept for the wheel.
    pub fn process_mouse_wheel(&mut self, events: &EventBus, delta: i8) {
        let mut context = EventContext::new();
        context.set_i8(0, delta);
        events.fire(SystemEventCode::MouseWheel, None, context);
    }

    /// Returns `true` if `key` is currently held.
    pub fn is_key_down(&self, key: Key) -> bool {
        key.slot()
            .is_some_and(|slot| self.keyboard_current.keys[slot])
    }

    /// Returns `true` if `key` is currently up.
    pub fn is_key_up(&self, key: Key) -> bool {
        !self.is_key_down(key)
    }

    /// Returns `true` if `key` was held at the end of the previous frame.
    pub fn was_key_down(&self, key: Key) -> bool {
        key.slot()
            .is_some_and(|slot| self.keyboard_previous.keys[slot])
    }

    /// Returns `true` if `key` was up at the end of the previous frame.
    pub fn was_key_up(&self, key: Key) -> bool {
        !self.was_key_down(key)
    }

    /// Returns `true` if `button` is currently held.
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_current.buttons[button.slot()]
    }

    /// Returns `true` if `button` is currently up.
    pub fn is_button_up(&self, button: MouseButton) -> bool {
        !self.is_button_down(button)
    }

    /// Returns `true` if `button` was held at the end of the previous frame.
    pub fn was_button_down(&self, button: MouseButton) -> bool {
        self.mouse_previous.buttons[button.slot()]
    }

    /// Returns `true` if `button` was up at the end of the previous frame.
    pub fn was_button_up(&self, button: MouseButton) -> bool {
        !self.was_button_down(button)
    }

    /// Returns the current cursor position.
    pub fn mouse_position(&self) -> (i32, i32) {
        (self.mouse_current.x, self.mouse_current.y)
    }

    /// Returns the cursor position at the end of the previous frame.
    pub fn previous_mouse_position(&self) -> (i32, i32) {
        (self.mouse_previous.x, self.mouse_previous.y)
    }
}

fn clamp_to_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCode, EventHandler};
    use crate::memory::TaggedAllocator;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    /// Records every `(code, payload)` pair fired for the given codes.
    fn recording_bus(codes: &[SystemEventCode]) -> (EventBus, Rc<RefCell<Vec<(EventCode, EventContext)>>>) {
        let bus = EventBus::new(Arc::new(TaggedAllocator::new()));
        bus.init();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let handler = EventHandler::new(move |_, event| {
            sink.borrow_mut().push((event.code, event.context));
            false
        });
        for code in codes {
            bus.register(*code, None, &handler);
        }
        (bus, log)
    }

    #[test]
    fn test_key_transitions_fire_once() {
        let (bus, log) = recording_bus(&[SystemEventCode::KeyPressed, SystemEventCode::KeyReleased]);
        let mut input = InputState::new();

        input.process_key(&bus, Key::A, true);
        input.process_key(&bus, Key::A, true);
        input.process_key(&bus, Key::A, false);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, SystemEventCode::KeyPressed.code());
        assert_eq!(log[0].1.u16(0), Key::A.0);
        assert_eq!(log[1].0, SystemEventCode::KeyReleased.code());
    }

    #[test]
    fn test_previous_state_follows_update() {
        let (bus, _log) = recording_bus(&[]);
        let mut input = InputState::new();

        input.process_key(&bus, Key::SPACE, true);
        assert!(input.is_key_down(Key::SPACE));
        assert!(input.was_key_up(Key::SPACE));

        input.update();
        assert!(input.was_key_down(Key::SPACE));

        input.process_button(&bus, MouseButton::Right, true);
        assert!(input.is_button_down(MouseButton::Right));
        assert!(input.was_button_up(MouseButton::Right));
        input.update();
        assert!(input.was_button_down(MouseButton::Right));
    }

    #[test]
    fn test_mouse_move_payload_and_dedup() {
        let (bus, log) = recording_bus(&[SystemEventCode::MouseMoved]);
        let mut input = InputState::new();

        input.process_mouse_move(&bus, 320, 200);
        input.process_mouse_move(&bus, 320, 200);
        input.process_mouse_move(&bus, -5, 70_000);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].1.u16s()[..2], [320, 200]);
        assert_eq!(log[1].1.u16s()[..2], [0, u16::MAX]);
        assert_eq!(input.mouse_position(), (-5, 70_000));
        assert_eq!(input.previous_mouse_position(), (0, 0));
    }

    #[test]
    fn test_wheel_always_fires() {
        let (bus, log) = recording_bus(&[SystemEventCode::MouseWheel]);
        let mut input = InputState::new();
        input.process_mouse_wheel(&bus, -1);
        input.process_mouse_wheel(&bus, -1);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].1.i8(0), -1);
    }

    #[test]
    fn test_out_of_range_key_is_ignored() {
        let (bus, log) = recording_bus(&[SystemEventCode::KeyPressed]);
        let mut input = InputState::new();
        input.process_key(&bus, Key(0x1FF), true);
        assert!(log.borrow().is_empty());
        assert!(!input.is_key_down(Key(0x1FF)));
    }

    #[test]
    fn test_key_from_ascii() {
        assert_eq!(Key::from_ascii(b'a'), Some(Key::A));
        assert_eq!(Key::from_ascii(b'W'), Some(Key::W));
        assert_eq!(Key::from_ascii(b'7'), Some(Key(0x37)));
        assert_eq!(Key::from_ascii(b'#'), None);
    }
}
