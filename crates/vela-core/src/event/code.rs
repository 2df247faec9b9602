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

//! Event codes and the reserved system code range.

/// Identifies an event. Valid codes are `0..MAX_EVENT_CODES`.
pub type EventCode = u16;

/// The number of addressable event codes.
pub const MAX_EVENT_CODES: usize = 16384;

/// The highest code reserved for system events.
///
/// Application code should use codes above this value. The bus does not enforce it.
pub const MAX_SYSTEM_EVENT_CODE: EventCode = 0xFF;

/// Event codes emitted by the engine itself.
///
/// The comment on each variant describes how the [`EventContext`](super::EventContext)
/// payload is laid out for that code.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemEventCode {
    /// Shuts the application down on the next frame. No payload.
    Quit = 0x01,
    /// A keyboard key was pressed. `u16[0]` = key code.
    KeyPressed = 0x02,
    /// A keyboard key was released. `u16[0]` = key code.
    KeyReleased = 0x03,
    /// A mouse button was pressed. `u16[0]` = button.
    ButtonPressed = 0x04,
    /// A mouse button was released. `u16[0]` = button.
    ButtonReleased = 0x05,
    /// The mouse moved. `u16[0]` = x, `u16[1]` = y.
    MouseMoved = 0x06,
    /// The mouse wheel moved. `i8[0]` = delta.
    MouseWheel = 0x07,
    /// The window was resized. `u16[0]` = width, `u16[1]` = height.
    WindowResized = 0x08,
}

impl SystemEventCode {
    /// Returns the raw code.
    pub const fn code(self) -> EventCode {
        self as EventCode
    }

    /// Maps a raw code back to a system event, if it is one.
    pub fn from_code(code: EventCode) -> Option<Self> {
        match code {
            0x01 => Some(Self::Quit),
            0x02 => Some(Self::KeyPressed),
            0x03 => Some(Self::KeyReleased),
            0x04 => Some(Self::ButtonPressed),
            0x05 => Some(Self::ButtonReleased),
            0x06 => Some(Self::MouseMoved),
            0x07 => Some(Self::MouseWheel),
            0x08 => Some(Self::WindowResized),
            _ => None,
        }
    }
}

impl From<SystemEventCode> for EventCode {
    fn from(code: SystemEventCode) -> Self {
        code.code()
    }
}

/// Returns `true` if `code` lies in the range reserved for the engine.
pub fn is_system_code(code: EventCode) -> bool {
    code <= MAX_SYSTEM_EVENT_CODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_codes_round_trip() {
        for raw in 0x01..=0x08 {
            let code = SystemEventCode::from_code(raw).unwrap();
            assert_eq!(code.code(), raw);
        }
        assert_eq!(SystemEventCode::from_code(0x09), None);
        assert_eq!(SystemEventCode::from_code(0), None);
    }

    #[test]
    fn test_system_range() {
        assert!(is_system_code(SystemEventCode::WindowResized.code()));
        assert!(is_system_code(0xFF));
        assert!(!is_system_code(0x100));
    }
}
