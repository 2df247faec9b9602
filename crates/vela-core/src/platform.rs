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

//! The platform layer: where raw device input enters the engine.

use crate::config::ApplicationConfig;
use crate::event::{EventBus, EventContext, SystemEventCode};
use crate::input::{InputState, Key, MouseButton};

/// A source of platform messages.
///
/// Any windowing backend can implement this trait to drive an
/// [`Application`](crate::Application).
pub trait Platform {
    /// Called once before the first pump with the application's configuration.
    ///
    /// Windowed backends create and place their window here.
    fn startup(&mut self, _config: &ApplicationConfig) {}

    /// Processes every pending platform message.
    ///
    /// Input transitions are forwarded to `input`, which fires the matching
    /// events on `events`. Window events are fired on `events` directly.
    ///
    /// ## Returns
    /// `false` if the platform asked the application to close.
    fn pump_messages(&mut self, input: &mut InputState, events: &EventBus) -> bool;
}

/// A raw message produced by a platform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// A key changed state.
    Key {
        /// The key.
        key: Key,
        /// `true` for a press, `false` for a release.
        pressed: bool,
    },
    /// A mouse button changed state.
    Button {
        /// The button.
        button: MouseButton,
        /// `true` for a press, `false` for a release.
        pressed: bool,
    },
    /// The cursor moved.
    MouseMoved {
        /// Horizontal position in window coordinates.
        x: i32,
        /// Vertical position in window coordinates.
        y: i32,
    },
    /// The wheel turned.
    MouseWheel {
        /// Wheel direction, negative towards the user.
        delta: i8,
    },
    /// The window was resized.
    Resized {
        /// New width in pixels.
        width: u16,
        /// New height in pixels.
        height: u16,
    },
    /// The window was asked to close.
    CloseRequested,
}

/// Where the application asked its window to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlacement {
    /// Horizontal position of the window.
    pub x: i32,
    /// Vertical position of the window.
    pub y: i32,
    /// Client width in pixels.
    pub width: u32,
    /// Client height in pixels.
    pub height: u32,
}

/// A headless platform fed through a channel.
///
/// Any thread may hold a [`sender`](Self::sender) and push [`PlatformEvent`]s;
/// the owning thread drains them in [`pump_messages`](Platform::pump_messages).
#[derive(Debug)]
pub struct ChannelPlatform {
    sender: flume::Sender<PlatformEvent>,
    receiver: flume::Receiver<PlatformEvent>,
    placement: Option<WindowPlacement>,
}

impl ChannelPlatform {
    /// Creates a platform with an unbounded message channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::info!("Headless platform initialized.");
        Self {
            sender,
            receiver,
            placement: None,
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<PlatformEvent> {
        self.sender.clone()
    }

    /// Queues `event` for the next pump, logging an error if the channel is closed.
    pub fn publish(&self, event: PlatformEvent) {
        log::trace!("Publishing platform event {event:?}.");
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to send platform event: {e}.");
        }
    }

    /// Returns the placement recorded at startup, if startup ran.
    pub fn placement(&self) -> Option<WindowPlacement> {
        self.placement
    }

    /// Returns how many messages are waiting to be pumped.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for ChannelPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for ChannelPlatform {
    fn startup(&mut self, config: &ApplicationConfig) {
        let placement = WindowPlacement {
            x: config.start_pos_x,
            y: config.start_pos_y,
            width: config.width,
            height: config.height,
        };
        log::info!(
            "Headless window '{}' placed at {}, {} ({}x{}).",
            config.name,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
        self.placement = Some(placement);
    }

    fn pump_messages(&mut self, input: &mut InputState, events: &EventBus) -> bool {
        for message in self.receiver.try_iter() {
            match message {
                PlatformEvent::Key { key, pressed } => input.process_key(events, key, pressed),
                PlatformEvent::Button { button, pressed } => {
                    input.process_button(events, button, pressed)
                }
                PlatformEvent::MouseMoved { x, y } => input.process_mouse_move(events, x, y),
                PlatformEvent::MouseWheel { delta } => input.process_mouse_wheel(events, delta),
                PlatformEvent::Resized { width, height } => {
                    let mut context = EventContext::new();
                    context.set_u16(0, width);
                    context.set_u16(1, height);
                    events.fire(SystemEventCode::WindowResized, None, context);
                }
                PlatformEvent::CloseRequested => {
                    log::info!("Close requested by the platform.");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventHandler;
    use crate::memory::TaggedAllocator;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::thread;

    fn initialized_bus() -> EventBus {
        let bus = EventBus::new(Arc::new(TaggedAllocator::new()));
        bus.init();
        bus
    }

    #[test]
    fn test_pump_forwards_input() {
        let bus = initialized_bus();
        let mut platform = ChannelPlatform::new();
        let mut input = InputState::new();

        platform.publish(PlatformEvent::Key {
            key: Key::W,
            pressed: true,
        });
        platform.publish(PlatformEvent::Button {
            button: MouseButton::Left,
            pressed: true,
        });
        platform.publish(PlatformEvent::MouseMoved { x: 10, y: 20 });
        assert_eq!(platform.pending(), 3);

        assert!(platform.pump_messages(&mut input, &bus));
        assert_eq!(platform.pending(), 0);
        assert!(input.is_key_down(Key::W));
        assert!(input.is_button_down(MouseButton::Left));
        assert_eq!(input.mouse_position(), (10, 20));
    }

    #[test]
    fn test_resize_fires_window_resized() {
        let bus = initialized_bus();
        let size = Rc::new(Cell::new((0u16, 0u16)));
        let seen = Rc::clone(&size);
        let handler = EventHandler::new(move |_, event| {
            seen.set((event.context.u16(0), event.context.u16(1)));
            true
        });
        bus.register(SystemEventCode::WindowResized, None, &handler);

        let mut platform = ChannelPlatform::new();
        platform.publish(PlatformEvent::Resized {
            width: 800,
            height: 600,
        });
        assert!(platform.pump_messages(&mut InputState::new(), &bus));
        assert_eq!(size.get(), (800, 600));
    }

    #[test]
    fn test_close_stops_pumping() {
        let bus = initialized_bus();
        let mut platform = ChannelPlatform::new();
        let mut input = InputState::new();

        platform.publish(PlatformEvent::CloseRequested);
        platform.publish(PlatformEvent::Key {
            key: Key::A,
            pressed: true,
        });

        assert!(!platform.pump_messages(&mut input, &bus));
        assert_eq!(platform.pending(), 1);
        assert!(input.is_key_up(Key::A));
    }

    #[test]
    fn test_startup_records_configured_placement() {
        let mut platform = ChannelPlatform::new();
        assert_eq!(platform.placement(), None);

        let config = ApplicationConfig {
            start_pos_x: -40,
            start_pos_y: 25,
            width: 800,
            height: 600,
            ..Default::default()
        };
        platform.startup(&config);

        assert_eq!(
            platform.placement(),
            Some(WindowPlacement {
                x: -40,
                y: 25,
                width: 800,
                height: 600,
            })
        );
    }

    #[test]
    fn test_events_from_another_thread() {
        let bus = initialized_bus();
        let mut platform = ChannelPlatform::default();
        let sender = platform.sender();

        thread::spawn(move || {
            sender
                .send(PlatformEvent::MouseWheel { delta: 1 })
                .expect("Send should succeed");
        })
        .join()
        .expect("Sender thread panicked");

        assert_eq!(platform.pending(), 1);
        assert!(platform.pump_messages(&mut InputState::new(), &bus));
    }
}
