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

//! A headless sandbox: a scripted input feed drives a small game through the
//! application loop.
//!
//! Usage: `sandbox [config.json]`

use anyhow::Result;
use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use vela_core::{
    Application, ApplicationConfig, ChannelPlatform, EventBus, EventCode, EventContext,
    EventHandler, Game, InputState, Key, MouseButton, PlatformEvent, SystemEventCode,
};

/// Fired by the game whenever the player scores. Carries the points in `u32[0]`.
const PLAYER_SCORED: EventCode = 0x100;

#[derive(Default)]
struct SandboxGame {
    score: Rc<Cell<u32>>,
    handlers: Vec<(EventCode, EventHandler)>,
    elapsed: f64,
    frames: u64,
}

impl Game for SandboxGame {
    fn initialize(&mut self, events: &EventBus) -> Result<()> {
        // Space scores a point; the key handler re-fires the game's own event.
        let on_space = EventHandler::new(|bus, event| {
            if Key(event.context.u16(0)) != Key::SPACE {
                return false;
            }
            bus.fire(PLAYER_SCORED, None, EventContext::from_u32s([1, 0, 0, 0]));
            true
        });

        let score = Rc::clone(&self.score);
        let on_score = EventHandler::new(move |_, event| {
            score.set(score.get() + event.context.u32(0));
            log::info!("Scored! Total: {}", score.get());
            true
        });

        for (code, handler) in [
            (SystemEventCode::KeyPressed.code(), on_space),
            (PLAYER_SCORED, on_score),
        ] {
            anyhow::ensure!(
                events.register(code, None, &handler),
                "failed to register the sandbox listener for code {code:#x}"
            );
            self.handlers.push((code, handler));
        }
        log::info!("Sandbox game initialized.");
        Ok(())
    }

    fn update(&mut self, input: &InputState, delta: f64) -> Result<()> {
        self.elapsed += delta;
        self.frames += 1;

        if input.is_key_down(Key::W) && input.was_key_up(Key::W) {
            log::info!("Moving forward.");
        }
        if input.is_button_down(MouseButton::Left) && input.was_button_up(MouseButton::Left) {
            let (x, y) = input.mouse_position();
            log::info!("Click at {x}, {y}.");
        }
        Ok(())
    }

    fn render(&mut self, _delta: f64) -> Result<()> {
        // Headless: nothing to draw.
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        log::info!("Viewport is now {width}x{height}.");
    }

    fn shutdown(&mut self, events: &EventBus) {
        for (code, handler) in self.handlers.drain(..) {
            events.unregister(code, None, &handler);
        }
        log::info!(
            "Sandbox ran {} frames in {:.2}s, final score {}.",
            self.frames,
            self.elapsed,
            self.score.get()
        );
    }
}

/// What a user might do in the first second of a session.
fn scripted_session() -> Vec<PlatformEvent> {
    let mut session = vec![
        PlatformEvent::Key {
            key: Key::W,
            pressed: true,
        },
        PlatformEvent::MouseMoved { x: 200, y: 150 },
        PlatformEvent::Button {
            button: MouseButton::Left,
            pressed: true,
        },
        PlatformEvent::Button {
            button: MouseButton::Left,
            pressed: false,
        },
        PlatformEvent::MouseWheel { delta: 1 },
    ];
    for _ in 0..3 {
        session.push(PlatformEvent::Key {
            key: Key::SPACE,
            pressed: true,
        });
        session.push(PlatformEvent::Key {
            key: Key::SPACE,
            pressed: false,
        });
    }
    session.push(PlatformEvent::Resized {
        width: 1600,
        height: 900,
    });
    session.push(PlatformEvent::Key {
        key: Key::ESCAPE,
        pressed: true,
    });
    session
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load(path)?,
        None => ApplicationConfig {
            name: "Vela Sandbox".to_owned(),
            ..Default::default()
        },
    };

    let platform = ChannelPlatform::new();
    let sender = platform.sender();
    let feeder = thread::spawn(move || {
        for event in scripted_session() {
            if sender.send(event).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(16));
        }
    });

    let mut app = Application::new(config, SandboxGame::default(), platform);
    app.run()?;

    if feeder.join().is_err() {
        log::error!("Input feeder thread panicked.");
    }
    log::info!("{}", app.allocator().usage_report());
    Ok(())
}
