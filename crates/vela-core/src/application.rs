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

//! The application layer: owns the core subsystems and drives a [`Game`].

use crate::config::ApplicationConfig;
use crate::error::ApplicationError;
use crate::event::{EventBus, EventContext, EventHandler, SystemEventCode};
use crate::input::{InputState, Key};
use crate::memory::TaggedAllocator;
use crate::platform::Platform;
use anyhow::{Context, Result};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// The user-provided half of an application.
pub trait Game {
    /// Called once before the first frame. Register game listeners here.
    fn initialize(&mut self, events: &EventBus) -> Result<()>;

    /// Called every frame for game logic.
    ///
    /// ## Arguments
    /// * `input` - The device state for this frame.
    /// * `delta` - Seconds elapsed since the previous frame.
    fn update(&mut self, input: &InputState, delta: f64) -> Result<()>;

    /// Called every frame after [`update`](Self::update).
    fn render(&mut self, delta: f64) -> Result<()>;

    /// Called with the initial size and after every non-zero resize.
    fn on_resize(&mut self, width: u32, height: u32);

    /// Called once after the last frame, while the event bus is still running.
    fn shutdown(&mut self, _events: &EventBus) {}
}

/// Lifecycle flags shared between the application and its event handlers.
#[derive(Debug)]
pub struct ApplicationState {
    is_running: Cell<bool>,
    is_suspended: Cell<bool>,
    width: Cell<u32>,
    height: Cell<u32>,
    pending_resize: Cell<Option<(u32, u32)>>,
}

impl ApplicationState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            is_running: Cell::new(false),
            is_suspended: Cell::new(false),
            width: Cell::new(width),
            height: Cell::new(height),
            pending_resize: Cell::new(None),
        }
    }

    /// Returns `true` while the main loop is running.
    pub fn is_running(&self) -> bool {
        self.is_running.get()
    }

    /// Returns `true` while the window is minimized. No frames run while suspended.
    pub fn is_suspended(&self) -> bool {
        self.is_suspended.get()
    }

    /// Returns the last known client size.
    pub fn size(&self) -> (u32, u32) {
        (self.width.get(), self.height.get())
    }

    fn apply_resize(&self, width: u32, height: u32) {
        if (width, height) == self.size() {
            return;
        }
        self.width.set(width);
        self.height.set(height);
        log::debug!("Window resize: {width}, {height}");

        if width == 0 || height == 0 {
            log::info!("Window minimized, suspending application.");
            self.is_suspended.set(true);
            return;
        }
        if self.is_suspended.replace(false) {
            log::info!("Window restored, resuming application.");
        }
        self.pending_resize.set(Some((width, height)));
    }
}

/// Owns the allocator, the event bus and the input state, and runs the main loop.
pub struct Application<G: Game, P: Platform> {
    config: ApplicationConfig,
    game: G,
    platform: P,
    allocator: Arc<TaggedAllocator>,
    events: EventBus,
    input: InputState,
    state: Rc<ApplicationState>,
    handlers: Vec<(SystemEventCode, EventHandler)>,
}

impl<G: Game, P: Platform> Application<G, P> {
    /// Creates an application. Nothing is initialized until [`run`](Self::run).
    pub fn new(config: ApplicationConfig, game: G, platform: P) -> Self {
        let allocator = Arc::new(TaggedAllocator::new());
        let state = Rc::new(ApplicationState::new(config.width, config.height));
        Self {
            events: EventBus::new(Arc::clone(&allocator)),
            config,
            game,
            platform,
            allocator,
            input: InputState::new(),
            state,
            handlers: Vec::new(),
        }
    }

    /// Runs the application until a quit event is handled or the platform closes.
    ///
    /// The event bus is initialized on entry and shut down on exit, whatever the
    /// outcome.
    ///
    /// ## Returns
    /// The first error raised while starting up or by a game callback.
    pub fn run(&mut self) -> Result<()> {
        log::info!("Starting application '{}'.", self.config.name);
        if !self.events.init() {
            return Err(ApplicationError::EventSystemUnavailable.into());
        }

        self.platform.startup(&self.config);
        let result = self.run_game();

        for (code, handler) in self.handlers.drain(..) {
            self.events.unregister(code, None, &handler);
        }
        self.events.shutdown();
        self.state.is_running.set(false);

        log::info!("Application '{}' stopped.", self.config.name);
        result
    }

    /// Returns the application's allocator.
    pub fn allocator(&self) -> &Arc<TaggedAllocator> {
        &self.allocator
    }

    /// Returns the application's event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the current input state.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Returns the lifecycle flags.
    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// Returns the configuration the application was created with.
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Returns the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Returns the platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn run_game(&mut self) -> Result<()> {
        self.register_handlers()?;

        self.game
            .initialize(&self.events)
            .context("Game failed to initialize")?;
        let (width, height) = self.state.size();
        self.game.on_resize(width, height);

        log::info!("{}", self.allocator.usage_report());

        self.state.is_running.set(true);
        let result = self.main_loop();
        self.game.shutdown(&self.events);
        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let mut last_frame = Instant::now();
        while self.state.is_running() {
            if !self.platform.pump_messages(&mut self.input, &self.events) {
                self.state.is_running.set(false);
                break;
            }
            if !self.state.is_running() {
                break;
            }
            if let Some((width, height)) = self.state.pending_resize.take() {
                self.game.on_resize(width, height);
            }
            if self.state.is_suspended() {
                continue;
            }

            let now = Instant::now();
            let delta = now.duration_since(last_frame).as_secs_f64();
            last_frame = now;

            self.game
                .update(&self.input, delta)
                .context("Game update failed, shutting down")?;
            self.game
                .render(delta)
                .context("Game render failed, shutting down")?;

            self.input.update();
        }
        Ok(())
    }

    fn register_handlers(&mut self) -> Result<(), ApplicationError> {
        let state = Rc::clone(&self.state);
        let on_quit = EventHandler::new(move |_, _| {
            log::info!("Quit event received, shutting down.");
            state.is_running.set(false);
            true
        });

        let on_key = EventHandler::new(|bus, event| {
            let key = Key(event.context.u16(0));
            if event.code == SystemEventCode::KeyPressed.code() {
                if key == Key::ESCAPE {
                    bus.fire(SystemEventCode::Quit, None, EventContext::new());
                    return true;
                }
                log::debug!("'{:#04x}' key pressed.", key.0);
            } else {
                log::debug!("'{:#04x}' key released.", key.0);
            }
            false
        });

        let state = Rc::clone(&self.state);
        let on_resize = EventHandler::new(move |_, event| {
            let width = u32::from(event.context.u16(0));
            let height = u32::from(event.context.u16(1));
            state.apply_resize(width, height);
            false
        });

        let registrations = [
            (SystemEventCode::Quit, on_quit),
            (SystemEventCode::KeyPressed, on_key.clone()),
            (SystemEventCode::KeyReleased, on_key),
            (SystemEventCode::WindowResized, on_resize),
        ];
        for (code, handler) in registrations {
            if !self.events.register(code, None, &handler) {
                return Err(ApplicationError::RegistrationFailed { code: code.code() });
            }
            self.handlers.push((code, handler));
        }
        Ok(())
    }
}
