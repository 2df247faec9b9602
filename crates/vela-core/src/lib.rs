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

//! # Vela Core
//!
//! The engine's low-level runtime substrate: a tagged memory allocator, a
//! growable sequence container built on top of it, and a code-indexed event bus
//! built on top of the container.
//!
//! The remaining modules are the thin collaborators that consume that core:
//! input state tracking, a headless platform layer and the application loop.

#![warn(missing_docs)]

pub mod application;
pub mod config;
pub mod containers;
pub mod error;
pub mod event;
pub mod input;
pub mod memory;
pub mod platform;

pub use application::{Application, Game};
pub use config::ApplicationConfig;
pub use containers::Sequence;
pub use error::{ApplicationError, ConfigError, MemoryError, SequenceError};
pub use event::{
    Event, EventBus, EventCode, EventContext, EventHandler, ListenerId, SystemEventCode,
};
pub use input::{InputState, Key, MouseButton};
pub use memory::{MemoryTag, TaggedAllocator};
pub use platform::{ChannelPlatform, Platform, PlatformEvent, WindowPlacement};
