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

//! Provides the engine's synchronous event bus.
//!
//! The primary component is the [`EventBus`]: a registry of
//! `(listener, handler)` pairs indexed by [`EventCode`]. Firing a code invokes
//! its handlers in registration order and stops at the first one that reports
//! the event as handled.
//!
//! Codes `0x01..=0xFF` are reserved for the engine ([`SystemEventCode`]);
//! applications define their own codes above that range.

mod bus;
mod code;
mod context;
mod handler;

pub use self::bus::{BusState, EventBus};
pub use self::code::{
    is_system_code, EventCode, SystemEventCode, MAX_EVENT_CODES, MAX_SYSTEM_EVENT_CODE,
};
pub use self::context::EventContext;
pub use self::handler::{Event, EventHandler, HandlerId, ListenerId};
