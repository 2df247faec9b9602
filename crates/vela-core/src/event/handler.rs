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

//! Listener identities, handlers and the event record passed to them.

use super::bus::EventBus;
use super::code::EventCode;
use super::context::EventContext;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque identity for the object interested in an event.
///
/// The bus never dereferences it; it only compares identities when detecting
/// duplicate registrations and when unregistering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wraps a caller-chosen raw identity.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Derives an identity from the address of `object`.
    ///
    /// Only meaningful while `object` stays at the same address.
    pub fn of<T>(object: &T) -> Self {
        Self(object as *const T as usize as u64)
    }

    /// Returns the raw identity.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The stable identity of an [`EventHandler`]. Clones of a handler share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

impl HandlerId {
    fn next() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Everything a handler learns about the event it is invoked for.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The code the event was fired with.
    pub code: EventCode,
    /// The object that fired the event, if it identified itself.
    pub sender: Option<&'a dyn Any>,
    /// The listener identity the handler was registered with.
    pub listener: Option<ListenerId>,
    /// The event payload.
    pub context: EventContext,
}

type Callback = dyn Fn(&EventBus, &Event<'_>) -> bool;

/// A callback registered on the [`EventBus`].
///
/// The callback returns `true` when it handled the event, which stops the
/// dispatch. It receives the bus itself so it can fire follow-up events or
/// change registrations while being dispatched.
///
/// Closures are not comparable, so every handler gets a [`HandlerId`] when it is
/// created. Keep a clone of the handler to unregister it later.
#[derive(Clone)]
pub struct EventHandler {
    id: HandlerId,
    callback: Rc<Callback>,
}

impl EventHandler {
    /// Wraps `callback` in a handler with a fresh identity.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EventBus, &Event<'_>) -> bool + 'static,
    {
        Self {
            id: HandlerId::next(),
            callback: Rc::new(callback),
        }
    }

    /// Returns the handler's identity.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub(crate) fn call(&self, bus: &EventBus, event: &Event<'_>) -> bool {
        (self.callback)(bus, event)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").field("id", &self.id).finish()
    }
}
