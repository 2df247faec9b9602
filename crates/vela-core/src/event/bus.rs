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

use super::code::{EventCode, MAX_EVENT_CODES};
use super::context::EventContext;
use super::handler::{Event, EventHandler, ListenerId};
use crate::containers::Sequence;
use crate::memory::TaggedAllocator;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::sync::Arc;

/// The lifecycle of an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusState {
    /// Created, but `init` has not been called yet.
    #[default]
    Uninitialized,
    /// Accepting registrations and dispatching events.
    Initialized,
    /// `shutdown` released every listener list.
    ShutDown,
}

#[derive(Debug, Clone)]
struct RegisteredListener {
    listener: Option<ListenerId>,
    handler: EventHandler,
}

impl RegisteredListener {
    fn matches(&self, listener: Option<ListenerId>, handler: &EventHandler) -> bool {
        self.listener == listener && self.handler.id() == handler.id()
    }
}

/// A synchronous, code-indexed publish/subscribe bus.
///
/// Each of the [`MAX_EVENT_CODES`] codes owns an ordered list of
/// `(listener, handler)` pairs, created lazily on first registration and stored
/// in a [`Sequence`]. Firing a code calls its handlers in registration order
/// until one reports the event as handled.
///
/// The bus is single-threaded. Handlers receive `&EventBus` and may fire,
/// register or unregister while being dispatched: the registry is never borrowed
/// across a handler call.
#[derive(Debug)]
pub struct EventBus {
    allocator: Arc<TaggedAllocator>,
    state: Cell<BusState>,
    registry: RefCell<Vec<Option<Sequence<RegisteredListener>>>>,
}

impl EventBus {
    /// Creates an uninitialized bus whose listener lists are accounted by `allocator`.
    ///
    /// ## Returns
    /// A new bus. Call [`init`](Self::init) before using it.
    pub fn new(allocator: Arc<TaggedAllocator>) -> Self {
        Self {
            allocator,
            state: Cell::new(BusState::Uninitialized),
            registry: RefCell::new(Vec::new()),
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> BusState {
        self.state.get()
    }

    /// Returns `true` once [`init`](Self::init) succeeded and until [`shutdown`](Self::shutdown).
    pub fn is_initialized(&self) -> bool {
        self.state.get() == BusState::Initialized
    }

    /// Returns the allocator the listener lists are accounted with.
    pub fn allocator(&self) -> &Arc<TaggedAllocator> {
        &self.allocator
    }

    /// Prepares an empty registry and starts accepting registrations.
    ///
    /// ## Returns
    /// `false` (with a warning) if the bus is already initialized; its state is
    /// left untouched in that case. A shut-down bus can be initialized again.
    pub fn init(&self) -> bool {
        if self.is_initialized() {
            log::warn!("Event system already initialized.");
            return false;
        }

        let mut registry = self.registry.borrow_mut();
        registry.clear();
        registry.resize_with(MAX_EVENT_CODES, || None);
        self.state.set(BusState::Initialized);

        log::info!("Event system initialized with {MAX_EVENT_CODES} event codes.");
        true
    }

    /// Releases every listener list and stops accepting registrations.
    pub fn shutdown(&self) {
        if !self.is_initialized() {
            log::warn!("Event system not initialized.");
            return;
        }

        let mut registry = self.registry.borrow_mut();
        let mut released = 0usize;
        for listeners in registry.iter_mut().filter_map(Option::take) {
            listeners.destroy();
            released += 1;
        }
        registry.clear();
        registry.shrink_to_fit();
        self.state.set(BusState::ShutDown);

        log::info!("Event system shut down, released {released} listener lists.");
    }

    /// Registers `handler` on behalf of `listener` for `code`.
    ///
    /// ## Arguments
    /// * `code` - The event code to listen for.
    /// * `listener` - The identity of the interested object, if any.
    /// * `handler` - The handler to invoke. The bus keeps a clone.
    ///
    /// ## Returns
    /// `true` if the pair was appended. `false` if the bus is not initialized,
    /// the code is out of range, or the exact `(listener, handler)` pair is
    /// already registered for `code`.
    pub fn register(
        &self,
        code: impl Into<EventCode>,
        listener: Option<ListenerId>,
        handler: &EventHandler,
    ) -> bool {
        let code = code.into();
        if !self.accepts("register", code) {
            return false;
        }

        let mut registry = self.registry.borrow_mut();
        let slot = &mut registry[usize::from(code)];
        if slot.is_none() {
            match Sequence::new(Arc::clone(&self.allocator)) {
                Ok(listeners) => *slot = Some(listeners),
                Err(err) => {
                    log::error!("Failed to create the listener list for event code {code}: {err}");
                    return false;
                }
            }
        }
        let Some(listeners) = slot.as_mut() else {
            return false;
        };

        if listeners.iter().any(|entry| entry.matches(listener, handler)) {
            log::warn!("Event listener already registered for code {code}.");
            return false;
        }

        let entry = RegisteredListener {
            listener,
            handler: handler.clone(),
        };
        if let Err(err) = listeners.push(entry) {
            log::error!("Failed to register listener for event code {code}: {err}");
            return false;
        }

        log::trace!("Registered handler {:?} for event code {code}.", handler.id());
        true
    }

    /// Removes the registration of `handler` on behalf of `listener` for `code`.
    ///
    /// ## Returns
    /// `true` if a matching pair was removed. `false` if the bus is not
    /// initialized, the code has no listeners, or no pair matches. Nothing is
    /// modified when `false` is returned.
    pub fn unregister(
        &self,
        code: impl Into<EventCode>,
        listener: Option<ListenerId>,
        handler: &EventHandler,
    ) -> bool {
        let code = code.into();
        if !self.accepts("unregister", code) {
            return false;
        }

        let mut registry = self.registry.borrow_mut();
        let Some(listeners) = registry[usize::from(code)].as_mut() else {
            log::warn!("No listeners registered for code {code}.");
            return false;
        };

        match listeners
            .iter()
            .position(|entry| entry.matches(listener, handler))
        {
            Some(index) => {
                listeners.remove(index);
                log::trace!("Unregistered handler {:?} from event code {code}.", handler.id());
                true
            }
            None => {
                log::warn!("Event listener not found for code {code}.");
                false
            }
        }
    }

    /// Fires `code`, invoking its handlers in registration order.
    ///
    /// Dispatch stops at the first handler that returns `true`.
    ///
    /// ## Arguments
    /// * `code` - The event code to fire.
    /// * `sender` - The object firing the event, if it wants to be known.
    /// * `context` - The payload handed to every handler.
    ///
    /// ## Returns
    /// `true` if a handler handled the event, `false` if none did, if the code
    /// has no listeners, or if the bus is not initialized.
    pub fn fire(
        &self,
        code: impl Into<EventCode>,
        sender: Option<&dyn Any>,
        context: EventContext,
    ) -> bool {
        let code = code.into();
        if !self.accepts("fire", code) {
            return false;
        }

        // Handlers may change the registry, so dispatch walks the listeners
        // registered when the fire started. An entry unregistered since then
        // is skipped; one registered since then waits for the next fire.
        let snapshot = self.listeners_of(code);
        for entry in snapshot {
            if !self.is_registered(code, &entry) {
                continue;
            }
            let event = Event {
                code,
                sender,
                listener: entry.listener,
                context,
            };
            if entry.handler.call(self, &event) {
                log::trace!("Event code {code} handled by {:?}.", entry.handler.id());
                return true;
            }
        }
        false
    }

    /// Returns how many listeners are registered for `code`.
    pub fn listener_count(&self, code: impl Into<EventCode>) -> usize {
        let code = usize::from(code.into());
        self.registry
            .borrow()
            .get(code)
            .and_then(Option::as_ref)
            .map_or(0, Sequence::len)
    }

    fn listeners_of(&self, code: EventCode) -> Vec<RegisteredListener> {
        self.registry
            .borrow()
            .get(usize::from(code))
            .and_then(Option::as_ref)
            .map(|listeners| listeners.as_slice().to_vec())
            .unwrap_or_default()
    }

    fn is_registered(&self, code: EventCode, entry: &RegisteredListener) -> bool {
        self.registry
            .borrow()
            .get(usize::from(code))
            .and_then(Option::as_ref)
            .is_some_and(|listeners| {
                listeners
                    .iter()
                    .any(|current| current.matches(entry.listener, &entry.handler))
            })
    }

    fn accepts(&self, operation: &str, code: EventCode) -> bool {
        if !self.is_initialized() {
            log::error!("Event system not initialized: {operation} for code {code} ignored.");
            return false;
        }
        if usize::from(code) >= MAX_EVENT_CODES {
            log::error!(
                "Event code {code} is out of range (max {}): {operation} ignored.",
                MAX_EVENT_CODES - 1
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTag;
    use std::rc::Rc;

    const TEST_CODE: EventCode = 0x100;

    fn bus() -> EventBus {
        let bus = EventBus::new(Arc::new(TaggedAllocator::new()));
        assert!(bus.init());
        bus
    }

    fn counting_handler(counter: &Rc<Cell<u32>>, handled: bool) -> EventHandler {
        let counter = Rc::clone(counter);
        EventHandler::new(move |_, _| {
            counter.set(counter.get() + 1);
            handled
        })
    }

    #[test]
    fn test_lifecycle_states() {
        let bus = EventBus::new(Arc::new(TaggedAllocator::new()));
        assert_eq!(bus.state(), BusState::Uninitialized);
        assert!(bus.init());
        assert_eq!(bus.state(), BusState::Initialized);
        assert!(!bus.init(), "double init must be refused");
        bus.shutdown();
        assert_eq!(bus.state(), BusState::ShutDown);
        assert!(bus.init(), "a shut-down bus can be initialized again");
    }

    #[test]
    fn test_double_init_keeps_registrations() {
        let bus = bus();
        let handler = EventHandler::new(|_, _| true);
        assert!(bus.register(TEST_CODE, None, &handler));
        assert!(!bus.init());
        assert_eq!(bus.listener_count(TEST_CODE), 1);
    }

    #[test]
    fn test_operations_before_init_fail() {
        let bus = EventBus::new(Arc::new(TaggedAllocator::new()));
        let handler = EventHandler::new(|_, _| true);
        assert!(!bus.register(TEST_CODE, None, &handler));
        assert!(!bus.unregister(TEST_CODE, None, &handler));
        assert!(!bus.fire(TEST_CODE, None, EventContext::new()));
        assert_eq!(bus.listener_count(TEST_CODE), 0);
    }

    #[test]
    fn test_out_of_range_code_is_rejected() {
        let bus = bus();
        let handler = EventHandler::new(|_, _| true);
        let code = MAX_EVENT_CODES as EventCode;
        assert!(!bus.register(code, None, &handler));
        assert!(!bus.fire(code, None, EventContext::new()));
        assert!(bus.register(code - 1, None, &handler));
    }

    #[test]
    fn test_same_handler_different_listeners() {
        let bus = bus();
        let handler = EventHandler::new(|_, _| false);
        assert!(bus.register(TEST_CODE, Some(ListenerId::new(1)), &handler));
        assert!(bus.register(TEST_CODE, Some(ListenerId::new(2)), &handler));
        assert!(bus.register(TEST_CODE, None, &handler));
        assert!(!bus.register(TEST_CODE, None, &handler));
        assert_eq!(bus.listener_count(TEST_CODE), 3);
    }

    #[test]
    fn test_handler_sees_listener_sender_and_context() {
        let bus = bus();
        let seen = Rc::new(Cell::new(None));
        let seen_in_handler = Rc::clone(&seen);
        let handler = EventHandler::new(move |_, event| {
            let sender = event.sender.and_then(|s| s.downcast_ref::<&'static str>()).copied();
            seen_in_handler.set(Some((event.code, event.listener, sender, event.context.u16(0))));
            true
        });
        bus.register(TEST_CODE, Some(ListenerId::new(9)), &handler);

        let sender: &'static str = "input";
        let context = EventContext::from_u16s([77, 0, 0, 0, 0, 0, 0, 0]);
        assert!(bus.fire(TEST_CODE, Some(&sender), context));
        assert_eq!(
            seen.get(),
            Some((TEST_CODE, Some(ListenerId::new(9)), Some("input"), 77))
        );
    }

    #[test]
    fn test_handler_can_fire_reentrantly() {
        let bus = bus();
        let inner_count = Rc::new(Cell::new(0));
        let inner = counting_handler(&inner_count, true);
        let outer = EventHandler::new(|bus, _| bus.fire(TEST_CODE + 1, None, EventContext::new()));

        bus.register(TEST_CODE, None, &outer);
        bus.register(TEST_CODE + 1, None, &inner);

        assert!(bus.fire(TEST_CODE, None, EventContext::new()));
        assert_eq!(inner_count.get(), 1);
    }

    #[test]
    fn test_handler_can_unregister_itself() {
        let bus = bus();
        let count = Rc::new(Cell::new(0));
        let follower = counting_handler(&count, false);

        let slot: Rc<RefCell<Option<EventHandler>>> = Rc::new(RefCell::new(None));
        let slot_in_handler = Rc::clone(&slot);
        let once = EventHandler::new(move |bus, event| {
            if let Some(me) = slot_in_handler.borrow().as_ref() {
                bus.unregister(event.code, None, me);
            }
            false
        });
        *slot.borrow_mut() = Some(once.clone());

        bus.register(TEST_CODE, None, &once);
        bus.register(TEST_CODE, None, &follower);

        bus.fire(TEST_CODE, None, EventContext::new());
        assert_eq!(bus.listener_count(TEST_CODE), 1);
        assert_eq!(count.get(), 1, "follower still runs in the same fire");

        bus.fire(TEST_CODE, None, EventContext::new());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unregistering_an_earlier_listener_keeps_later_ones() {
        let bus = bus();
        let first = EventHandler::new(|_, _| false);
        let first_in_handler = first.clone();
        let remover = EventHandler::new(move |bus, event| {
            bus.unregister(event.code, None, &first_in_handler);
            false
        });
        let count = Rc::new(Cell::new(0));
        let last = counting_handler(&count, true);

        bus.register(TEST_CODE, None, &first);
        bus.register(TEST_CODE, None, &remover);
        bus.register(TEST_CODE, None, &last);

        assert!(bus.fire(TEST_CODE, None, EventContext::new()));
        assert_eq!(count.get(), 1);
        assert_eq!(bus.listener_count(TEST_CODE), 2);
    }

    #[test]
    fn test_unregistered_later_listener_is_skipped() {
        let bus = bus();
        let count = Rc::new(Cell::new(0));
        let victim = counting_handler(&count, true);
        let victim_in_handler = victim.clone();
        let remover = EventHandler::new(move |bus, event| {
            bus.unregister(event.code, None, &victim_in_handler);
            false
        });

        bus.register(TEST_CODE, None, &remover);
        bus.register(TEST_CODE, None, &victim);

        assert!(!bus.fire(TEST_CODE, None, EventContext::new()));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_listener_registered_during_fire_waits_for_next_fire() {
        let bus = bus();
        let count = Rc::new(Cell::new(0));
        let late = counting_handler(&count, true);
        let late_in_handler = late.clone();
        let registrar = EventHandler::new(move |bus, event| {
            bus.register(event.code, None, &late_in_handler);
            false
        });

        bus.register(TEST_CODE, None, &registrar);

        assert!(!bus.fire(TEST_CODE, None, EventContext::new()));
        assert_eq!(count.get(), 0);
        assert_eq!(bus.listener_count(TEST_CODE), 2);

        assert!(bus.fire(TEST_CODE, None, EventContext::new()));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_shutdown_releases_listener_storage() {
        let allocator = Arc::new(TaggedAllocator::new());
        let bus = EventBus::new(Arc::clone(&allocator));
        bus.init();

        let handler = EventHandler::new(|_, _| false);
        for code in [1u16, 2, 300, 16383] {
            bus.register(code, None, &handler);
        }
        assert!(allocator.tagged_allocated(MemoryTag::Sequence) > 0);

        bus.shutdown();
        assert_eq!(allocator.tagged_allocated(MemoryTag::Sequence), 0);
        assert_eq!(bus.listener_count(1u16), 0);
        assert!(!bus.fire(1u16, None, EventContext::new()));
    }
}
