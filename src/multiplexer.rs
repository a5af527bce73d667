//! Global Event Multiplexer - One shared capture listener per event type.
//!
//! Every slider on the page needs to see `change` and `input` events from its
//! inputs before anything else does. Instead of each instance binding its own
//! capturing listener, all instances share one per event type.
//!
//! # Pattern
//!
//! - First subscription for a type attaches one capture + passive listener on the
//!   document root (outside the update zone)
//! - Later subscriptions reuse it
//! - Last unsubscription removes the listener and forgets the entry
//! - Subscribers run inside the update zone, in subscription order
//!
//! # Example
//!
//! ```ignore
//! use spark_slider::multiplexer;
//!
//! let subscription = multiplexer::listen(EventType::Change, |event| {
//!     println!("change on {:?}", event.target());
//! });
//!
//! subscription.unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::dom::{self, Event, EventType, ListenerId, ListenerOptions};
use crate::scheduler;

// =============================================================================
// REGISTRY
// =============================================================================

type Subscriber = Rc<dyn Fn(&Event)>;

/// Shared listener for one event type.
struct SharedListener {
    listener: ListenerId,
    subscribers: Vec<(u64, Subscriber)>,
}

struct Multiplexer {
    listeners: HashMap<EventType, SharedListener>,
    next_id: u64,
    attached: u64,
    detached: u64,
}

impl Multiplexer {
    fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
            attached: 0,
            detached: 0,
        }
    }
}

thread_local! {
    static MULTIPLEXER: RefCell<Multiplexer> = RefCell::new(Multiplexer::new());
}

/// Attach/detach totals since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultiplexerStats {
    /// Real listeners added to the document root.
    pub attached: u64,
    /// Real listeners removed from the document root.
    pub detached: u64,
    /// Event types currently backed by a real listener.
    pub active_types: usize,
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle returned by [`listen`].
#[derive(Debug)]
pub struct Subscription {
    event_type: EventType,
    id: u64,
    closed: Cell<bool>,
}

impl Subscription {
    /// Stop receiving events. Calling it again does nothing.
    pub fn unsubscribe(&self) {
        if self.closed.replace(true) {
            return;
        }
        let detach = MULTIPLEXER.with(|m| {
            let mut m = m.borrow_mut();
            let shared = m.listeners.get_mut(&self.event_type)?;
            shared.subscribers.retain(|(id, _)| *id != self.id);
            if !shared.subscribers.is_empty() {
                return None;
            }
            let shared = m.listeners.remove(&self.event_type)?;
            m.detached += 1;
            Some(shared.listener)
        });
        if let Some(listener) = detach {
            trace!("multiplexer: detach {}", self.event_type.as_str());
            dom::remove_event_listener(listener);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to every `event_type` event in the document, ahead of target listeners.
pub fn listen<F>(event_type: EventType, callback: F) -> Subscription
where
    F: Fn(&Event) + 'static,
{
    let callback: Subscriber = Rc::new(callback);
    let (id, needs_listener) = MULTIPLEXER.with(|m| {
        let mut m = m.borrow_mut();
        let id = m.next_id;
        m.next_id += 1;
        match m.listeners.get_mut(&event_type) {
            Some(shared) => {
                shared.subscribers.push((id, callback.clone()));
                (id, false)
            }
            None => (id, true),
        }
    });

    if needs_listener {
        let listener = scheduler::run_outside(|| {
            dom::add_event_listener(
                dom::document_root(),
                event_type,
                ListenerOptions::CAPTURE | ListenerOptions::PASSIVE,
                Rc::new(move |event: &Event| deliver(event_type, event)),
            )
        });
        trace!("multiplexer: attach {}", event_type.as_str());
        MULTIPLEXER.with(|m| {
            let mut m = m.borrow_mut();
            m.attached += 1;
            m.listeners.insert(
                event_type,
                SharedListener { listener, subscribers: vec![(id, callback)] },
            );
        });
    }

    Subscription { event_type, id, closed: Cell::new(false) }
}

fn deliver(event_type: EventType, event: &Event) {
    let subscribers: Vec<(u64, Subscriber)> = MULTIPLEXER.with(|m| {
        m.borrow()
            .listeners
            .get(&event_type)
            .map(|shared| shared.subscribers.clone())
            .unwrap_or_default()
    });
    for (id, subscriber) in subscribers {
        if event.is_immediate_propagation_stopped() {
            break;
        }
        let still_subscribed = MULTIPLEXER.with(|m| {
            m.borrow()
                .listeners
                .get(&event_type)
                .is_some_and(|shared| shared.subscribers.iter().any(|(s, _)| *s == id))
        });
        if still_subscribed {
            scheduler::run_inside(|| subscriber(event));
        }
    }
}

/// Attach/detach totals and active types.
pub fn stats() -> MultiplexerStats {
    MULTIPLEXER.with(|m| {
        let m = m.borrow();
        MultiplexerStats {
            attached: m.attached,
            detached: m.detached,
            active_types: m.listeners.len(),
        }
    })
}

/// Number of subscribers for an event type.
pub fn subscriber_count(event_type: EventType) -> usize {
    MULTIPLEXER.with(|m| {
        m.borrow()
            .listeners
            .get(&event_type)
            .map_or(0, |shared| shared.subscribers.len())
    })
}

/// Forget all shared listeners and counters (for testing).
pub fn reset_multiplexer() {
    let listeners: Vec<ListenerId> = MULTIPLEXER.with(|m| {
        let mut m = m.borrow_mut();
        let ids = m.listeners.values().map(|s| s.listener).collect();
        *m = Multiplexer::new();
        ids
    });
    for listener in listeners {
        dom::remove_event_listener(listener);
    }
}

// =============================================================================
// TESTS
// =============================================================================
