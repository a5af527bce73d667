//! Synthetic event side channel.
//!
//! Events the slider dispatches itself are registered here for exactly the
//! duration of their dispatch. The shared capture listener checks this set to tell
//! its own events apart from native ones.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::dom::{self, Event, EventId};

thread_local! {
    static IN_FLIGHT: RefCell<HashSet<EventId>> = RefCell::new(HashSet::new());
}

/// Unregisters the event when dropped, even if a listener panics.
struct InFlight(EventId);

impl Drop for InFlight {
    fn drop(&mut self) {
        IN_FLIGHT.with(|set| set.borrow_mut().remove(&self.0));
    }
}

/// Dispatch `event` marked as synthetic.
pub fn dispatch_synthetic(event: &Event) -> bool {
    IN_FLIGHT.with(|set| set.borrow_mut().insert(event.id()));
    let _guard = InFlight(event.id());
    dom::dispatch_event(event)
}

/// Whether `event` is currently being dispatched by [`dispatch_synthetic`].
pub fn is_synthetic(event: &Event) -> bool {
    IN_FLIGHT.with(|set| set.borrow().contains(&event.id()))
}
