//! Emitter - Completable subscriber lists for outgoing streams.
//!
//! Every stream a thumb exposes (value change, drag start/end, focus, blur) is an
//! [`Emitter`]. Subscribing returns a cleanup closure. Completing drops every
//! subscriber and turns later emits and subscriptions into no-ops.
//!
//! # Example
//!
//! ```ignore
//! let changes: Emitter<f64> = Emitter::new();
//! let cleanup = changes.subscribe(|value| println!("now {value}"));
//! changes.emit(&42.0);
//! cleanup();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Handler<T> = Rc<dyn Fn(&T)>;

struct EmitterState<T> {
    handlers: RefCell<Vec<(usize, Handler<T>)>>,
    next_id: Cell<usize>,
    completed: Cell<bool>,
}

/// A single-threaded multicast stream. Clones share subscribers.
pub struct Emitter<T> {
    state: Rc<EmitterState<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(EmitterState {
                handlers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                completed: Cell::new(false),
            }),
        }
    }

    /// Subscribe. Returns cleanup function to unsubscribe.
    pub fn subscribe<F>(&self, handler: F) -> impl FnOnce() + use<T, F>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        if !self.state.completed.get() {
            self.state.handlers.borrow_mut().push((id, Rc::new(handler)));
        }

        let state = Rc::downgrade(&self.state);
        move || {
            if let Some(state) = state.upgrade() {
                state.handlers.borrow_mut().retain(|(h_id, _)| *h_id != id);
            }
        }
    }

    /// Deliver a value to every subscriber, in subscription order.
    pub fn emit(&self, value: &T) {
        if self.state.completed.get() {
            return;
        }
        let handlers: Vec<Handler<T>> =
            self.state.handlers.borrow().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler(value);
        }
    }

    /// Drop all subscribers; later emits are ignored.
    pub fn complete(&self) {
        self.state.completed.set(true);
        self.state.handlers.borrow_mut().clear();
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.handlers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let emitter: Emitter<i32> = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = log.clone();
        let _c1 = emitter.subscribe(move |v| l1.borrow_mut().push(("a", *v)));
        let l2 = log.clone();
        let _c2 = emitter.subscribe(move |v| l2.borrow_mut().push(("b", *v)));

        emitter.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_cleanup_unsubscribes() {
        let emitter: Emitter<()> = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let cleanup = emitter.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        emitter.emit(&());
        cleanup();
        emitter.emit(&());
        assert_eq!(count.get(), 1);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn test_complete_stops_delivery() {
        let emitter: Emitter<f64> = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let _cleanup = emitter.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        emitter.complete();
        emitter.emit(&1.0);
        assert_eq!(count.get(), 0);
        assert!(emitter.is_completed());

        let _late = emitter.subscribe(|_| panic!("completed emitter delivered"));
        emitter.emit(&2.0);
        assert_eq!(emitter.subscriber_count(), 0);
    }
}
