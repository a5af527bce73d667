//! Directionality - Text direction provider.
//!
//! The current [`Direction`] lives in a signal. Consumers either read it or register
//! a change callback; the callback only fires when the value actually changes.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::Direction;

type ChangeHandler = Rc<dyn Fn(Direction)>;

struct DirectionalityInner {
    value: Signal<Direction>,
    handlers: RefCell<Vec<(usize, ChangeHandler)>>,
    next_id: RefCell<usize>,
}

/// Shared direction provider. Clones observe the same direction.
#[derive(Clone)]
pub struct Directionality {
    inner: Rc<DirectionalityInner>,
}

impl Default for Directionality {
    fn default() -> Self {
        Self::new(Direction::Ltr)
    }
}

impl Directionality {
    pub fn new(initial: Direction) -> Self {
        Self {
            inner: Rc::new(DirectionalityInner {
                value: signal(initial),
                handlers: RefCell::new(Vec::new()),
                next_id: RefCell::new(0),
            }),
        }
    }

    /// Current direction.
    pub fn value(&self) -> Direction {
        self.inner.value.get()
    }

    pub fn is_rtl(&self) -> bool {
        self.value() == Direction::Rtl
    }

    /// Change the direction and notify handlers if it differs.
    pub fn set(&self, direction: Direction) {
        if self.value() == direction {
            return;
        }
        self.inner.value.set(direction);
        let handlers: Vec<ChangeHandler> =
            self.inner.handlers.borrow().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler(direction);
        }
    }

    /// Register a change handler. Returns cleanup function to unregister.
    pub fn on_change<F>(&self, handler: F) -> impl FnOnce() + use<F>
    where
        F: Fn(Direction) + 'static,
    {
        let id = {
            let mut next = self.inner.next_id.borrow_mut();
            let id = *next;
            *next += 1;
            id
        };
        self.inner.handlers.borrow_mut().push((id, Rc::new(handler)));

        let inner = Rc::downgrade(&self.inner);
        move || {
            if let Some(inner) = inner.upgrade() {
                inner.handlers.borrow_mut().retain(|(h_id, _)| *h_id != id);
            }
        }
    }

    /// Backing signal, for reactive consumers.
    pub fn signal(&self) -> Signal<Direction> {
        self.inner.value.clone()
    }
}
