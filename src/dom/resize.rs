//! Resize observation.
//!
//! Observers are only available when the platform reports support. The host calls
//! [`notify_resize`] after it lays an element out again; every observer watching the
//! element receives one entry.

use std::cell::RefCell;
use std::rc::Rc;

use super::node::{self, ElementId};
use super::platform::platform;
use crate::types::Rect;

/// One resize notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    pub target: ElementId,
    pub content_rect: Rect,
}

type ResizeCallback = Rc<dyn Fn(&[ResizeEntry])>;

struct ObserverEntry {
    id: u64,
    callback: ResizeCallback,
    targets: Vec<ElementId>,
}

struct ObserverRegistry {
    observers: Vec<ObserverEntry>,
    next_id: u64,
}

thread_local! {
    static OBSERVERS: RefCell<ObserverRegistry> = RefCell::new(ObserverRegistry {
        observers: Vec::new(),
        next_id: 0,
    });
}

/// Handle to a registered resize observer. Dropping the handle does not disconnect.
#[derive(Debug)]
pub struct ResizeObserver {
    id: u64,
}

impl ResizeObserver {
    /// Create an observer, or `None` when the platform cannot observe resizes.
    pub fn new<F>(callback: F) -> Option<Self>
    where
        F: Fn(&[ResizeEntry]) + 'static,
    {
        if !platform().supports_resize_observer {
            return None;
        }
        let id = OBSERVERS.with(|reg| {
            let mut reg = reg.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.observers.push(ObserverEntry { id, callback: Rc::new(callback), targets: Vec::new() });
            id
        });
        Some(Self { id })
    }

    /// Start watching an element.
    pub fn observe(&self, el: ElementId) {
        self.with_entry(|entry| {
            if !entry.targets.contains(&el) {
                entry.targets.push(el);
            }
        });
    }

    /// Stop watching an element.
    pub fn unobserve(&self, el: ElementId) {
        self.with_entry(|entry| entry.targets.retain(|t| *t != el));
    }

    /// Stop watching everything and unregister.
    pub fn disconnect(&self) {
        OBSERVERS.with(|reg| reg.borrow_mut().observers.retain(|o| o.id != self.id));
    }

    fn with_entry(&self, f: impl FnOnce(&mut ObserverEntry)) {
        OBSERVERS.with(|reg| {
            if let Some(entry) = reg.borrow_mut().observers.iter_mut().find(|o| o.id == self.id) {
                f(entry);
            }
        });
    }
}

/// Record a new layout rect for `el` and deliver it to every observer watching it.
pub fn notify_resize(el: ElementId, rect: Rect) {
    node::set_bounding_rect(el, rect);
    let callbacks: Vec<ResizeCallback> = OBSERVERS.with(|reg| {
        reg.borrow()
            .observers
            .iter()
            .filter(|o| o.targets.contains(&el))
            .map(|o| o.callback.clone())
            .collect()
    });
    let entries = [ResizeEntry { target: el, content_rect: rect }];
    for callback in callbacks {
        callback(&entries);
    }
}

/// Number of connected observers.
pub fn observer_count() -> usize {
    OBSERVERS.with(|reg| reg.borrow().observers.len())
}

pub(crate) fn reset_resize() {
    OBSERVERS.with(|reg| reg.borrow_mut().observers.clear());
}
