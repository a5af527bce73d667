//! Document focus - The active element and focus/blur delivery.
//!
//! The active element is held in a reactive signal. Moving focus dispatches a
//! non-bubbling `blur` on the old element first, then updates the signal, then
//! dispatches `focus` on the new one.

use spark_signals::{signal, Signal};

use super::event::{dispatch_event, Event, EventType};
use super::node::{self, ElementId};

thread_local! {
    static ACTIVE_ELEMENT: Signal<Option<ElementId>> = signal(None);
}

/// Currently focused element, if any.
pub fn active_element() -> Option<ElementId> {
    ACTIVE_ELEMENT.with(|s| s.get())
}

/// Focus an element. Already-focused or unknown elements are ignored.
pub fn focus(el: ElementId) {
    if !node::exists(el) {
        return;
    }
    let old = active_element();
    if old == Some(el) {
        return;
    }
    if let Some(old) = old {
        ACTIVE_ELEMENT.with(|s| s.set(None));
        dispatch_event(&Event::new(EventType::Blur, old));
    }
    ACTIVE_ELEMENT.with(|s| s.set(Some(el)));
    dispatch_event(&Event::new(EventType::Focus, el));
}

/// Blur an element if it is the active one.
pub fn blur(el: ElementId) {
    if active_element() != Some(el) {
        return;
    }
    ACTIVE_ELEMENT.with(|s| s.set(None));
    dispatch_event(&Event::new(EventType::Blur, el));
}

pub(crate) fn reset_focus() {
    ACTIVE_ELEMENT.with(|s| s.set(None));
}
