//! Events - Listener registry and capture/target/bubble dispatch.
//!
//! Listeners are registered per (target, event type) with [`ListenerOptions`] and
//! identified by a [`ListenerId`] for removal. Dispatch walks the path from the
//! window down to the target (capture), runs every listener on the target, then
//! walks back up (bubble) for event types that bubble.
//!
//! Listener lists are snapshotted per node before invoking, and a listener removed
//! mid-dispatch is skipped, so handlers are free to add/remove listeners and
//! dispatch nested events.
//!
//! # Example
//!
//! ```ignore
//! use spark_slider::dom::{self, Event, EventType, ListenerOptions};
//! use std::rc::Rc;
//!
//! let id = dom::add_event_listener(
//!     dom::document_root(),
//!     EventType::Change,
//!     ListenerOptions::CAPTURE | ListenerOptions::PASSIVE,
//!     Rc::new(|event: &Event| println!("change on {:?}", event.target())),
//! );
//! dom::remove_event_listener(id);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::node::{self, ElementId};

// =============================================================================
// EVENT TYPES
// =============================================================================

/// Event types the host document understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Change,
    Input,
    Focus,
    Blur,
    PointerDown,
    PointerMove,
    PointerUp,
    MouseDown,
    MouseMove,
    MouseUp,
    MouseEnter,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
    KeyDown,
    Resize,
}

impl EventType {
    /// DOM name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Change => "change",
            EventType::Input => "input",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
            EventType::PointerDown => "pointerdown",
            EventType::PointerMove => "pointermove",
            EventType::PointerUp => "pointerup",
            EventType::MouseDown => "mousedown",
            EventType::MouseMove => "mousemove",
            EventType::MouseUp => "mouseup",
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::TouchStart => "touchstart",
            EventType::TouchMove => "touchmove",
            EventType::TouchEnd => "touchend",
            EventType::KeyDown => "keydown",
            EventType::Resize => "resize",
        }
    }

    /// Whether the event continues to ancestors after the target phase.
    pub fn bubbles(self) -> bool {
        !matches!(
            self,
            EventType::Focus
                | EventType::Blur
                | EventType::MouseEnter
                | EventType::MouseLeave
                | EventType::Resize
        )
    }

    /// Whether `prevent_default` has any effect.
    pub fn cancelable(self) -> bool {
        !matches!(
            self,
            EventType::Change
                | EventType::Input
                | EventType::Focus
                | EventType::Blur
                | EventType::MouseEnter
                | EventType::MouseLeave
                | EventType::Resize
        )
    }
}

bitflags::bitflags! {
    /// Listener registration options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ListenerOptions: u8 {
        const NONE = 0;
        /// Run during the capture phase on ancestors.
        const CAPTURE = 1 << 0;
        /// `prevent_default` is ignored inside the listener.
        const PASSIVE = 1 << 1;
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// Unique identity of one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u64);

thread_local! {
    static NEXT_EVENT_ID: Cell<u64> = const { Cell::new(0) };
}

/// A host-document event.
#[derive(Debug)]
pub struct Event {
    id: EventId,
    event_type: EventType,
    target: ElementId,
    /// Horizontal pointer position in client coordinates.
    pub client_x: f64,
    /// Vertical pointer position in client coordinates.
    pub client_y: f64,
    /// Pointer id for pointer events.
    pub pointer_id: Option<i32>,
    /// Key name for key events (e.g. "ArrowRight").
    pub key: Option<String>,
    current_target: Cell<Option<ElementId>>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
    in_passive: Cell<bool>,
}

impl Event {
    /// Create an event aimed at `target` with a fresh id.
    pub fn new(event_type: EventType, target: ElementId) -> Self {
        let id = NEXT_EVENT_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            EventId(id)
        });
        Self {
            id,
            event_type,
            target,
            client_x: 0.0,
            client_y: 0.0,
            pointer_id: None,
            key: None,
            current_target: Cell::new(None),
            propagation_stopped: Cell::new(false),
            immediate_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
            in_passive: Cell::new(false),
        }
    }

    pub fn with_client_x(mut self, x: f64) -> Self {
        self.client_x = x;
        self
    }

    pub fn with_client_y(mut self, y: f64) -> Self {
        self.client_y = y;
        self
    }

    pub fn with_pointer_id(mut self, pointer_id: i32) -> Self {
        self.pointer_id = Some(pointer_id);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Node whose listener is currently running.
    pub fn current_target(&self) -> Option<ElementId> {
        self.current_target.get()
    }

    /// Stop after the listeners of the current node.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Stop immediately; no further listener runs, not even on the current node.
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }

    /// Cancel the default action. Ignored in passive listeners and for
    /// non-cancelable types.
    pub fn prevent_default(&self) {
        if self.event_type.cancelable() && !self.in_passive.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_stopped.get()
    }
}

// =============================================================================
// LISTENER REGISTRY
// =============================================================================

/// Listener callback.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    target: ElementId,
    event_type: EventType,
    options: ListenerOptions,
    handler: EventHandler,
}

struct ListenerRegistry {
    // Ordered by id, i.e. registration order
    entries: Vec<(ListenerId, ListenerEntry)>,
    next_id: u64,
}

impl ListenerRegistry {
    fn new() -> Self {
        Self { entries: Vec::new(), next_id: 0 }
    }
}

thread_local! {
    static LISTENERS: RefCell<ListenerRegistry> = RefCell::new(ListenerRegistry::new());
}

/// Register a listener. Returns the id used to remove it.
pub fn add_event_listener(
    target: ElementId,
    event_type: EventType,
    options: ListenerOptions,
    handler: EventHandler,
) -> ListenerId {
    LISTENERS.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = ListenerId(reg.next_id);
        reg.next_id += 1;
        reg.entries.push((id, ListenerEntry { target, event_type, options, handler }));
        id
    })
}

/// Remove a listener. Returns false if it was not registered.
pub fn remove_event_listener(id: ListenerId) -> bool {
    LISTENERS.with(|reg| {
        let mut reg = reg.borrow_mut();
        let before = reg.entries.len();
        reg.entries.retain(|(entry_id, _)| *entry_id != id);
        reg.entries.len() != before
    })
}

/// Number of listeners registered for (target, type), any options.
pub fn listener_count(target: ElementId, event_type: EventType) -> usize {
    LISTENERS.with(|reg| {
        reg.borrow()
            .entries
            .iter()
            .filter(|(_, e)| e.target == target && e.event_type == event_type)
            .count()
    })
}

/// Total number of registered listeners.
pub fn total_listener_count() -> usize {
    LISTENERS.with(|reg| reg.borrow().entries.len())
}

pub(crate) fn remove_listeners_for(target: ElementId) {
    LISTENERS.with(|reg| reg.borrow_mut().entries.retain(|(_, e)| e.target != target));
}

fn is_registered(id: ListenerId) -> bool {
    LISTENERS.with(|reg| reg.borrow().entries.iter().any(|(entry_id, _)| *entry_id == id))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Capture,
    Target,
    Bubble,
}

fn snapshot(node: ElementId, event_type: EventType, phase: Phase) -> Vec<(ListenerId, bool, EventHandler)> {
    LISTENERS.with(|reg| {
        reg.borrow()
            .entries
            .iter()
            .filter(|(_, e)| e.target == node && e.event_type == event_type)
            .filter(|(_, e)| match phase {
                Phase::Capture => e.options.contains(ListenerOptions::CAPTURE),
                Phase::Target => true,
                Phase::Bubble => !e.options.contains(ListenerOptions::CAPTURE),
            })
            .map(|(id, e)| (*id, e.options.contains(ListenerOptions::PASSIVE), e.handler.clone()))
            .collect()
    })
}

fn invoke(node: ElementId, event: &Event, phase: Phase) {
    for (id, passive, handler) in snapshot(node, event.event_type, phase) {
        if event.is_immediate_propagation_stopped() {
            return;
        }
        if !is_registered(id) {
            continue;
        }
        event.current_target.set(Some(node));
        event.in_passive.set(passive);
        handler(event);
        event.in_passive.set(false);
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Event path from the target up to the top (window for connected nodes).
fn event_path(target: ElementId) -> Vec<ElementId> {
    let mut path = vec![target];
    if target == node::window() {
        return path;
    }
    let mut current = node::parent(target);
    while let Some(el) = current {
        path.push(el);
        current = node::parent(el);
    }
    if path.last() == Some(&node::document_root()) {
        path.push(node::window());
    }
    path
}

/// Dispatch an event. Returns false if a listener prevented the default action.
pub fn dispatch_event(event: &Event) -> bool {
    let path = event_path(event.target);

    // Capture: top-down, excluding the target
    for &el in path.iter().skip(1).rev() {
        invoke(el, event, Phase::Capture);
        if event.is_propagation_stopped() {
            return finish(event);
        }
    }

    invoke(event.target, event, Phase::Target);
    if event.is_propagation_stopped() {
        return finish(event);
    }

    if event.event_type.bubbles() {
        for &el in path.iter().skip(1) {
            invoke(el, event, Phase::Bubble);
            if event.is_propagation_stopped() {
                break;
            }
        }
    }

    finish(event)
}

fn finish(event: &Event) -> bool {
    event.current_target.set(None);
    // Capture ends implicitly with the pointer
    if event.event_type == EventType::PointerUp {
        if let Some(pointer_id) = event.pointer_id {
            release_pointer_capture(pointer_id);
        }
    }
    !event.default_prevented()
}

// =============================================================================
// POINTER CAPTURE
// =============================================================================

thread_local! {
    static POINTER_CAPTURE: RefCell<HashMap<i32, ElementId>> = RefCell::new(HashMap::new());
}

/// Route later events of `pointer_id` to `el` until released.
pub fn set_pointer_capture(el: ElementId, pointer_id: i32) {
    POINTER_CAPTURE.with(|c| c.borrow_mut().insert(pointer_id, el));
}

/// Release a pointer capture.
pub fn release_pointer_capture(pointer_id: i32) {
    POINTER_CAPTURE.with(|c| c.borrow_mut().remove(&pointer_id));
}

/// Element currently capturing `pointer_id`.
pub fn pointer_capture(pointer_id: i32) -> Option<ElementId> {
    POINTER_CAPTURE.with(|c| c.borrow().get(&pointer_id).copied())
}

pub(crate) fn reset_events() {
    LISTENERS.with(|reg| *reg.borrow_mut() = ListenerRegistry::new());
    POINTER_CAPTURE.with(|c| c.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================
