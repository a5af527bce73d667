//! Host Document - A headless element tree the slider binds to.
//!
//! The slider never owns rendering. It reads and writes a small document model:
//! elements with attributes, classes, styles and layout rectangles, native range
//! inputs, capture/target/bubble events, focus, resize observation and platform
//! capabilities. A renderer (terminal, GPU, test) owns the layout rectangles and
//! feeds input events in.
//!
//! All state is thread-local. [`reset_dom`] restores a fresh document.
//!
//! # Example
//!
//! ```ignore
//! use spark_slider::dom;
//!
//! let host = dom::create_element("mat-slider");
//! dom::append_child(dom::body(), host);
//! dom::set_bounding_rect(host, Rect::new(0.0, 0.0, 200.0, 48.0));
//! ```

mod event;
mod focus;
mod node;
mod platform;
mod range;
mod resize;

pub use event::{
    add_event_listener, dispatch_event, listener_count, pointer_capture, release_pointer_capture,
    remove_event_listener, set_pointer_capture, total_listener_count, Event, EventHandler, EventId,
    EventType, ListenerId, ListenerOptions,
};
pub use focus::{active_element, blur, focus};
pub use node::{
    add_class, append_child, body, bounding_client_rect, children, contains, create_element,
    document_root, exists, get_attribute, has_attribute, has_class, is_connected, parent,
    rect_reads, remove_attribute, remove_class, remove_element, remove_style, set_attribute,
    set_bounding_rect, set_class, set_style, style, tag_name, window, ElementId,
};
pub use platform::{platform, set_platform, Platform};
pub use range::{
    input_value, input_value_as_number, range_bounds, set_input_value, step_by_key, RangeBounds,
    RangeKey,
};
pub use resize::{notify_resize, observer_count, ResizeEntry, ResizeObserver};

/// Reset the whole document: nodes, listeners, focus, observers, platform.
pub fn reset_dom() {
    node::reset_nodes();
    event::reset_events();
    focus::reset_focus();
    resize::reset_resize();
    platform::reset_platform();
}
