//! Container adapter - [`SliderAdapter`] over the container's elements.
//!
//! Holds a weak reference so the foundation never keeps the container alive.
//! Every call on a dropped container is a no-op returning a neutral value.

use std::rc::{Rc, Weak};

use crate::dom::{self, ElementId, EventHandler, EventType, ListenerOptions};
use crate::foundation::adapter::{InputAttribute, InputAttributeName, Registration, SliderAdapter};
use crate::types::{Rect, ThumbPosition, TickMark};

use super::container::{Slider, SliderInner};
use super::thumb_input::ThumbInput;

pub(crate) struct ContainerAdapter {
    inner: Weak<SliderInner>,
}

impl ContainerAdapter {
    pub(crate) fn new(inner: Weak<SliderInner>) -> Self {
        Self { inner }
    }

    fn inner(&self) -> Option<Rc<SliderInner>> {
        self.inner.upgrade()
    }

    fn host(&self) -> Option<ElementId> {
        self.inner().map(|inner| inner.host)
    }

    fn input(&self, thumb: ThumbPosition) -> Option<Rc<ThumbInput>> {
        self.inner()?.input(thumb)
    }

    fn input_el(&self, thumb: ThumbPosition) -> Option<ElementId> {
        self.input(thumb).map(|input| input.host())
    }

    fn thumb_el(&self, thumb: ThumbPosition) -> Option<ElementId> {
        self.inner()?.visual_thumb(thumb).map(|t| t.host())
    }

    fn knob_el(&self, thumb: ThumbPosition) -> Option<ElementId> {
        self.inner()?.visual_thumb(thumb).map(|t| t.knob())
    }

    fn listen(&self, target: Option<ElementId>, event_type: EventType, handler: EventHandler) -> Registration {
        match target {
            Some(el) => Registration::Listener(dom::add_event_listener(el, event_type, ListenerOptions::NONE, handler)),
            None => Registration::Detached,
        }
    }

    fn unlisten(&self, registration: Registration) {
        match registration {
            Registration::Listener(id) => {
                dom::remove_event_listener(id);
            }
            Registration::ChangeHandler(thumb) => {
                if let Some(inner) = self.inner() {
                    inner.change_handlers.borrow_mut()[thumb.slot()] = None;
                }
            }
            Registration::Detached => {}
        }
    }

    /// Fake DOM event, form callback, then the value stream.
    fn notify_value(&self, event_type: EventType, value: f64, thumb: ThumbPosition) {
        if let Some(input) = self.input(thumb) {
            input.emit_fake_event(event_type);
            input.call_on_change(value);
            input.value_change().emit(&value);
        }
    }

    fn notify_drag(&self, value: f64, thumb: ThumbPosition, start: bool) {
        let Some(inner) = self.inner() else {
            return;
        };
        if let Some(input) = inner.input(thumb) {
            input.set_active(start);
            input.emit_drag(input.clone(), Slider::from_inner(inner.clone()), value, start);
        }
    }
}

impl SliderAdapter for ContainerAdapter {
    fn has_class(&self, class: &str) -> bool {
        self.host().is_some_and(|host| dom::has_class(host, class))
    }

    fn add_class(&self, class: &str) {
        if let Some(host) = self.host() {
            dom::add_class(host, class);
        }
    }

    fn remove_class(&self, class: &str) {
        if let Some(host) = self.host() {
            dom::remove_class(host, class);
        }
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        dom::get_attribute(self.host()?, name)
    }

    fn add_thumb_class(&self, class: &str, thumb: ThumbPosition) {
        if let Some(el) = self.thumb_el(thumb) {
            dom::add_class(el, class);
        }
    }

    fn remove_thumb_class(&self, class: &str, thumb: ThumbPosition) {
        if let Some(el) = self.thumb_el(thumb) {
            dom::remove_class(el, class);
        }
    }

    fn get_thumb_knob_width(&self, thumb: ThumbPosition) -> f64 {
        self.knob_el(thumb).map_or(0.0, |el| dom::bounding_client_rect(el).width)
    }

    fn get_thumb_bounding_client_rect(&self, thumb: ThumbPosition) -> Rect {
        self.knob_el(thumb).map(dom::bounding_client_rect).unwrap_or_default()
    }

    fn set_thumb_style_property(&self, property: &str, value: &str, thumb: ThumbPosition) {
        if let Some(el) = self.thumb_el(thumb) {
            dom::set_style(el, property, value);
        }
    }

    fn remove_thumb_style_property(&self, property: &str, thumb: ThumbPosition) {
        if let Some(el) = self.thumb_el(thumb) {
            dom::remove_style(el, property);
        }
    }

    fn get_value_indicator_container_width(&self, thumb: ThumbPosition) -> f64 {
        self.inner()
            .and_then(|inner| inner.visual_thumb(thumb))
            .map_or(0.0, |t| dom::bounding_client_rect(t.value_indicator_container()).width)
    }

    fn set_value_indicator_text(&self, value: f64, thumb: ThumbPosition) {
        if let Some(inner) = self.inner() {
            inner.indicator_signal(thumb).set(inner.display(value));
        }
    }

    fn get_input_value(&self, thumb: ThumbPosition) -> String {
        self.input_el(thumb).map(dom::input_value).unwrap_or_default()
    }

    fn set_input_value(&self, value: &str, thumb: ThumbPosition) {
        if let Some(el) = self.input_el(thumb) {
            dom::set_input_value(el, value);
        }
    }

    fn get_input_attribute(&self, name: InputAttributeName, thumb: ThumbPosition) -> Option<String> {
        dom::get_attribute(self.input_el(thumb)?, name.as_str())
    }

    fn set_input_attribute(&self, attribute: InputAttribute, thumb: ThumbPosition) {
        if let Some(el) = self.input_el(thumb) {
            dom::set_attribute(el, attribute.name().as_str(), &attribute.value_string());
        }
    }

    fn remove_input_attribute(&self, name: InputAttributeName, thumb: ThumbPosition) {
        if let Some(el) = self.input_el(thumb) {
            dom::remove_attribute(el, name.as_str());
        }
    }

    fn focus_input(&self, thumb: ThumbPosition) {
        if let Some(el) = self.input_el(thumb) {
            dom::focus(el);
        }
    }

    fn is_input_focused(&self, thumb: ThumbPosition) -> bool {
        self.input(thumb).is_some_and(|input| input.is_focused())
    }

    fn get_bounding_client_rect(&self) -> Rect {
        let Some(inner) = self.inner() else {
            return Rect::default();
        };
        inner.cached_host_rect.get().unwrap_or_else(|| dom::bounding_client_rect(inner.host))
    }

    fn is_rtl(&self) -> bool {
        self.inner().is_some_and(|inner| inner.dir.is_rtl())
    }

    fn set_track_active_style_property(&self, property: &str, value: &str) {
        if let Some(inner) = self.inner() {
            dom::set_style(inner.track_active, property, value);
        }
    }

    fn remove_track_active_style_property(&self, property: &str) {
        if let Some(inner) = self.inner() {
            dom::remove_style(inner.track_active, property);
        }
    }

    fn value_to_aria_value_text(&self, value: f64, _thumb: ThumbPosition) -> Option<String> {
        self.inner().map(|inner| inner.display(value))
    }

    fn update_tick_marks(&self, tick_marks: Vec<TickMark>) {
        if let Some(inner) = self.inner() {
            inner.tick_marks.set(tick_marks);
        }
    }

    fn set_pointer_capture(&self, pointer_id: i32) {
        if let Some(host) = self.host() {
            dom::set_pointer_capture(host, pointer_id);
        }
    }

    fn supports_pointer_events(&self) -> bool {
        dom::platform().supports_pointer_events
    }

    fn emit_change_event(&self, value: f64, thumb: ThumbPosition) {
        self.notify_value(EventType::Change, value, thumb);
    }

    fn emit_input_event(&self, value: f64, thumb: ThumbPosition) {
        self.notify_value(EventType::Input, value, thumb);
    }

    fn emit_drag_start_event(&self, value: f64, thumb: ThumbPosition) {
        self.notify_drag(value, thumb, true);
    }

    fn emit_drag_end_event(&self, value: f64, thumb: ThumbPosition) {
        self.notify_drag(value, thumb, false);
    }

    fn register_event_handler(&self, event_type: EventType, handler: EventHandler) -> Registration {
        self.listen(self.host(), event_type, handler)
    }

    fn deregister_event_handler(&self, registration: Registration) {
        self.unlisten(registration);
    }

    fn register_thumb_event_handler(
        &self,
        thumb: ThumbPosition,
        event_type: EventType,
        handler: EventHandler,
    ) -> Registration {
        self.listen(self.thumb_el(thumb), event_type, handler)
    }

    fn deregister_thumb_event_handler(&self, _thumb: ThumbPosition, registration: Registration) {
        self.unlisten(registration);
    }

    /// Native `change` never reaches input listeners: the shared capture listener
    /// stops it at the root. The handler is kept here and called from there.
    fn register_input_event_handler(
        &self,
        thumb: ThumbPosition,
        event_type: EventType,
        handler: EventHandler,
    ) -> Registration {
        if event_type == EventType::Change {
            if let Some(inner) = self.inner() {
                inner.change_handlers.borrow_mut()[thumb.slot()] = Some(handler);
                return Registration::ChangeHandler(thumb);
            }
            return Registration::Detached;
        }
        self.listen(self.input_el(thumb), event_type, handler)
    }

    fn deregister_input_event_handler(&self, _thumb: ThumbPosition, registration: Registration) {
        self.unlisten(registration);
    }

    fn register_body_event_handler(&self, event_type: EventType, handler: EventHandler) -> Registration {
        self.listen(Some(dom::body()), event_type, handler)
    }

    fn deregister_body_event_handler(&self, registration: Registration) {
        self.unlisten(registration);
    }

    fn register_window_event_handler(&self, event_type: EventType, handler: EventHandler) -> Registration {
        self.listen(Some(dom::window()), event_type, handler)
    }

    fn deregister_window_event_handler(&self, registration: Registration) {
        self.unlisten(registration);
    }
}
