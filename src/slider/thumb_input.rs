//! Thumb Input - One native range control, the source of truth for one thumb.
//!
//! The value lives in the input's `value` attribute. Before the slider is
//! initialized, writes go straight to the attribute. Afterwards they are routed
//! through the slider so the foundation can clamp them against the other thumb.
//!
//! Outgoing streams:
//! - `value_change` (f64)
//! - `drag_start` / `drag_end` ([`SliderDragEvent`])
//! - `focus` / `blur`

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::debug;

use crate::dom::{self, ElementId, Event, EventType, ListenerId, ListenerOptions, RangeBounds};
use crate::emitter::Emitter;
use crate::error::Result;
use crate::types::{coerce_number, format_number, ThumbPosition};

use super::container::{Slider, SliderInner};
use super::synthetic;

/// Marker attribute of the input of a single-thumb slider.
pub const THUMB_MARKER: &str = "slider-thumb";
/// Marker attribute of the start input of a range slider.
pub const START_THUMB_MARKER: &str = "slider-start-thumb";
/// Marker attribute of the end input of a range slider.
pub const END_THUMB_MARKER: &str = "slider-end-thumb";

/// Payload of the drag streams.
#[derive(Clone)]
pub struct SliderDragEvent {
    /// Input whose thumb is being dragged.
    pub source: Rc<ThumbInput>,
    /// Slider the thumb belongs to.
    pub parent: Slider,
    /// Value at the moment of the event.
    pub value: f64,
}

impl std::fmt::Debug for SliderDragEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliderDragEvent")
            .field("source", &self.source.position())
            .field("value", &self.value)
            .finish()
    }
}

type ChangeFn = Rc<dyn Fn(f64)>;
type TouchedFn = Rc<dyn Fn()>;

/// A native range input bound to a slider.
pub struct ThumbInput {
    host: ElementId,
    position: Cell<ThumbPosition>,
    slider: Weak<SliderInner>,

    value_change: Emitter<f64>,
    drag_start: Emitter<SliderDragEvent>,
    drag_end: Emitter<SliderDragEvent>,
    focus: Emitter<()>,
    blur: Emitter<()>,

    is_active: Cell<bool>,
    initial_value: RefCell<Option<String>>,
    on_change: RefCell<Option<ChangeFn>>,
    on_touched: RefCell<Option<TouchedFn>>,
    listeners: RefCell<Vec<ListenerId>>,
    destroyed: Cell<bool>,
}

impl ThumbInput {
    pub(crate) fn new(host: ElementId, position: ThumbPosition, slider: Weak<SliderInner>) -> Rc<Self> {
        Rc::new(Self {
            host,
            position: Cell::new(position),
            slider,
            value_change: Emitter::new(),
            drag_start: Emitter::new(),
            drag_end: Emitter::new(),
            focus: Emitter::new(),
            blur: Emitter::new(),
            is_active: Cell::new(false),
            initial_value: RefCell::new(None),
            on_change: RefCell::new(None),
            on_touched: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        })
    }

    /// Bind host focus/blur to the outgoing streams.
    pub(crate) fn attach_listeners(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let on_focus = dom::add_event_listener(
            self.host,
            EventType::Focus,
            ListenerOptions::NONE,
            Rc::new(move |_event: &Event| {
                if let Some(input) = weak.upgrade() {
                    input.focus.emit(&());
                }
            }),
        );
        let weak = Rc::downgrade(self);
        let on_blur = dom::add_event_listener(
            self.host,
            EventType::Blur,
            ListenerOptions::NONE,
            Rc::new(move |_event: &Event| {
                if let Some(input) = weak.upgrade() {
                    let touched = input.on_touched.borrow().clone();
                    if let Some(touched) = touched {
                        touched();
                    }
                    input.blur.emit(&());
                }
            }),
        );
        self.listeners.borrow_mut().extend([on_focus, on_blur]);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The input element.
    pub fn host(&self) -> ElementId {
        self.host
    }

    pub fn position(&self) -> ThumbPosition {
        self.position.get()
    }

    pub(crate) fn set_position(&self, position: ThumbPosition) {
        self.position.set(position);
    }

    /// Current value. Unparsable attributes read as 0.
    pub fn value(&self) -> f64 {
        coerce_number(dom::get_attribute(self.host, "value").as_deref())
    }

    /// Set the value.
    ///
    /// Before initialization this writes the attribute and records it as the initial
    /// value. Afterwards it goes through the slider, which clamps and quantizes.
    pub fn set_value(&self, value: f64) -> Result<()> {
        if self.destroyed.get() {
            return Ok(());
        }
        let value = if value.is_finite() { value } else { 0.0 };
        match self.slider.upgrade() {
            Some(inner) if inner.is_initialized() => Slider::from_inner(inner).set_value(value, self.position()),
            _ => {
                self.write_value_attribute(value);
                Ok(())
            }
        }
    }

    /// Write the value attribute without consulting the slider.
    pub(crate) fn write_value_attribute(&self, value: f64) {
        let text = format_number(value);
        dom::set_attribute(self.host, "value", &text);
        *self.initial_value.borrow_mut() = Some(text);
    }

    /// Value present when the input was attached (or last written before init).
    pub fn initial_value(&self) -> Option<String> {
        self.initial_value.borrow().clone()
    }

    /// Whether this input is the document's active element.
    pub fn is_focused(&self) -> bool {
        dom::active_element() == Some(self.host)
    }

    /// Whether the thumb is being dragged.
    pub fn is_active(&self) -> bool {
        self.is_active.get()
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.is_active.set(active);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    // =========================================================================
    // STREAMS
    // =========================================================================

    pub fn value_change(&self) -> &Emitter<f64> {
        &self.value_change
    }

    pub fn drag_start(&self) -> &Emitter<SliderDragEvent> {
        &self.drag_start
    }

    pub fn drag_end(&self) -> &Emitter<SliderDragEvent> {
        &self.drag_end
    }

    pub fn focus(&self) -> &Emitter<()> {
        &self.focus
    }

    pub fn blur(&self) -> &Emitter<()> {
        &self.blur
    }

    /// Form integration: called with the new value on every change.
    pub fn register_on_change<F>(&self, f: F)
    where
        F: Fn(f64) + 'static,
    {
        *self.on_change.borrow_mut() = Some(Rc::new(f));
    }

    /// Form integration: called when the input loses focus.
    pub fn register_on_touched<F>(&self, f: F)
    where
        F: Fn() + 'static,
    {
        *self.on_touched.borrow_mut() = Some(Rc::new(f));
    }

    pub(crate) fn call_on_change(&self, value: f64) {
        let on_change = self.on_change.borrow().clone();
        if let Some(on_change) = on_change {
            on_change(value);
        }
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Write the default value unless the input already has one.
    ///
    /// Single thumb and range start default to min, range end to max.
    pub(crate) fn initialize_input_value_attribute(&self) {
        if !dom::has_attribute(self.host, "value") {
            if let Some(inner) = self.slider.upgrade() {
                let config = inner.config();
                let default = if dom::has_attribute(self.host, END_THUMB_MARKER) { config.max } else { config.min };
                dom::set_attribute(self.host, "value", &format_number(default));
            }
        }
        *self.initial_value.borrow_mut() = dom::get_attribute(self.host, "value");
    }

    /// Write `aria-valuetext` from the slider's `display_with`.
    pub(crate) fn initialize_aria_value_text(&self) {
        if let Some(inner) = self.slider.upgrade() {
            let text = inner.display(self.value());
            dom::set_attribute(self.host, "aria-valuetext", &text);
        }
    }

    /// Snap the value attribute onto the `min`/`step` grid inside [min, max].
    ///
    /// Runs before any sibling bound is written so both thumbs share the grid
    /// anchored at `min`. Left alone when the bounds or step are unusable.
    pub(crate) fn snap_value_attribute(&self) {
        let Some(inner) = self.slider.upgrade() else {
            return;
        };
        let config = inner.config();
        let usable = config.min < config.max && config.step > 0.0;
        if !usable {
            return;
        }
        let bounds = RangeBounds { min: config.min, max: config.max, step: Some(config.step) };
        let raw = dom::get_attribute(self.host, "value");
        let snapped = format_number(bounds.sanitize(raw.as_deref()));
        if raw.as_deref() != Some(snapped.as_str()) {
            debug!("thumb input: value {:?} snapped to {snapped}", raw);
            dom::set_attribute(self.host, "value", &snapped);
        }
    }

    /// Push native min/max/step (and disabled).
    ///
    /// For a range slider the end input's min is the start value and the start
    /// input's max is the end value. Must run after the sibling's value attribute
    /// is final and before this input's value property is written, or the native
    /// control clamps the value against its default range.
    pub(crate) fn initialize_input_state(&self) {
        let Some(inner) = self.slider.upgrade() else {
            return;
        };
        let config = inner.config();
        let bound = |v: f64| v.max(config.min).min(config.max);
        let (mut min, mut max) = (config.min, config.max);

        if inner.is_range() {
            match self.position() {
                ThumbPosition::Start => {
                    if let Some(end) = inner.input(ThumbPosition::End) {
                        max = bound(end.value());
                    }
                }
                ThumbPosition::End => {
                    if let Some(start) = inner.input(ThumbPosition::Start) {
                        min = bound(start.value());
                    }
                }
            }
        }

        dom::set_attribute(self.host, "min", &format_number(min));
        dom::set_attribute(self.host, "max", &format_number(max));
        dom::set_attribute(self.host, "step", &format_number(config.step));
        if config.disabled {
            dom::set_attribute(self.host, "disabled", "");
        } else {
            dom::remove_attribute(self.host, "disabled");
        }
    }

    /// Copy the value attribute into the native value property, then write the
    /// sanitized result back so both agree.
    pub(crate) fn initialize_input_value_property(&self) {
        let raw = dom::get_attribute(self.host, "value").unwrap_or_default();
        dom::set_input_value(self.host, &raw);
        let sanitized = dom::input_value(self.host);
        dom::set_attribute(self.host, "value", &sanitized);
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Dispatch a `change` or `input` the shared capture listener will ignore.
    pub fn emit_fake_event(&self, event_type: EventType) {
        synthetic::dispatch_synthetic(&Event::new(event_type, self.host));
    }

    pub(crate) fn emit_drag(&self, source: Rc<ThumbInput>, parent: Slider, value: f64, start: bool) {
        let event = SliderDragEvent { source, parent, value };
        if start {
            self.drag_start.emit(&event);
        } else {
            self.drag_end.emit(&event);
        }
    }

    /// Remove host listeners and complete every stream.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        for id in self.listeners.borrow_mut().drain(..) {
            dom::remove_event_listener(id);
        }
        self.value_change.complete();
        self.drag_start.complete();
        self.drag_end.complete();
        self.focus.complete();
        self.blur.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SliderConfig;
    use crate::dom::reset_dom;
    use crate::multiplexer::reset_multiplexer;
    use crate::scheduler::reset_scheduler;
    use crate::slider::SliderOptions;
    use crate::types::Rect;

    fn setup() -> Slider {
        reset_dom();
        reset_scheduler();
        reset_multiplexer();
        let host = dom::create_element("div");
        dom::append_child(dom::body(), host);
        dom::set_bounding_rect(host, Rect::new(0.0, 0.0, 100.0, 48.0));
        Slider::new(
            host,
            SliderOptions { config: SliderConfig::with_range(0.0, 10.0, 1.0), ..SliderOptions::default() },
        )
    }

    fn thumb(slider: &Slider, marker: &str, value: Option<&str>) -> Rc<ThumbInput> {
        let el = dom::create_element("input");
        dom::set_attribute(el, marker, "");
        if let Some(value) = value {
            dom::set_attribute(el, "value", value);
        }
        slider.attach_input(el)
    }

    #[test]
    fn test_default_value_follows_marker() {
        let slider = setup();
        let start = thumb(&slider, START_THUMB_MARKER, None);
        let end = thumb(&slider, END_THUMB_MARKER, None);

        assert_eq!(start.position(), ThumbPosition::Start);
        assert_eq!(start.value(), 0.0);
        assert_eq!(end.value(), 10.0);
        assert_eq!(end.initial_value().as_deref(), Some("10"));
        assert_eq!(dom::get_attribute(end.host(), "aria-valuetext").as_deref(), Some("10"));
    }

    #[test]
    fn test_value_coercion() {
        let slider = setup();
        let input = thumb(&slider, THUMB_MARKER, Some("abc"));
        assert_eq!(input.value(), 0.0);

        input.set_value(f64::NAN).unwrap();
        assert_eq!(dom::get_attribute(input.host(), "value").as_deref(), Some("0"));
        input.set_value(7.0).unwrap();
        assert_eq!(input.value(), 7.0);
    }

    #[test]
    fn test_sibling_bound_clamped_into_range() {
        let slider = setup();
        let start = thumb(&slider, START_THUMB_MARKER, Some("2"));
        let end = thumb(&slider, END_THUMB_MARKER, Some("25"));

        start.initialize_input_state();
        assert_eq!(dom::get_attribute(start.host(), "max").as_deref(), Some("10"));

        end.initialize_input_state();
        assert_eq!(dom::get_attribute(end.host(), "min").as_deref(), Some("2"));
        end.initialize_input_value_property();
        assert_eq!(end.value(), 10.0);
    }

    #[test]
    fn test_blur_calls_touched_before_stream() {
        let slider = setup();
        let input = thumb(&slider, THUMB_MARKER, None);

        let log = Rc::new(RefCell::new(Vec::new()));
        let touched_log = log.clone();
        input.register_on_touched(move || touched_log.borrow_mut().push("touched"));
        let focus_log = log.clone();
        let _focus = input.focus().subscribe(move |_| focus_log.borrow_mut().push("focus"));
        let blur_log = log.clone();
        let _blur = input.blur().subscribe(move |_| blur_log.borrow_mut().push("blur"));

        dom::focus(input.host());
        assert!(input.is_focused());
        dom::blur(input.host());
        assert!(!input.is_focused());
        assert_eq!(*log.borrow(), vec!["focus", "touched", "blur"]);
    }

    #[test]
    fn test_destroy_completes_streams() {
        let slider = setup();
        let input = thumb(&slider, THUMB_MARKER, Some("3"));
        let _cleanup = input.value_change().subscribe(|_| {});

        input.destroy();
        input.destroy();
        assert!(input.is_destroyed());
        assert!(input.value_change().is_completed());
        assert!(input.drag_end().is_completed());
        assert_eq!(dom::listener_count(input.host(), EventType::Focus), 0);

        input.set_value(9.0).unwrap();
        assert_eq!(input.value(), 3.0);
    }
}
