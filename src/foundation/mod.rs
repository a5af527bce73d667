//! Slider Foundation - Headless gesture and geometry state machine.
//!
//! The foundation owns everything about a slider that does not depend on how it
//! is rendered:
//! - initial state read from the inputs and validated
//! - value quantization and clamping (including the start <= end invariant)
//! - pointer / mouse / touch drag interpretation
//! - thumb, track, value indicator and tick mark UI updates
//! - focus, hover and disabled styling
//!
//! It reaches the world only through a [`SliderAdapter`].
//!
//! # Lifecycle
//!
//! ```ignore
//! let foundation = SliderFoundation::new(adapter);
//! foundation.init()?;      // read + validate + register handlers
//! foundation.layout(false); // measure + paint
//! // ... user interaction ...
//! foundation.destroy();    // deregister every handler
//! ```

pub mod adapter;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, trace};

use crate::dom::{Event, EventHandler, EventType};
use crate::error::{Result, SliderError};
use crate::types::{coerce_number, coerce_number_or, decimal_places, format_number, quantize, Rect, ThumbPosition, TickMark};

pub use adapter::{InputAttribute, InputAttributeName, Registration, SliderAdapter};

/// Class names the foundation reads and writes.
pub mod classes {
    pub const DISABLED: &str = "slider--disabled";
    pub const DISCRETE: &str = "slider--discrete";
    pub const RANGE: &str = "slider--range";
    pub const TICK_MARKS: &str = "slider--tick-marks";
    pub const THUMB_FOCUSED: &str = "slider__thumb--focused";
    pub const THUMB_TOP: &str = "slider__thumb--top";
    pub const THUMB_WITH_INDICATOR: &str = "slider__thumb--with-indicator";
}

/// Root attribute holding the minimum distance between range thumbs.
pub const MIN_RANGE_ATTRIBUTE: &str = "data-min-range";

/// Horizontal distance a pointer must travel before overlapping thumbs pick a side.
pub const THUMB_UPDATE_MIN_PX: f64 = 5.0;

const STEP_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Thumb(ThumbPosition),
    Input(ThumbPosition),
    Body,
    Window,
}

// =============================================================================
// FOUNDATION
// =============================================================================

/// Headless slider state machine.
pub struct SliderFoundation {
    adapter: Rc<dyn SliderAdapter>,
    weak_self: Weak<SliderFoundation>,

    min: Cell<f64>,
    max: Cell<f64>,
    step: Cell<f64>,
    min_range: Cell<f64>,
    value: Cell<f64>,
    value_start: Cell<f64>,
    num_decimal_places: Cell<usize>,

    is_range: Cell<bool>,
    is_discrete: Cell<bool>,
    has_tick_marks: Cell<bool>,
    is_disabled: Cell<bool>,
    initialized: Cell<bool>,

    rect: Cell<Rect>,
    start_knob_width: Cell<f64>,
    end_knob_width: Cell<f64>,

    // Gesture state
    thumb: Cell<Option<ThumbPosition>>,
    down_client_x: Cell<Option<f64>>,
    value_before_down: Cell<f64>,
    value_start_before_down: Cell<f64>,

    registrations: RefCell<Vec<(Scope, Registration)>>,
    gesture_registrations: RefCell<Vec<(Scope, Registration)>>,
}

impl SliderFoundation {
    pub fn new(adapter: Rc<dyn SliderAdapter>) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            adapter,
            weak_self: weak_self.clone(),
            min: Cell::new(0.0),
            max: Cell::new(100.0),
            step: Cell::new(1.0),
            min_range: Cell::new(0.0),
            value: Cell::new(0.0),
            value_start: Cell::new(0.0),
            num_decimal_places: Cell::new(0),
            is_range: Cell::new(false),
            is_discrete: Cell::new(false),
            has_tick_marks: Cell::new(false),
            is_disabled: Cell::new(false),
            initialized: Cell::new(false),
            rect: Cell::new(Rect::default()),
            start_knob_width: Cell::new(0.0),
            end_knob_width: Cell::new(0.0),
            thumb: Cell::new(None),
            down_client_x: Cell::new(None),
            value_before_down: Cell::new(0.0),
            value_start_before_down: Cell::new(0.0),
            registrations: RefCell::new(Vec::new()),
            gesture_registrations: RefCell::new(Vec::new()),
        })
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Read initial state from the root and inputs, validate it, register handlers
    /// and write the initial UI.
    ///
    /// On error nothing is registered and the foundation stays uninitialized.
    pub fn init(&self) -> Result<()> {
        let a = &self.adapter;
        let is_range = a.has_class(classes::RANGE);
        let min_thumb = if is_range { ThumbPosition::Start } else { ThumbPosition::End };

        let read = |name: InputAttributeName, thumb: ThumbPosition| {
            coerce_number(a.get_input_attribute(name, thumb).as_deref())
        };
        let min = read(InputAttributeName::Min, min_thumb);
        let max = read(InputAttributeName::Max, ThumbPosition::End);
        let value = read(InputAttributeName::Value, ThumbPosition::End);
        let value_start = if is_range { read(InputAttributeName::Value, ThumbPosition::Start) } else { min };
        let step = coerce_number_or(
            a.get_input_attribute(InputAttributeName::Step, ThumbPosition::End).as_deref(),
            1.0,
        );
        let min_range = coerce_number(a.get_attribute(MIN_RANGE_ATTRIBUTE).as_deref());

        validate_properties(&Properties { min, max, step, value, value_start, min_range, is_range })?;

        self.is_range.set(is_range);
        self.is_disabled.set(a.has_class(classes::DISABLED));
        self.is_discrete.set(a.has_class(classes::DISCRETE));
        self.has_tick_marks.set(a.has_class(classes::TICK_MARKS));
        self.min.set(min);
        self.max.set(max);
        self.step.set(step);
        self.min_range.set(min_range);
        self.value.set(value);
        self.value_start.set(value_start);
        self.num_decimal_places.set(decimal_places(step));
        self.value_before_down.set(value);
        self.value_start_before_down.set(value_start);
        self.thumb.set(None);
        self.down_client_x.set(None);

        self.register_event_handlers();
        self.initialized.set(true);
        debug!(
            "foundation: init range={is_range} min={min} max={max} step={step} value_start={value_start} value={value}"
        );

        self.update_ui(None);
        Ok(())
    }

    /// Measure the host and thumb knobs, then repaint unless told otherwise.
    pub fn layout(&self, skip_update_ui: bool) {
        self.rect.set(self.adapter.get_bounding_client_rect());
        if self.is_range.get() {
            self.start_knob_width.set(self.adapter.get_thumb_knob_width(ThumbPosition::Start));
            self.end_knob_width.set(self.adapter.get_thumb_knob_width(ThumbPosition::End));
        }
        trace!("foundation: layout width={}", self.rect.get().width);
        if !skip_update_ui {
            self.update_ui(None);
        }
    }

    /// Deregister every handler. The foundation may be initialized again afterwards.
    pub fn destroy(&self) {
        let registrations: Vec<(Scope, Registration)> = self
            .registrations
            .borrow_mut()
            .drain(..)
            .chain(self.gesture_registrations.borrow_mut().drain(..))
            .collect();
        for (scope, registration) in registrations {
            self.deregister(scope, registration);
        }
        self.thumb.set(None);
        self.initialized.set(false);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn value_start(&self) -> f64 {
        self.value_start.get()
    }

    pub fn min(&self) -> f64 {
        self.min.get()
    }

    pub fn max(&self) -> f64 {
        self.max.get()
    }

    pub fn step(&self) -> f64 {
        self.step.get()
    }

    pub fn min_range(&self) -> f64 {
        self.min_range.get()
    }

    pub fn is_range(&self) -> bool {
        self.is_range.get()
    }

    pub fn is_discrete(&self) -> bool {
        self.is_discrete.get()
    }

    pub fn is_disabled(&self) -> bool {
        self.is_disabled.get()
    }

    /// Thumb currently being dragged.
    pub fn active_thumb(&self) -> Option<ThumbPosition> {
        self.thumb.get()
    }

    fn thumb_value(&self, thumb: ThumbPosition) -> f64 {
        if self.is_range.get() && thumb == ThumbPosition::Start {
            self.value_start.get()
        } else {
            self.value.get()
        }
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    /// Set the end (or only) thumb value. Quantized, then clamped into range and
    /// against the start thumb. Does not emit change events.
    pub fn set_value(&self, value: f64) {
        let value = self.quantize(value);
        self.update_value(value, ThumbPosition::End, false);
    }

    /// Set the start thumb value of a range slider. Ignored for single sliders.
    pub fn set_value_start(&self, value: f64) {
        if !self.is_range.get() {
            debug!("foundation: set_value_start ignored on a single-thumb slider");
            return;
        }
        let value = self.quantize(value);
        self.update_value(value, ThumbPosition::Start, false);
    }

    /// Push disabled state to the root and inputs.
    pub fn set_disabled(&self, disabled: bool) {
        self.is_disabled.set(disabled);
        let a = &self.adapter;
        if disabled {
            a.add_class(classes::DISABLED);
        } else {
            a.remove_class(classes::DISABLED);
        }
        for thumb in self.thumbs() {
            if disabled {
                a.set_input_attribute(InputAttribute::Disabled, thumb);
            } else {
                a.remove_input_attribute(InputAttributeName::Disabled, thumb);
            }
        }
    }

    fn quantize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min.get();
        }
        quantize(value, self.min.get(), self.step.get())
    }

    /// Clamp into [min, max], then against the peer thumb.
    fn clamp_value(&self, value: f64, thumb: ThumbPosition) -> f64 {
        let value = value.clamp(self.min.get(), self.max.get());
        if !self.is_range.get() {
            return value;
        }
        let min_range = self.min_range.get();
        match thumb {
            ThumbPosition::Start if value > self.value.get() - min_range => self.value.get() - min_range,
            ThumbPosition::End if value < self.value_start.get() + min_range => {
                self.value_start.get() + min_range
            }
            _ => value,
        }
    }

    fn update_value(&self, value: f64, thumb: ThumbPosition, emit_input_event: bool) {
        let value = self.clamp_value(value, thumb);
        let slot = if self.is_range.get() && thumb == ThumbPosition::Start {
            &self.value_start
        } else {
            &self.value
        };
        if slot.get() == value {
            return;
        }
        slot.set(value);
        self.update_ui(Some(thumb));
        if emit_input_event {
            self.adapter.emit_input_event(value, thumb);
        }
    }

    fn thumbs(&self) -> Vec<ThumbPosition> {
        if self.is_range.get() {
            vec![ThumbPosition::Start, ThumbPosition::End]
        } else {
            vec![ThumbPosition::End]
        }
    }

    // =========================================================================
    // EVENT HANDLERS
    // =========================================================================

    fn handler<F>(&self, f: F) -> EventHandler
    where
        F: Fn(&SliderFoundation, &Event) + 'static,
    {
        let weak = self.weak_self.clone();
        Rc::new(move |event: &Event| {
            if let Some(this) = weak.upgrade() {
                f(&this, event);
            }
        })
    }

    fn register(&self, scope: Scope, event_type: EventType, handler: EventHandler) -> (Scope, Registration) {
        let a = &self.adapter;
        let registration = match scope {
            Scope::Root => a.register_event_handler(event_type, handler),
            Scope::Thumb(thumb) => a.register_thumb_event_handler(thumb, event_type, handler),
            Scope::Input(thumb) => a.register_input_event_handler(thumb, event_type, handler),
            Scope::Body => a.register_body_event_handler(event_type, handler),
            Scope::Window => a.register_window_event_handler(event_type, handler),
        };
        (scope, registration)
    }

    fn deregister(&self, scope: Scope, registration: Registration) {
        let a = &self.adapter;
        match scope {
            Scope::Root => a.deregister_event_handler(registration),
            Scope::Thumb(thumb) => a.deregister_thumb_event_handler(thumb, registration),
            Scope::Input(thumb) => a.deregister_input_event_handler(thumb, registration),
            Scope::Body => a.deregister_body_event_handler(registration),
            Scope::Window => a.deregister_window_event_handler(registration),
        }
    }

    fn register_event_handlers(&self) {
        let mut regs = Vec::new();

        regs.push(self.register(Scope::Window, EventType::Resize, self.handler(|f, _| f.layout(false))));

        if self.adapter.supports_pointer_events() {
            regs.push(self.register(Scope::Root, EventType::PointerDown, self.handler(|f, e| f.handle_pointer_down(e))));
            regs.push(self.register(Scope::Root, EventType::PointerUp, self.handler(|f, _| f.handle_pointer_up())));
        } else {
            regs.push(self.register(Scope::Root, EventType::MouseDown, self.handler(|f, e| f.handle_mouse_or_touch_start(e))));
            regs.push(self.register(Scope::Root, EventType::TouchStart, self.handler(|f, e| f.handle_mouse_or_touch_start(e))));
        }

        if self.is_range.get() {
            for thumb in [ThumbPosition::Start, ThumbPosition::End] {
                regs.push(self.register(
                    Scope::Thumb(thumb),
                    EventType::MouseEnter,
                    self.handler(move |f, _| f.handle_thumb_mouseenter(thumb)),
                ));
                regs.push(self.register(
                    Scope::Thumb(thumb),
                    EventType::MouseLeave,
                    self.handler(move |f, _| f.handle_thumb_mouseleave(thumb)),
                ));
            }
        }

        for thumb in self.thumbs() {
            regs.push(self.register(
                Scope::Input(thumb),
                EventType::Change,
                self.handler(move |f, _| f.handle_input_change(thumb)),
            ));
            regs.push(self.register(
                Scope::Input(thumb),
                EventType::Focus,
                self.handler(move |f, _| f.handle_input_focus(thumb)),
            ));
            regs.push(self.register(
                Scope::Input(thumb),
                EventType::Blur,
                self.handler(move |f, _| f.handle_input_blur(thumb)),
            ));
        }

        self.registrations.borrow_mut().extend(regs);
    }

    fn clear_gesture_handlers(&self) {
        let registrations: Vec<(Scope, Registration)> = self.gesture_registrations.borrow_mut().drain(..).collect();
        for (scope, registration) in registrations {
            self.deregister(scope, registration);
        }
    }

    fn handle_pointer_down(&self, event: &Event) {
        if let Some(pointer_id) = event.pointer_id {
            self.adapter.set_pointer_capture(pointer_id);
        }
        self.clear_gesture_handlers();
        let reg = self.register(Scope::Root, EventType::PointerMove, self.handler(|f, e| f.handle_move(e)));
        self.gesture_registrations.borrow_mut().push(reg);
        self.handle_down(event);
    }

    fn handle_pointer_up(&self) {
        self.handle_up();
        self.clear_gesture_handlers();
    }

    fn handle_mouse_or_touch_start(&self, event: &Event) {
        self.clear_gesture_handlers();
        let regs = if event.event_type() == EventType::MouseDown {
            vec![
                self.register(Scope::Body, EventType::MouseMove, self.handler(|f, e| f.handle_move(e))),
                self.register(Scope::Body, EventType::MouseUp, self.handler(|f, _| f.handle_gesture_end())),
            ]
        } else {
            vec![
                self.register(Scope::Root, EventType::TouchMove, self.handler(|f, e| f.handle_move(e))),
                self.register(Scope::Root, EventType::TouchEnd, self.handler(|f, _| f.handle_gesture_end())),
            ]
        };
        self.gesture_registrations.borrow_mut().extend(regs);
        self.handle_down(event);
    }

    fn handle_gesture_end(&self) {
        self.handle_up();
        self.clear_gesture_handlers();
    }

    // =========================================================================
    // GESTURES
    // =========================================================================

    /// Start of a pointer gesture at `event.client_x`.
    pub fn handle_down(&self, event: &Event) {
        if self.is_disabled.get() {
            return;
        }
        self.value_start_before_down.set(self.value_start.get());
        self.value_before_down.set(self.value.get());

        let client_x = event.client_x;
        self.down_client_x.set(Some(client_x));
        let value = self.map_client_x_on_slider_scale(client_x);

        self.thumb.set(self.thumb_from_down_event(client_x, value));
        let Some(thumb) = self.thumb.get() else {
            // Both knobs under the pointer: the first move decides
            return;
        };
        self.handle_drag_start(value, thumb);
        self.update_value(value, thumb, true);
    }

    /// Pointer moved while down.
    pub fn handle_move(&self, event: &Event) {
        if self.is_disabled.get() {
            return;
        }
        event.prevent_default();

        let client_x = event.client_x;
        let drag_already_started = self.thumb.get().is_some();
        let Some(thumb) = self.thumb_from_move_event(client_x) else {
            return;
        };
        self.thumb.set(Some(thumb));

        let value = self.map_client_x_on_slider_scale(client_x);
        if !drag_already_started {
            self.handle_drag_start(value, thumb);
        }
        self.update_value(value, thumb, true);
    }

    /// End of a gesture. Change is only emitted when the value actually moved.
    pub fn handle_up(&self) {
        if self.is_disabled.get() {
            return;
        }
        let Some(thumb) = self.thumb.get() else {
            return;
        };
        let old_value = if thumb == ThumbPosition::Start {
            self.value_start_before_down.get()
        } else {
            self.value_before_down.get()
        };
        let new_value = self.thumb_value(thumb);
        if old_value != new_value {
            self.adapter.emit_change_event(new_value, thumb);
        }
        self.adapter.emit_drag_end_event(new_value, thumb);
        self.thumb.set(None);
        self.down_client_x.set(None);
    }

    fn handle_drag_start(&self, value: f64, thumb: ThumbPosition) {
        self.adapter.focus_input(thumb);
        self.adapter.emit_drag_start_event(value, thumb);
    }

    fn thumb_from_down_event(&self, client_x: f64, value: f64) -> Option<ThumbPosition> {
        if !self.is_range.get() {
            return Some(ThumbPosition::End);
        }

        let start_rect = self.adapter.get_thumb_bounding_client_rect(ThumbPosition::Start);
        let end_rect = self.adapter.get_thumb_bounding_client_rect(ThumbPosition::End);
        let within_start = start_rect.contains_x(client_x);
        let within_end = end_rect.contains_x(client_x);

        match (within_start, within_end) {
            (true, true) => return None,
            (true, false) => return Some(ThumbPosition::Start),
            (false, true) => return Some(ThumbPosition::End),
            (false, false) => {}
        }

        let (start, end) = (self.value_start.get(), self.value.get());
        if value < start {
            return Some(ThumbPosition::Start);
        }
        if value > end {
            return Some(ThumbPosition::End);
        }
        // Between the thumbs: nearest wins, ties go to start
        if value - start <= end - value {
            Some(ThumbPosition::Start)
        } else {
            Some(ThumbPosition::End)
        }
    }

    fn thumb_from_move_event(&self, client_x: f64) -> Option<ThumbPosition> {
        if let Some(thumb) = self.thumb.get() {
            return Some(thumb);
        }
        let down_x = self.down_client_x.get()?;
        if (down_x - client_x).abs() < THUMB_UPDATE_MIN_PX {
            return None;
        }

        let dragged_left = client_x < down_x;
        let rtl = self.adapter.is_rtl();
        Some(match (dragged_left, rtl) {
            (true, false) | (false, true) => ThumbPosition::Start,
            (true, true) | (false, false) => ThumbPosition::End,
        })
    }

    /// Map a client x coordinate onto the value scale, quantized.
    fn map_client_x_on_slider_scale(&self, client_x: f64) -> f64 {
        let rect = self.rect.get();
        let (min, max) = (self.min.get(), self.max.get());
        if rect.width <= 0.0 {
            return min;
        }
        let mut pct = (client_x - rect.left) / rect.width;
        if self.adapter.is_rtl() {
            pct = 1.0 - pct;
        }
        let value = min + pct * (max - min);
        if value == max || value == min {
            return value;
        }
        crate::types::round_to(self.quantize(value), self.num_decimal_places.get())
    }

    // =========================================================================
    // INPUT / THUMB EVENTS
    // =========================================================================

    /// A native `change` on an input. Routes through the clamping setters, then
    /// notifies.
    pub fn handle_input_change(&self, thumb: ThumbPosition) {
        let raw = self.adapter.get_input_value(thumb);
        let value = coerce_number(Some(raw.as_str()));
        if thumb == ThumbPosition::Start {
            self.set_value_start(value);
        } else {
            self.set_value(value);
        }
        let value = self.thumb_value(thumb);
        self.adapter.emit_change_event(value, thumb);
        self.adapter.emit_input_event(value, thumb);
    }

    pub fn handle_input_focus(&self, thumb: ThumbPosition) {
        self.adapter.add_thumb_class(classes::THUMB_FOCUSED, thumb);
        if !self.is_discrete.get() {
            return;
        }
        self.adapter.add_thumb_class(classes::THUMB_WITH_INDICATOR, thumb);
        if self.is_range.get() {
            self.adapter.add_thumb_class(classes::THUMB_WITH_INDICATOR, thumb.peer());
        }
    }

    pub fn handle_input_blur(&self, thumb: ThumbPosition) {
        self.adapter.remove_thumb_class(classes::THUMB_FOCUSED, thumb);
        if !self.is_discrete.get() {
            return;
        }
        self.adapter.remove_thumb_class(classes::THUMB_WITH_INDICATOR, thumb);
        if self.is_range.get() {
            self.adapter.remove_thumb_class(classes::THUMB_WITH_INDICATOR, thumb.peer());
        }
    }

    fn handle_thumb_mouseenter(&self, thumb: ThumbPosition) {
        self.adapter.add_thumb_class(classes::THUMB_TOP, thumb);
        self.adapter.remove_thumb_class(classes::THUMB_TOP, thumb.peer());
        if self.is_discrete.get() {
            self.adapter.add_thumb_class(classes::THUMB_WITH_INDICATOR, thumb);
            self.adapter.add_thumb_class(classes::THUMB_WITH_INDICATOR, thumb.peer());
        }
    }

    fn handle_thumb_mouseleave(&self, thumb: ThumbPosition) {
        if !self.is_discrete.get()
            || self.adapter.is_input_focused(thumb)
            || self.adapter.is_input_focused(thumb.peer())
        {
            return;
        }
        self.adapter.remove_thumb_class(classes::THUMB_WITH_INDICATOR, thumb);
        self.adapter.remove_thumb_class(classes::THUMB_WITH_INDICATOR, thumb.peer());
    }

    // =========================================================================
    // UI
    // =========================================================================

    fn update_ui(&self, thumb: Option<ThumbPosition>) {
        match thumb {
            Some(thumb) => self.update_thumb_and_input_attributes(thumb),
            None => {
                for thumb in self.thumbs() {
                    self.update_thumb_and_input_attributes(thumb);
                }
            }
        }
        self.update_thumb_and_track_ui(thumb);
        self.update_value_indicator_ui(thumb);
        self.update_tick_marks_ui();
    }

    fn update_thumb_and_input_attributes(&self, thumb: ThumbPosition) {
        let a = &self.adapter;
        let value = self.thumb_value(thumb);
        let value_str = format_number(value);

        a.set_input_attribute(InputAttribute::Value(value), thumb);
        if self.is_range.get() {
            let min_range = self.min_range.get();
            match thumb {
                ThumbPosition::Start => a.set_input_attribute(InputAttribute::Min(value + min_range), ThumbPosition::End),
                ThumbPosition::End => a.set_input_attribute(InputAttribute::Max(value - min_range), ThumbPosition::Start),
            }
        }
        if a.get_input_value(thumb) != value_str {
            a.set_input_value(&value_str, thumb);
        }
        if let Some(text) = a.value_to_aria_value_text(value, thumb) {
            a.set_input_attribute(InputAttribute::AriaValueText(text), thumb);
        }
    }

    fn update_thumb_and_track_ui(&self, thumb: Option<ThumbPosition>) {
        let a = &self.adapter;
        let (min, max) = (self.min.get(), self.max.get());
        let span = max - min;
        let width = self.rect.get().width;
        let pct_complete = (self.value.get() - self.value_start.get()) / span;
        let range_px = pct_complete * width;
        let rtl = a.is_rtl();
        let scale = format!("scaleX({})", format_number(pct_complete));

        if !self.is_range.get() {
            a.set_track_active_style_property("transform", &scale);
            let pos = if rtl { width - range_px } else { range_px };
            a.set_thumb_style_property("transform", &translate_x(pos), ThumbPosition::End);
            self.align_value_indicator(ThumbPosition::End, pos);
            return;
        }

        let thumb_left = if rtl {
            (max - self.value.get()) / span * width
        } else {
            (self.value_start.get() - min) / span * width
        };
        let thumb_right = thumb_left + range_px;

        let animates_from_right = if rtl {
            thumb != Some(ThumbPosition::Start)
        } else {
            thumb == Some(ThumbPosition::Start)
        };
        if animates_from_right {
            a.set_track_active_style_property("transform-origin", "right");
            a.set_track_active_style_property("left", "auto");
            a.set_track_active_style_property("right", &px(width - thumb_right));
        } else {
            a.set_track_active_style_property("transform-origin", "left");
            a.set_track_active_style_property("right", "auto");
            a.set_track_active_style_property("left", &px(thumb_left));
        }
        a.set_track_active_style_property("transform", &scale);

        let start_pos = if rtl { thumb_right } else { thumb_left };
        let end_pos = if rtl { thumb_left } else { thumb_right };
        if thumb != Some(ThumbPosition::End) {
            a.set_thumb_style_property("transform", &translate_x(start_pos), ThumbPosition::Start);
            self.align_value_indicator(ThumbPosition::Start, start_pos);
        }
        if thumb != Some(ThumbPosition::Start) {
            a.set_thumb_style_property("transform", &translate_x(end_pos), ThumbPosition::End);
            self.align_value_indicator(ThumbPosition::End, end_pos);
        }
        self.update_overlapping_thumbs_ui(start_pos, end_pos, thumb);
    }

    /// Keep the value indicator inside the slider near either edge.
    fn align_value_indicator(&self, thumb: ThumbPosition, thumb_pos: f64) {
        if !self.is_discrete.get() {
            return;
        }
        let a = &self.adapter;
        let half_thumb = a.get_thumb_bounding_client_rect(thumb).width / 2.0;
        let half_container = a.get_value_indicator_container_width(thumb) / 2.0;
        let slider_width = self.rect.get().width;

        let half_thumb_px = px(half_thumb);
        let half_thumb_px = half_thumb_px.as_str();
        let styles: [(&str, &str); 6] = if half_container > thumb_pos + half_thumb {
            [
                ("--value-indicator-caret-left", half_thumb_px),
                ("--value-indicator-caret-right", "auto"),
                ("--value-indicator-caret-transform", "translateX(-50%)"),
                ("--value-indicator-container-left", "0"),
                ("--value-indicator-container-right", "auto"),
                ("--value-indicator-container-transform", "none"),
            ]
        } else if half_container > slider_width - thumb_pos + half_thumb {
            [
                ("--value-indicator-caret-left", "auto"),
                ("--value-indicator-caret-right", half_thumb_px),
                ("--value-indicator-caret-transform", "translateX(50%)"),
                ("--value-indicator-container-left", "auto"),
                ("--value-indicator-container-right", "0"),
                ("--value-indicator-container-transform", "none"),
            ]
        } else {
            [
                ("--value-indicator-caret-left", "50%"),
                ("--value-indicator-caret-right", "auto"),
                ("--value-indicator-caret-transform", "translateX(-50%)"),
                ("--value-indicator-container-left", "50%"),
                ("--value-indicator-container-right", "auto"),
                ("--value-indicator-container-transform", "translateX(-50%)"),
            ]
        };
        for (property, value) in styles {
            a.set_thumb_style_property(property, value, thumb);
        }
    }

    /// Raise the moving thumb when the knobs overlap.
    fn update_overlapping_thumbs_ui(&self, start_pos: f64, end_pos: f64, thumb: Option<ThumbPosition>) {
        let half_start = self.start_knob_width.get() / 2.0;
        let half_end = self.end_knob_width.get() / 2.0;
        let overlap = if self.adapter.is_rtl() {
            end_pos + half_end >= start_pos - half_start
        } else {
            start_pos + half_start >= end_pos - half_end
        };

        if overlap {
            let top = thumb.unwrap_or(ThumbPosition::End);
            self.adapter.add_thumb_class(classes::THUMB_TOP, top);
            self.adapter.remove_thumb_class(classes::THUMB_TOP, top.peer());
        } else {
            self.adapter.remove_thumb_class(classes::THUMB_TOP, ThumbPosition::Start);
            self.adapter.remove_thumb_class(classes::THUMB_TOP, ThumbPosition::End);
        }
    }

    fn update_value_indicator_ui(&self, thumb: Option<ThumbPosition>) {
        if !self.is_discrete.get() {
            return;
        }
        let target = if thumb == Some(ThumbPosition::Start) { ThumbPosition::Start } else { ThumbPosition::End };
        self.adapter.set_value_indicator_text(self.thumb_value(target), target);
        if thumb.is_none() && self.is_range.get() {
            self.adapter.set_value_indicator_text(self.value_start.get(), ThumbPosition::Start);
        }
    }

    fn update_tick_marks_ui(&self) {
        if !self.is_discrete.get() || !self.has_tick_marks.get() {
            return;
        }
        self.adapter.update_tick_marks(self.tick_marks());
    }

    /// One mark per step: inactive before start, active from start to end,
    /// inactive after end.
    pub fn tick_marks(&self) -> Vec<TickMark> {
        let step = self.step.get();
        let count = |span: f64| (span / step).round().max(0.0) as usize;
        let inactive_start = if self.is_range.get() { count(self.value_start.get() - self.min.get()) } else { 0 };
        let active = count(self.value.get() - self.value_start.get()) + 1;
        let inactive_end = count(self.max.get() - self.value.get());

        let mut marks = Vec::with_capacity(inactive_start + active + inactive_end);
        marks.extend(std::iter::repeat_n(TickMark::Inactive, inactive_start));
        marks.extend(std::iter::repeat_n(TickMark::Active, active));
        marks.extend(std::iter::repeat_n(TickMark::Inactive, inactive_end));
        marks
    }
}

fn px(value: f64) -> String {
    format!("{}px", format_number(value))
}

fn translate_x(value: f64) -> String {
    format!("translateX({})", px(value))
}

// =============================================================================
// VALIDATION
// =============================================================================

struct Properties {
    min: f64,
    max: f64,
    step: f64,
    value: f64,
    value_start: f64,
    min_range: f64,
    is_range: bool,
}

fn illegal_for_step(value: f64, min: f64, step: f64) -> bool {
    let steps = (value - min) / step;
    (steps - steps.round()).abs() > STEP_TOLERANCE
}

fn validate_properties(p: &Properties) -> Result<()> {
    let fail = |message: String| Err(SliderError::Foundation(message));

    if p.min >= p.max {
        return fail(format!("min must be strictly less than max (min: {}, max: {})", p.min, p.max));
    }
    if p.step <= 0.0 {
        return fail(format!("step must be a positive number (step: {})", p.step));
    }

    if p.is_range {
        if p.value < p.min || p.value > p.max || p.value_start < p.min || p.value_start > p.max {
            return fail(format!(
                "values must be in [min, max] (start: {}, end: {}, min: {}, max: {})",
                p.value_start, p.value, p.min, p.max
            ));
        }
        if p.value_start > p.value {
            return fail(format!("start value must be <= end value (start: {}, end: {})", p.value_start, p.value));
        }
        if p.min_range < 0.0 || p.min_range > p.max - p.min {
            return fail(format!("min range must be within [0, max - min] (min range: {})", p.min_range));
        }
        if p.value - p.value_start < p.min_range {
            return fail(format!(
                "start and end values must be at least min range apart (start: {}, end: {}, min range: {})",
                p.value_start, p.value, p.min_range
            ));
        }
        if illegal_for_step(p.value_start, p.min, p.step) || illegal_for_step(p.value, p.min, p.step) {
            return fail(format!(
                "values must be valid given the step (start: {}, end: {}, step: {})",
                p.value_start, p.value, p.step
            ));
        }
    } else {
        if p.value < p.min || p.value > p.max {
            return fail(format!("value must be in [min, max] (value: {}, min: {}, max: {})", p.value, p.min, p.max));
        }
        if illegal_for_step(p.value, p.min, p.step) {
            return fail(format!("value must be valid given the step (value: {}, step: {})", p.value, p.step));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
