//! Visual Thumb - The knob the user sees, and its ripples.
//!
//! One per thumb input. Listens to its input's drag and focus streams and to
//! hover on its own element, and shows hover/focus/active ripples accordingly.
//! Class changes on the thumb element belong to the foundation.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::dom::{self, ElementId, Event, EventType, ListenerId, ListenerOptions};
use crate::ripple::{RippleConfig, RippleLauncher, RippleRef};
use crate::scheduler;
use crate::types::ThumbPosition;

use super::container::SliderInner;
use super::thumb_input::{SliderDragEvent, ThumbInput};

pub const THUMB_CLASS: &str = "slider__thumb";
pub const KNOB_CLASS: &str = "slider__thumb-knob";
pub const VALUE_INDICATOR_CONTAINER_CLASS: &str = "slider__value-indicator-container";

const HOVER_RIPPLE: RippleConfig =
    RippleConfig { centered: true, persistent: true, enter_duration_ms: 0, exit_duration_ms: 0 };
const FOCUS_RIPPLE: RippleConfig = HOVER_RIPPLE;
const ACTIVE_RIPPLE: RippleConfig =
    RippleConfig { centered: true, persistent: true, enter_duration_ms: 225, exit_duration_ms: 400 };

fn is_showing(ripple: &RefCell<Option<RippleRef>>) -> bool {
    ripple.borrow().as_ref().is_some_and(|r| r.is_showing())
}

fn fade(ripple: &RefCell<Option<RippleRef>>) {
    let current = ripple.borrow().clone();
    if let Some(current) = current {
        current.fade_out();
    }
}

pub struct VisualThumb {
    position: ThumbPosition,
    host: ElementId,
    knob: ElementId,
    value_indicator_container: ElementId,
    slider: Weak<SliderInner>,
    launcher: Rc<dyn RippleLauncher>,

    hover_ripple: RefCell<Option<RippleRef>>,
    focus_ripple: RefCell<Option<RippleRef>>,
    active_ripple: RefCell<Option<RippleRef>>,

    is_hovered: Cell<bool>,
    is_active: Cell<bool>,
    input: RefCell<Weak<ThumbInput>>,

    listeners: RefCell<Vec<ListenerId>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    weak_self: Weak<VisualThumb>,
}

impl VisualThumb {
    /// Build the thumb elements under the slider host.
    pub(crate) fn new(slider: Weak<SliderInner>, position: ThumbPosition, launcher: Rc<dyn RippleLauncher>) -> Rc<Self> {
        let host = dom::create_element("div");
        dom::add_class(host, THUMB_CLASS);
        let value_indicator_container = dom::create_element("div");
        dom::add_class(value_indicator_container, VALUE_INDICATOR_CONTAINER_CLASS);
        dom::append_child(host, value_indicator_container);
        let knob = dom::create_element("div");
        dom::add_class(knob, KNOB_CLASS);
        dom::append_child(host, knob);
        if let Some(inner) = slider.upgrade() {
            dom::append_child(inner.host, host);
        }

        let thumb = Rc::new_cyclic(|weak_self| Self {
            position,
            host,
            knob,
            value_indicator_container,
            slider,
            launcher,
            hover_ripple: RefCell::new(None),
            focus_ripple: RefCell::new(None),
            active_ripple: RefCell::new(None),
            is_hovered: Cell::new(false),
            is_active: Cell::new(false),
            input: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            weak_self: weak_self.clone(),
        });
        thumb.listen_for_hover();
        thumb
    }

    fn listen_for_hover(&self) {
        let mut listeners = self.listeners.borrow_mut();
        for (event_type, hovered) in [(EventType::MouseEnter, true), (EventType::MouseLeave, false)] {
            let weak = self.weak_self.clone();
            let handler = Rc::new(move |_event: &Event| {
                if let Some(thumb) = weak.upgrade() {
                    if hovered { thumb.on_mouse_enter() } else { thumb.on_mouse_leave() }
                }
            });
            listeners.push(scheduler::run_outside(|| {
                dom::add_event_listener(self.host, event_type, ListenerOptions::NONE, handler)
            }));
        }
    }

    /// Follow the input's drag and focus streams.
    pub(crate) fn attach(&self, input: &Rc<ThumbInput>) {
        *self.input.borrow_mut() = Rc::downgrade(input);
        let mut cleanups = self.cleanups.borrow_mut();

        let weak = self.weak_self.clone();
        cleanups.push(Box::new(input.drag_start().subscribe(move |event: &SliderDragEvent| {
            if let Some(thumb) = weak.upgrade() {
                thumb.on_drag_start(event);
            }
        })));
        let weak = self.weak_self.clone();
        cleanups.push(Box::new(input.drag_end().subscribe(move |event: &SliderDragEvent| {
            if let Some(thumb) = weak.upgrade() {
                thumb.on_drag_end(event);
            }
        })));
        let weak = self.weak_self.clone();
        cleanups.push(Box::new(input.focus().subscribe(move |_: &()| {
            if let Some(thumb) = weak.upgrade() {
                thumb.on_focus();
            }
        })));
        let weak = self.weak_self.clone();
        cleanups.push(Box::new(input.blur().subscribe(move |_: &()| {
            let weak = weak.clone();
            // Focus may be moving to the other thumb; settle after the current task.
            scheduler::queue_microtask(move || {
                if let Some(thumb) = weak.upgrade() {
                    thumb.on_blur();
                }
            });
        })));
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn position(&self) -> ThumbPosition {
        self.position
    }

    pub fn host(&self) -> ElementId {
        self.host
    }

    pub fn knob(&self) -> ElementId {
        self.knob
    }

    pub fn value_indicator_container(&self) -> ElementId {
        self.value_indicator_container
    }

    pub fn is_hovered(&self) -> bool {
        self.is_hovered.get()
    }

    pub fn is_active(&self) -> bool {
        self.is_active.get()
    }

    pub fn hover_ripple(&self) -> Option<RippleRef> {
        self.hover_ripple.borrow().clone()
    }

    pub fn focus_ripple(&self) -> Option<RippleRef> {
        self.focus_ripple.borrow().clone()
    }

    pub fn active_ripple(&self) -> Option<RippleRef> {
        self.active_ripple.borrow().clone()
    }

    /// Any ripple fading in or visible.
    pub fn is_showing_any_ripple(&self) -> bool {
        is_showing(&self.hover_ripple) || is_showing(&self.focus_ripple) || is_showing(&self.active_ripple)
    }

    // =========================================================================
    // HANDLERS
    // =========================================================================

    fn on_mouse_enter(&self) {
        self.is_hovered.set(true);
        if !is_showing(&self.focus_ripple) {
            self.show_ripple(&self.hover_ripple, HOVER_RIPPLE);
        }
    }

    fn on_mouse_leave(&self) {
        self.is_hovered.set(false);
        fade(&self.hover_ripple);
    }

    fn on_focus(&self) {
        fade(&self.hover_ripple);
        self.show_ripple(&self.focus_ripple, FOCUS_RIPPLE);
    }

    fn on_blur(&self) {
        if !self.is_active.get() {
            fade(&self.focus_ripple);
        }
        if self.is_hovered.get() {
            self.show_ripple(&self.hover_ripple, HOVER_RIPPLE);
        }
    }

    fn on_drag_start(&self, event: &SliderDragEvent) {
        if event.source.position() != self.position {
            return;
        }
        self.is_active.set(true);
        self.show_ripple(&self.active_ripple, ACTIVE_RIPPLE);
    }

    fn on_drag_end(&self, event: &SliderDragEvent) {
        if event.source.position() != self.position {
            return;
        }
        self.is_active.set(false);
        fade(&self.active_ripple);
        let focused = self.input.borrow().upgrade().is_some_and(|input| input.is_focused());
        if !focused {
            fade(&self.focus_ripple);
        }
    }

    /// Disabling fades whatever is showing.
    pub(crate) fn on_disabled_change(&self, disabled: bool) {
        if disabled {
            fade(&self.hover_ripple);
            fade(&self.focus_ripple);
            fade(&self.active_ripple);
        }
    }

    fn show_ripple(&self, slot: &RefCell<Option<RippleRef>>, config: RippleConfig) {
        if is_showing(slot) {
            return;
        }
        let disabled = self.slider.upgrade().is_none_or(|inner| inner.config().disabled);
        if disabled {
            return;
        }
        let launched = self.launcher.launch(config);
        *slot.borrow_mut() = launched;
    }

    pub(crate) fn destroy(&self) {
        for id in self.listeners.borrow_mut().drain(..) {
            dom::remove_event_listener(id);
        }
        let cleanups: Vec<Box<dyn FnOnce()>> = self.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
        self.on_disabled_change(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SliderConfig;
    use crate::dom::reset_dom;
    use crate::multiplexer::reset_multiplexer;
    use crate::ripple::{RippleController, RippleState};
    use crate::scheduler::reset_scheduler;
    use crate::slider::{Slider, SliderOptions, END_THUMB_MARKER, START_THUMB_MARKER};
    use crate::types::Rect;

    fn setup() -> (Slider, Rc<RippleController>) {
        reset_dom();
        reset_scheduler();
        reset_multiplexer();
        let host = dom::create_element("div");
        dom::append_child(dom::body(), host);
        dom::set_bounding_rect(host, Rect::new(0.0, 0.0, 100.0, 48.0));

        let ripples = Rc::new(RippleController::new());
        let launcher: Rc<dyn RippleLauncher> = ripples.clone();
        let slider = Slider::new(
            host,
            SliderOptions {
                config: SliderConfig::with_range(0.0, 100.0, 1.0),
                ripple: Some(launcher),
                ..SliderOptions::default()
            },
        );
        for (marker, value) in [(START_THUMB_MARKER, "20"), (END_THUMB_MARKER, "80")] {
            let el = dom::create_element("input");
            dom::set_attribute(el, marker, "");
            dom::set_attribute(el, "value", value);
            slider.attach_input(el);
        }
        slider.after_view_init().unwrap();
        (slider, ripples)
    }

    #[test]
    fn test_elements_built_under_host() {
        let (slider, _ripples) = setup();
        let thumb = slider.visual_thumb(ThumbPosition::Start).unwrap();
        assert_eq!(dom::parent(thumb.host()), Some(slider.host()));
        assert!(dom::has_class(thumb.knob(), KNOB_CLASS));
        assert!(dom::contains(thumb.host(), thumb.value_indicator_container()));
    }

    #[test]
    fn test_hover_ripple() {
        let (slider, ripples) = setup();
        let thumb = slider.visual_thumb(ThumbPosition::End).unwrap();

        dom::dispatch_event(&Event::new(EventType::MouseEnter, thumb.host()));
        assert!(thumb.is_hovered());
        assert!(thumb.hover_ripple().unwrap().is_showing());
        assert_eq!(ripples.launch_count(), 1);

        dom::dispatch_event(&Event::new(EventType::MouseLeave, thumb.host()));
        assert!(!thumb.is_hovered());
        assert_eq!(thumb.hover_ripple().unwrap().state(), RippleState::Hidden);
    }

    #[test]
    fn test_blur_settles_after_current_task() {
        let (slider, _ripples) = setup();
        let thumb = slider.visual_thumb(ThumbPosition::Start).unwrap();
        let input = slider.input(ThumbPosition::Start).unwrap();

        dom::focus(input.host());
        assert!(thumb.focus_ripple().unwrap().is_showing());

        dom::blur(input.host());
        assert!(thumb.focus_ripple().unwrap().is_showing());
        scheduler::run_microtasks();
        assert!(!thumb.focus_ripple().unwrap().is_showing());
    }

    #[test]
    fn test_drag_shows_active_ripple() {
        let (slider, _ripples) = setup();
        let thumb = slider.visual_thumb(ThumbPosition::End).unwrap();
        let host = slider.host();

        dom::dispatch_event(&Event::new(EventType::PointerDown, host).with_client_x(90.0).with_pointer_id(1));
        assert!(thumb.is_active());
        assert_eq!(thumb.active_ripple().unwrap().state(), RippleState::FadingIn);
        assert!(slider.visual_thumb(ThumbPosition::Start).unwrap().active_ripple().is_none());

        dom::dispatch_event(&Event::new(EventType::PointerUp, host).with_client_x(90.0).with_pointer_id(1));
        assert!(!thumb.is_active());
        let active = thumb.active_ripple().unwrap();
        assert_eq!(active.state(), RippleState::FadingOut);
        // Still focused after the drag
        assert!(thumb.focus_ripple().unwrap().is_showing());

        scheduler::advance(400);
        assert_eq!(active.state(), RippleState::Hidden);
    }

    #[test]
    fn test_disabled_blocks_and_fades_ripples() {
        let (slider, ripples) = setup();
        let thumb = slider.visual_thumb(ThumbPosition::End).unwrap();

        dom::dispatch_event(&Event::new(EventType::MouseEnter, thumb.host()));
        slider.set_disabled(true);
        assert!(!thumb.is_showing_any_ripple());

        dom::dispatch_event(&Event::new(EventType::MouseLeave, thumb.host()));
        dom::dispatch_event(&Event::new(EventType::MouseEnter, thumb.host()));
        assert_eq!(ripples.launch_count(), 1);
    }

    #[test]
    fn test_destroy_stops_listening() {
        let (slider, ripples) = setup();
        let thumb = slider.visual_thumb(ThumbPosition::End).unwrap();
        slider.destroy();

        dom::dispatch_event(&Event::new(EventType::MouseEnter, thumb.host()));
        assert!(!thumb.is_hovered());
        assert_eq!(ripples.launch_count(), 0);
    }
}
