//! Slider Container - Lifecycle, inputs, visual thumbs and the foundation.
//!
//! The container owns one or two [`ThumbInput`]s, builds a [`VisualThumb`] for
//! each, and drives a [`SliderFoundation`] through [`ContainerAdapter`].
//!
//! # Lifecycle
//!
//! ```text
//! UNINITIALIZED --after_view_init--> INITIALIZED --destroy--> DESTROYED
//! ```
//!
//! Each transition happens at most once. On a headless platform the container
//! stays UNINITIALIZED: inputs still carry their value attributes but nothing is
//! measured or wired.
//!
//! # Example
//!
//! ```ignore
//! use spark_slider::{dom, Slider, SliderOptions, SliderConfig};
//!
//! let host = dom::create_element("div");
//! dom::append_child(dom::body(), host);
//! let slider = Slider::new(host, SliderOptions {
//!     config: SliderConfig::with_range(0.0, 10.0, 1.0),
//!     ..SliderOptions::default()
//! });
//!
//! let start = dom::create_element("input");
//! dom::set_attribute(start, "slider-start-thumb", "");
//! slider.attach_input(start);
//! // ... same for the end input ...
//!
//! slider.after_view_init()?;
//! slider.set_value(4.0, ThumbPosition::Start)?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};
use spark_signals::{signal, Signal};

use crate::config::{default_display_with, DisplayWith, SliderConfig};
use crate::direction::Directionality;
use crate::dom::{
    self, ElementId, Event, EventHandler, EventType, ListenerId, ListenerOptions, ResizeEntry, ResizeObserver,
};
use crate::error::{Result, SliderError};
use crate::foundation::{classes, SliderFoundation};
use crate::multiplexer::{self, Subscription};
use crate::ripple::{RippleController, RippleLauncher};
use crate::scheduler::{self, TimerId};
use crate::types::{Rect, ThumbPosition, TickMark};

use super::adapter::ContainerAdapter;
use super::synthetic;
use super::thumb_input::{ThumbInput, END_THUMB_MARKER, START_THUMB_MARKER, THUMB_MARKER};
use super::visual_thumb::VisualThumb;

/// Host resizes are coalesced over this window.
pub const RESIZE_DEBOUNCE_MS: u64 = 50;

/// Relayout delay after a direction change.
pub const DIRECTION_RELAYOUT_MS: u64 = 10;

/// Class of the active part of the track.
pub const TRACK_ACTIVE_CLASS: &str = "slider__track--active_fill";

// =============================================================================
// TYPES
// =============================================================================

/// Where the container is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Destroyed,
}

/// Construction options.
#[derive(Default)]
pub struct SliderOptions {
    pub config: SliderConfig,
    /// Formats values for `aria-valuetext` and the value indicators.
    pub display_with: Option<DisplayWith>,
    /// Shared direction source. A private LTR one is created when absent.
    pub directionality: Option<Directionality>,
    /// Ripple backend. An in-memory [`RippleController`] when absent.
    pub ripple: Option<Rc<dyn RippleLauncher>>,
}

pub(crate) struct SliderInner {
    pub(crate) host: ElementId,
    pub(crate) track_active: ElementId,
    config: RefCell<SliderConfig>,
    display_with: RefCell<DisplayWith>,
    pub(crate) dir: Directionality,
    pub(crate) ripple: Rc<dyn RippleLauncher>,

    inputs: RefCell<Vec<Rc<ThumbInput>>>,
    thumbs: RefCell<Vec<Rc<VisualThumb>>>,
    foundation: RefCell<Option<Rc<SliderFoundation>>>,
    state: Cell<LifecycleState>,

    pub(crate) tick_marks: Signal<Vec<TickMark>>,
    pub(crate) start_indicator_text: Signal<String>,
    pub(crate) end_indicator_text: Signal<String>,

    /// Host rect captured from the last resize observation, valid during one layout.
    pub(crate) cached_host_rect: Cell<Option<Rect>>,
    /// Native `change` handlers registered by the foundation, by thumb slot.
    pub(crate) change_handlers: RefCell<[Option<EventHandler>; 2]>,

    resize_observer: RefCell<Option<ResizeObserver>>,
    resize_timer: Cell<Option<TimerId>>,
    direction_timer: Cell<Option<TimerId>>,
    direction_cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
    layout_listeners: RefCell<Vec<ListenerId>>,
    subscriptions: RefCell<Vec<Subscription>>,
    layout_passes: Cell<u64>,
    weak_self: Weak<SliderInner>,
}

/// A single or dual-thumb slider bound to a host element.
#[derive(Clone)]
pub struct Slider {
    inner: Rc<SliderInner>,
}

impl std::fmt::Debug for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slider")
            .field("host", &self.inner.host)
            .field("state", &self.inner.state.get())
            .field("inputs", &self.inner.inputs.borrow().len())
            .finish()
    }
}

// =============================================================================
// INNER
// =============================================================================

impl SliderInner {
    pub(crate) fn config(&self) -> SliderConfig {
        self.config.borrow().clone()
    }

    pub(crate) fn display(&self, value: f64) -> String {
        let display_with = self.display_with.borrow().clone();
        display_with(value)
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.state.get() == LifecycleState::Initialized
    }

    pub(crate) fn is_range(&self) -> bool {
        self.inputs.borrow().len() >= 2
    }

    pub(crate) fn foundation(&self) -> Option<Rc<SliderFoundation>> {
        self.foundation.borrow().clone()
    }

    /// Start is the first declared input, End the last.
    pub(crate) fn input(&self, position: ThumbPosition) -> Option<Rc<ThumbInput>> {
        let inputs = self.inputs.borrow();
        match (inputs.len(), position) {
            (0, _) => None,
            (1, ThumbPosition::Start) => None,
            (_, ThumbPosition::Start) => inputs.first().cloned(),
            (_, ThumbPosition::End) => inputs.last().cloned(),
        }
    }

    pub(crate) fn visual_thumb(&self, position: ThumbPosition) -> Option<Rc<VisualThumb>> {
        self.thumbs.borrow().iter().find(|t| t.position() == position).cloned()
    }

    fn input_position_for(&self, el: ElementId) -> Option<ThumbPosition> {
        self.inputs.borrow().iter().find(|input| input.host() == el).map(|input| input.position())
    }

    pub(crate) fn is_any_thumb_active(&self) -> bool {
        self.inputs.borrow().iter().any(|input| input.is_active())
    }

    pub(crate) fn indicator_signal(&self, position: ThumbPosition) -> &Signal<String> {
        match position {
            ThumbPosition::Start => &self.start_indicator_text,
            ThumbPosition::End => &self.end_indicator_text,
        }
    }

    /// Remeasure through the foundation, outside the update zone.
    fn layout(&self) {
        if let Some(foundation) = self.foundation() {
            scheduler::run_outside(|| foundation.layout(false));
            self.layout_passes.set(self.layout_passes.get() + 1);
            trace!("slider: layout pass {}", self.layout_passes.get());
        }
    }

    fn validate_inputs(&self) -> Result<()> {
        let inputs = self.inputs.borrow();
        let count = |marker: &str| inputs.iter().filter(|i| dom::has_attribute(i.host(), marker)).count();
        let (plain, start, end) = (count(THUMB_MARKER), count(START_THUMB_MARKER), count(END_THUMB_MARKER));
        let range = inputs.len() >= 2;

        let valid = if range {
            inputs.len() == 2
                && plain == 0
                && start == 1
                && end == 1
                && dom::has_attribute(inputs[0].host(), START_THUMB_MARKER)
                && dom::has_attribute(inputs[1].host(), END_THUMB_MARKER)
        } else {
            inputs.len() == 1 && plain == 1 && start == 0 && end == 0
        };

        if valid { Ok(()) } else { Err(SliderError::InvalidThumbConfiguration { range }) }
    }

    fn create_visual_thumbs(&self) {
        if !self.thumbs.borrow().is_empty() {
            return;
        }
        let positions: &[ThumbPosition] =
            if self.is_range() { &[ThumbPosition::Start, ThumbPosition::End] } else { &[ThumbPosition::End] };
        let mut thumbs = Vec::with_capacity(positions.len());
        for &position in positions {
            let thumb = VisualThumb::new(self.weak_self.clone(), position, self.ripple.clone());
            if let Some(input) = self.input(position) {
                thumb.attach(&input);
            }
            thumbs.push(thumb);
        }
        *self.thumbs.borrow_mut() = thumbs;
    }

    /// Root classes the foundation reads at init.
    fn sync_root_classes(&self) {
        let config = self.config();
        dom::set_class(self.host, classes::RANGE, self.is_range());
        dom::set_class(self.host, classes::DISCRETE, config.discrete);
        dom::set_class(self.host, classes::TICK_MARKS, config.show_tick_marks);
        dom::set_class(self.host, classes::DISABLED, config.disabled);
    }

    fn subscribe_to_input_events(&self) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        for event_type in [EventType::Change, EventType::Input] {
            let weak = self.weak_self.clone();
            subscriptions.push(multiplexer::listen(event_type, move |event: &Event| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_global_input_event(event);
                }
            }));
        }
    }

    /// Shared capture listener: claim native events aimed at our inputs.
    fn handle_global_input_event(&self, event: &Event) {
        let Some(position) = self.input_position_for(event.target()) else {
            return;
        };
        if synthetic::is_synthetic(event) {
            return;
        }
        event.stop_immediate_propagation();
        if event.event_type() == EventType::Change {
            let handler = self.change_handlers.borrow()[position.slot()].clone();
            if let Some(handler) = handler {
                handler(event);
            }
        }
    }

    /// Push bounds then values into the inputs, end before start.
    ///
    /// The end input must know the start value as its min before its value
    /// property is written, and vice versa.
    fn initialize_inputs(&self) {
        let order: &[ThumbPosition] =
            if self.is_range() { &[ThumbPosition::End, ThumbPosition::Start] } else { &[ThumbPosition::End] };
        for &position in order {
            if let Some(input) = self.input(position) {
                input.initialize_input_state();
                input.initialize_input_value_property();
            }
        }
    }

    fn attach_layout_sync(&self) {
        let types: &[EventType] = if dom::platform().supports_pointer_events {
            &[EventType::PointerDown]
        } else {
            &[EventType::MouseEnter, EventType::TouchStart]
        };
        let mut listeners = self.layout_listeners.borrow_mut();
        for &event_type in types {
            let weak = self.weak_self.clone();
            let handler: EventHandler = Rc::new(move |_event: &Event| {
                if let Some(inner) = weak.upgrade() {
                    inner.layout();
                }
            });
            let options =
                if event_type == EventType::TouchStart { ListenerOptions::PASSIVE } else { ListenerOptions::NONE };
            listeners.push(scheduler::run_outside(|| dom::add_event_listener(self.host, event_type, options, handler)));
        }
    }

    fn observe_host_resize(&self) {
        let weak = self.weak_self.clone();
        let observer = ResizeObserver::new(move |entries: &[ResizeEntry]| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_resize(entries);
            }
        });
        match observer {
            Some(observer) => {
                observer.observe(self.host);
                *self.resize_observer.borrow_mut() = Some(observer);
            }
            None => debug!("slider: resize observation unavailable, relying on window resize"),
        }
    }

    /// Debounce resizes. Ignored mid-drag.
    fn handle_resize(&self, entries: &[ResizeEntry]) {
        if self.is_any_thumb_active() {
            return;
        }
        if let Some(timer) = self.resize_timer.take() {
            scheduler::clear_timeout(timer);
        }
        let rect = entries.iter().rev().find(|e| e.target == self.host).map(|e| e.content_rect);
        let weak = self.weak_self.clone();
        let timer = scheduler::run_outside(|| {
            scheduler::set_timeout(RESIZE_DEBOUNCE_MS, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.resize_timer.set(None);
                    inner.cached_host_rect.set(rect);
                    inner.layout();
                    inner.cached_host_rect.set(None);
                }
            })
        });
        self.resize_timer.set(Some(timer));
    }

    fn track_direction(&self) {
        let weak = self.weak_self.clone();
        let cleanup = self.dir.on_change(move |_direction| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_direction_change();
            }
        });
        *self.direction_cleanup.borrow_mut() = Some(Box::new(cleanup));
    }

    fn handle_direction_change(&self) {
        if let Some(timer) = self.direction_timer.take() {
            scheduler::clear_timeout(timer);
        }
        let weak = self.weak_self.clone();
        let timer = scheduler::run_outside(|| {
            scheduler::set_timeout(DIRECTION_RELAYOUT_MS, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.direction_timer.set(None);
                    inner.layout();
                }
            })
        });
        self.direction_timer.set(Some(timer));
    }

    fn new_foundation(&self) -> Rc<SliderFoundation> {
        SliderFoundation::new(Rc::new(ContainerAdapter::new(self.weak_self.clone())))
    }

    /// Undo everything `after_view_init` wired before a failed foundation init.
    fn release_wiring(&self) {
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            subscription.unsubscribe();
        }
        for id in self.layout_listeners.borrow_mut().drain(..) {
            dom::remove_event_listener(id);
        }
        *self.change_handlers.borrow_mut() = [None, None];
    }

    fn value_attributes(&self) -> Vec<Option<String>> {
        self.inputs.borrow().iter().map(|input| dom::get_attribute(input.host(), "value")).collect()
    }

    fn restore_value_attributes(&self, values: &[Option<String>]) {
        let inputs = self.inputs.borrow();
        for (input, value) in inputs.iter().zip(values) {
            match value {
                Some(value) => dom::set_attribute(input.host(), "value", value),
                None => dom::remove_attribute(input.host(), "value"),
            }
        }
    }

    fn update_value_indicator_text(&self, position: ThumbPosition) {
        if let Some(input) = self.input(position) {
            self.indicator_signal(position).set(self.display(input.value()));
        }
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl Slider {
    /// Bind a slider to `host`. Inputs are attached afterwards.
    pub fn new(host: ElementId, options: SliderOptions) -> Self {
        let SliderOptions { config, display_with, directionality, ripple } = options;
        let track_active = dom::create_element("div");
        dom::add_class(track_active, TRACK_ACTIVE_CLASS);
        dom::append_child(host, track_active);

        let ripple: Rc<dyn RippleLauncher> = match ripple {
            Some(ripple) => ripple,
            None => Rc::new(RippleController::new()),
        };

        let inner = Rc::new_cyclic(|weak_self| SliderInner {
            host,
            track_active,
            config: RefCell::new(config),
            display_with: RefCell::new(display_with.unwrap_or_else(default_display_with)),
            dir: directionality.unwrap_or_default(),
            ripple,
            inputs: RefCell::new(Vec::new()),
            thumbs: RefCell::new(Vec::new()),
            foundation: RefCell::new(None),
            state: Cell::new(LifecycleState::Uninitialized),
            tick_marks: signal(Vec::new()),
            start_indicator_text: signal(String::new()),
            end_indicator_text: signal(String::new()),
            cached_host_rect: Cell::new(None),
            change_handlers: RefCell::new([None, None]),
            resize_observer: RefCell::new(None),
            resize_timer: Cell::new(None),
            direction_timer: Cell::new(None),
            direction_cleanup: RefCell::new(None),
            layout_listeners: RefCell::new(Vec::new()),
            subscriptions: RefCell::new(Vec::new()),
            layout_passes: Cell::new(0),
            weak_self: weak_self.clone(),
        });
        debug!("slider: created on {host:?}");
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<SliderInner>) -> Self {
        Self { inner }
    }

    /// Attach a native range input. The input is moved under the host if needed.
    ///
    /// The first of two inputs is the start thumb, the last the end thumb.
    pub fn attach_input(&self, el: ElementId) -> Rc<ThumbInput> {
        let inner = &self.inner;
        if inner.state.get() != LifecycleState::Uninitialized {
            debug!("slider: input {el:?} attached after init, takes effect on reinitialize");
        }
        if dom::parent(el) != Some(inner.host) {
            dom::append_child(inner.host, el);
        }

        let input = ThumbInput::new(el, ThumbPosition::End, Rc::downgrade(inner));
        inner.inputs.borrow_mut().push(input.clone());
        {
            let inputs = inner.inputs.borrow();
            let range = inputs.len() >= 2;
            for (i, existing) in inputs.iter().enumerate() {
                let position = if range && i == 0 { ThumbPosition::Start } else { ThumbPosition::End };
                existing.set_position(position);
            }
        }

        input.initialize_input_value_attribute();
        input.initialize_aria_value_text();
        input.attach_listeners();
        for position in [ThumbPosition::Start, ThumbPosition::End] {
            inner.update_value_indicator_text(position);
        }
        input
    }

    /// Validate the inputs, build the visual thumbs and start the foundation.
    ///
    /// Only the first call does anything. On a headless platform the slider
    /// validates and then stays uninitialized.
    pub fn after_view_init(&self) -> Result<()> {
        let inner = &self.inner;
        if inner.state.get() != LifecycleState::Uninitialized {
            return Ok(());
        }
        inner.validate_inputs()?;
        inner.create_visual_thumbs();
        inner.sync_root_classes();

        if !dom::platform().is_browser {
            debug!("slider: headless platform, staying uninitialized");
            return Ok(());
        }

        inner.subscribe_to_input_events();
        inner.initialize_inputs();

        let foundation = inner.new_foundation();
        inner.attach_layout_sync();
        if let Err(err) = foundation.init() {
            inner.release_wiring();
            debug!("slider: foundation init failed: {err}");
            return Err(err);
        }
        *inner.foundation.borrow_mut() = Some(foundation.clone());
        inner.state.set(LifecycleState::Initialized);

        inner.layout();
        let disabled = inner.config.borrow().disabled;
        foundation.set_disabled(disabled);
        inner.observe_host_resize();
        inner.track_direction();
        debug!("slider: initialized range={}", inner.is_range());
        Ok(())
    }

    /// Tear everything down. Safe to call more than once.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if inner.state.replace(LifecycleState::Destroyed) == LifecycleState::Destroyed {
            return;
        }
        let foundation = inner.foundation.borrow_mut().take();
        if let Some(foundation) = foundation {
            foundation.destroy();
        }
        let observer = inner.resize_observer.borrow_mut().take();
        if let Some(observer) = observer {
            observer.disconnect();
        }
        for timer in [inner.resize_timer.take(), inner.direction_timer.take()].into_iter().flatten() {
            scheduler::clear_timeout(timer);
        }
        let cleanup = inner.direction_cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
        inner.release_wiring();

        let thumbs: Vec<Rc<VisualThumb>> = inner.thumbs.borrow().clone();
        for thumb in thumbs {
            thumb.destroy();
        }
        let inputs: Vec<Rc<ThumbInput>> = inner.inputs.borrow().clone();
        for input in inputs {
            input.destroy();
        }
        debug!("slider: destroyed");
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn host(&self) -> ElementId {
        self.inner.host
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.inner.state.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    pub fn is_range(&self) -> bool {
        self.inner.is_range()
    }

    pub fn input(&self, position: ThumbPosition) -> Option<Rc<ThumbInput>> {
        self.inner.input(position)
    }

    pub fn visual_thumb(&self, position: ThumbPosition) -> Option<Rc<VisualThumb>> {
        self.inner.visual_thumb(position)
    }

    /// The foundation, once initialized.
    pub fn foundation(&self) -> Option<Rc<SliderFoundation>> {
        self.inner.foundation()
    }

    /// Value of the thumb at `position`.
    pub fn value(&self, position: ThumbPosition) -> Option<f64> {
        self.inner.input(position).map(|input| input.value())
    }

    /// Set the value of one thumb.
    ///
    /// Initialized: the foundation clamps against the other thumb and quantizes,
    /// with no change or input notification. Before init: the attribute is written
    /// as is.
    pub fn set_value(&self, value: f64, position: ThumbPosition) -> Result<()> {
        let inner = &self.inner;
        let input = inner.input(position).ok_or(SliderError::MisconfiguredSlider)?;
        if inner.is_initialized() {
            if let Some(foundation) = inner.foundation() {
                match position {
                    ThumbPosition::Start => foundation.set_value_start(value),
                    ThumbPosition::End => foundation.set_value(value),
                }
                inner.update_value_indicator_text(position);
                return Ok(());
            }
        }
        if !input.is_destroyed() {
            input.write_value_attribute(if value.is_finite() { value } else { 0.0 });
        }
        Ok(())
    }

    pub fn config(&self) -> SliderConfig {
        self.inner.config()
    }

    /// Tick marks written by the last UI update.
    pub fn tick_marks(&self) -> Signal<Vec<TickMark>> {
        self.inner.tick_marks.clone()
    }

    pub fn value_indicator_text(&self, position: ThumbPosition) -> String {
        self.inner.indicator_signal(position).get()
    }

    /// Forced layouts run by the container (pointer down, resize, direction).
    pub fn layout_passes(&self) -> u64 {
        self.inner.layout_passes.get()
    }

    pub fn directionality(&self) -> Directionality {
        self.inner.dir.clone()
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    pub fn set_min(&self, min: f64) -> Result<()> {
        self.update_config(|config| config.min = min)
    }

    pub fn set_max(&self, max: f64) -> Result<()> {
        self.update_config(|config| config.max = max)
    }

    pub fn set_step(&self, step: f64) -> Result<()> {
        self.update_config(|config| config.step = step)
    }

    pub fn set_discrete(&self, discrete: bool) -> Result<()> {
        self.update_config(|config| config.discrete = discrete)
    }

    pub fn set_show_tick_marks(&self, show: bool) -> Result<()> {
        self.update_config(|config| config.show_tick_marks = show)
    }

    /// Disable or enable without rebuilding the foundation.
    pub fn set_disabled(&self, disabled: bool) {
        let inner = &self.inner;
        inner.config.borrow_mut().disabled = disabled;
        match inner.foundation().filter(|_| inner.is_initialized()) {
            Some(foundation) => foundation.set_disabled(disabled),
            None => dom::set_class(inner.host, classes::DISABLED, disabled),
        }
        let thumbs: Vec<Rc<VisualThumb>> = inner.thumbs.borrow().clone();
        for thumb in thumbs {
            thumb.on_disabled_change(disabled);
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.config.borrow().disabled
    }

    /// Replace the value formatter and refresh every text derived from it.
    pub fn set_display_with(&self, display_with: DisplayWith) {
        let inner = &self.inner;
        *inner.display_with.borrow_mut() = display_with;
        let inputs: Vec<Rc<ThumbInput>> = inner.inputs.borrow().clone();
        for input in inputs {
            input.initialize_aria_value_text();
            inner.update_value_indicator_text(input.position());
        }
    }

    /// Apply a structural change and rebuild.
    ///
    /// A change the foundation rejects is rolled back: the previous config and
    /// thumb values are restored and the previous foundation rebuilt.
    fn update_config(&self, apply: impl FnOnce(&mut SliderConfig)) -> Result<()> {
        let before = {
            let mut config = self.inner.config.borrow_mut();
            let before = config.clone();
            apply(&mut config);
            if *config == before {
                return Ok(());
            }
            before
        };
        let values = self.inner.value_attributes();

        let Err(err) = self.reinitialize() else {
            return Ok(());
        };
        warn!("slider: configuration rejected, restoring previous: {err}");
        *self.inner.config.borrow_mut() = before;
        self.inner.restore_value_attributes(&values);
        if let Err(restore_err) = self.reinitialize() {
            warn!("slider: previous configuration no longer valid: {restore_err}");
        }
        Err(err)
    }

    /// Rebuild the foundation after a structural property change.
    ///
    /// No-op unless initialized. Values are snapped onto the new `min`/`step`
    /// grid, inputs are re-bounded end first, then a fresh foundation takes over.
    pub fn reinitialize(&self) -> Result<()> {
        let inner = &self.inner;
        if !inner.is_initialized() {
            return Ok(());
        }
        let previous = inner.foundation.borrow_mut().take();
        if let Some(previous) = previous {
            previous.destroy();
        }
        *inner.change_handlers.borrow_mut() = [None, None];

        inner.sync_root_classes();
        let inputs: Vec<Rc<ThumbInput>> = inner.inputs.borrow().clone();
        for input in &inputs {
            input.snap_value_attribute();
        }
        inner.initialize_inputs();

        let foundation = inner.new_foundation();
        foundation.init()?;
        *inner.foundation.borrow_mut() = Some(foundation.clone());
        inner.layout();
        let disabled = inner.config.borrow().disabled;
        foundation.set_disabled(disabled);
        debug!("slider: reinitialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{reset_dom, Platform};
    use crate::multiplexer::reset_multiplexer;
    use crate::scheduler::reset_scheduler;

    fn setup() {
        reset_dom();
        reset_scheduler();
        reset_multiplexer();
    }

    fn host() -> ElementId {
        let host = dom::create_element("div");
        dom::append_child(dom::body(), host);
        dom::set_bounding_rect(host, Rect::new(0.0, 0.0, 100.0, 48.0));
        host
    }

    fn input(marker: &str, value: Option<&str>) -> ElementId {
        let el = dom::create_element("input");
        dom::set_attribute(el, marker, "");
        if let Some(value) = value {
            dom::set_attribute(el, "value", value);
        }
        el
    }

    fn range_slider(config: SliderConfig, start: Option<&str>, end: Option<&str>) -> Slider {
        let slider = Slider::new(host(), SliderOptions { config, ..SliderOptions::default() });
        slider.attach_input(input(START_THUMB_MARKER, start));
        slider.attach_input(input(END_THUMB_MARKER, end));
        slider
    }

    #[test]
    fn test_positions_follow_declaration_order() {
        setup();
        let slider = range_slider(SliderConfig::default(), None, None);
        assert!(slider.is_range());
        assert_eq!(slider.value(ThumbPosition::Start), Some(0.0));
        assert_eq!(slider.value(ThumbPosition::End), Some(100.0));
    }

    #[test]
    fn test_single_slider_has_no_start() {
        setup();
        let slider = Slider::new(host(), SliderOptions::default());
        slider.attach_input(input(THUMB_MARKER, None));
        assert!(!slider.is_range());
        assert!(slider.input(ThumbPosition::Start).is_none());
        assert_eq!(slider.value(ThumbPosition::End), Some(0.0));
    }

    #[test]
    fn test_init_creates_thumbs_and_classes() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        assert_eq!(slider.lifecycle(), LifecycleState::Initialized);
        assert!(dom::has_class(slider.host(), classes::RANGE));
        assert!(slider.visual_thumb(ThumbPosition::Start).is_some());
        assert!(slider.visual_thumb(ThumbPosition::End).is_some());
        assert_eq!(slider.layout_passes(), 1);

        let end = slider.input(ThumbPosition::End).unwrap();
        assert_eq!(dom::get_attribute(end.host(), "min").as_deref(), Some("2"));
        assert_eq!(dom::get_attribute(end.host(), "max").as_deref(), Some("10"));
    }

    #[test]
    fn test_invalid_markers() {
        setup();
        let slider = Slider::new(host(), SliderOptions::default());
        slider.attach_input(input(START_THUMB_MARKER, None));
        slider.attach_input(input(START_THUMB_MARKER, None));
        assert!(matches!(
            slider.after_view_init(),
            Err(SliderError::InvalidThumbConfiguration { range: true })
        ));

        setup();
        let slider = Slider::new(host(), SliderOptions::default());
        assert!(matches!(
            slider.after_view_init(),
            Err(SliderError::InvalidThumbConfiguration { range: false })
        ));
    }

    #[test]
    fn test_set_value_without_inputs() {
        setup();
        let slider = Slider::new(host(), SliderOptions::default());
        assert!(matches!(slider.set_value(1.0, ThumbPosition::End), Err(SliderError::MisconfiguredSlider)));

        slider.attach_input(input(THUMB_MARKER, None));
        slider.after_view_init().unwrap();
        assert!(matches!(slider.set_value(1.0, ThumbPosition::Start), Err(SliderError::MisconfiguredSlider)));
        assert!(slider.set_value(1.0, ThumbPosition::End).is_ok());
    }

    #[test]
    fn test_rejected_config_rolls_back() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        assert!(matches!(slider.set_min(30.0), Err(SliderError::Foundation(_))));
        assert_eq!(slider.lifecycle(), LifecycleState::Initialized);
        assert_eq!(slider.config().min, 0.0);
        let foundation = slider.foundation().unwrap();
        assert_eq!((foundation.min(), foundation.max()), (0.0, 10.0));
        assert_eq!(slider.value(ThumbPosition::Start), Some(2.0));
        assert_eq!(slider.value(ThumbPosition::End), Some(8.0));

        slider.set_value(9.0, ThumbPosition::Start).unwrap();
        assert_eq!(slider.value(ThumbPosition::Start), Some(8.0));
    }

    #[test]
    fn test_step_change_snaps_onto_min_grid() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        slider.set_step(3.0).unwrap();
        assert_eq!(slider.foundation().unwrap().step(), 3.0);
        assert_eq!(slider.value(ThumbPosition::Start), Some(3.0));
        assert_eq!(slider.value(ThumbPosition::End), Some(9.0));
        let end = slider.input(ThumbPosition::End).unwrap();
        assert_eq!(dom::get_attribute(end.host(), "min").as_deref(), Some("3"));

        // 10 is off the grid; the highest grid point below max is taken.
        slider.set_value(10.0, ThumbPosition::End).unwrap();
        assert_eq!(slider.value(ThumbPosition::End), Some(9.0));
    }

    #[test]
    fn test_set_value_without_foundation_writes_attribute() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        dom::set_attribute(slider.host(), "data-min-range", "50");
        assert!(slider.reinitialize().is_err());
        assert!(slider.foundation().is_none());

        slider.set_value(5.0, ThumbPosition::End).unwrap();
        assert_eq!(slider.value(ThumbPosition::End), Some(5.0));
        slider.input(ThumbPosition::Start).unwrap().set_value(f64::INFINITY).unwrap();
        assert_eq!(slider.value(ThumbPosition::Start), Some(0.0));
    }

    #[test]
    fn test_set_value_before_init_writes_attribute() {
        setup();
        let slider = range_slider(SliderConfig::default(), None, None);
        slider.set_value(30.0, ThumbPosition::Start).unwrap();
        let start = slider.input(ThumbPosition::Start).unwrap();
        assert_eq!(dom::get_attribute(start.host(), "value").as_deref(), Some("30"));
        assert_eq!(start.initial_value().as_deref(), Some("30"));
    }

    #[test]
    fn test_set_value_clamps_against_peer() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        slider.set_value(9.0, ThumbPosition::Start).unwrap();
        assert_eq!(slider.value(ThumbPosition::Start), Some(8.0));
        assert_eq!(slider.value(ThumbPosition::End), Some(8.0));
        assert_eq!(slider.value_indicator_text(ThumbPosition::Start), "8");
    }

    #[test]
    fn test_change_handlers_held_by_container() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        let end = slider.input(ThumbPosition::End).unwrap();
        assert_eq!(dom::listener_count(end.host(), EventType::Change), 0);
        assert!(slider.inner.change_handlers.borrow().iter().all(Option::is_some));

        slider.destroy();
        assert!(slider.inner.change_handlers.borrow().iter().all(Option::is_none));
    }

    #[test]
    fn test_headless_stays_uninitialized() {
        setup();
        dom::set_platform(Platform::headless());
        let slider = range_slider(SliderConfig::default(), None, None);
        slider.after_view_init().unwrap();

        assert_eq!(slider.lifecycle(), LifecycleState::Uninitialized);
        assert!(slider.foundation().is_none());
        assert_eq!(multiplexer::stats().active_types, 0);
        assert!(slider.reinitialize().is_ok());
    }

    #[test]
    fn test_resize_debounced() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();
        let passes = slider.layout_passes();

        dom::notify_resize(slider.host(), Rect::new(0.0, 0.0, 200.0, 48.0));
        scheduler::advance(30);
        dom::notify_resize(slider.host(), Rect::new(0.0, 0.0, 300.0, 48.0));
        scheduler::advance(49);
        assert_eq!(slider.layout_passes(), passes);

        scheduler::advance(1);
        assert_eq!(slider.layout_passes(), passes + 1);
    }

    #[test]
    fn test_resize_ignored_while_dragging() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();
        let passes = slider.layout_passes();

        slider.input(ThumbPosition::End).unwrap().set_active(true);
        dom::notify_resize(slider.host(), Rect::new(0.0, 0.0, 200.0, 48.0));
        scheduler::advance(100);
        assert_eq!(slider.layout_passes(), passes);
    }

    #[test]
    fn test_direction_change_relayouts_later() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();
        let passes = slider.layout_passes();

        slider.directionality().set(crate::types::Direction::Rtl);
        assert_eq!(slider.layout_passes(), passes);
        scheduler::advance(DIRECTION_RELAYOUT_MS);
        assert_eq!(slider.layout_passes(), passes + 1);
    }

    #[test]
    fn test_reinitialize_on_max_change() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();

        slider.set_max(5.0).unwrap();
        assert_eq!(slider.value(ThumbPosition::End), Some(5.0));
        assert_eq!(slider.value(ThumbPosition::Start), Some(2.0));
        assert_eq!(slider.foundation().unwrap().max(), 5.0);

        let passes = slider.layout_passes();
        slider.set_max(5.0).unwrap();
        assert_eq!(slider.layout_passes(), passes);
    }

    #[test]
    fn test_destroy_releases_everything() {
        setup();
        let slider = range_slider(SliderConfig::with_range(0.0, 10.0, 1.0), Some("2"), Some("8"));
        slider.after_view_init().unwrap();
        slider.destroy();

        assert_eq!(slider.lifecycle(), LifecycleState::Destroyed);
        assert_eq!(multiplexer::stats().active_types, 0);
        assert_eq!(dom::observer_count(), 0);
        assert!(slider.input(ThumbPosition::End).unwrap().is_destroyed());
        assert!(slider.after_view_init().is_ok());
        assert_eq!(slider.lifecycle(), LifecycleState::Destroyed);
    }
}
