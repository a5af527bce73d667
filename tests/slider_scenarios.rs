//! End-to-end slider behaviour over the headless document.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_slider::dom::{self, Event, EventType, ListenerOptions, Platform};
use spark_slider::slider::{END_THUMB_MARKER, START_THUMB_MARKER, THUMB_MARKER};
use spark_slider::{
    multiplexer, reset_all, scheduler, Direction, Directionality, LifecycleState, Rect, Slider, SliderConfig,
    SliderError, SliderOptions, ThumbPosition,
};

fn host() -> dom::ElementId {
    let host = dom::create_element("div");
    dom::append_child(dom::body(), host);
    dom::set_bounding_rect(host, Rect::new(0.0, 0.0, 100.0, 48.0));
    host
}

fn thumb(marker: &str, value: Option<&str>) -> dom::ElementId {
    let el = dom::create_element("input");
    dom::set_attribute(el, marker, "");
    if let Some(value) = value {
        dom::set_attribute(el, "value", value);
    }
    el
}

fn single(config: SliderConfig) -> Slider {
    reset_all();
    let slider = Slider::new(host(), SliderOptions { config, ..SliderOptions::default() });
    slider.attach_input(thumb(THUMB_MARKER, None));
    slider
}

fn range(config: SliderConfig, start: &str, end: &str) -> Slider {
    reset_all();
    let slider = Slider::new(host(), SliderOptions { config, ..SliderOptions::default() });
    slider.attach_input(thumb(START_THUMB_MARKER, Some(start)));
    slider.attach_input(thumb(END_THUMB_MARKER, Some(end)));
    slider
}

#[test]
fn single_thumb_defaults_to_min_and_clamps_to_max() {
    let slider = single(SliderConfig::default());
    slider.after_view_init().unwrap();

    assert_eq!(slider.value(ThumbPosition::End), Some(0.0));
    slider.set_value(150.0, ThumbPosition::End).unwrap();
    assert_eq!(slider.value(ThumbPosition::End), Some(100.0));
}

#[test]
fn start_above_end_is_capped_at_end() {
    let slider = range(SliderConfig::with_range(0.0, 10.0, 1.0), "2", "8");
    slider.after_view_init().unwrap();

    slider.set_value(9.0, ThumbPosition::Start).unwrap();
    assert_eq!(slider.value(ThumbPosition::Start), Some(8.0));
    assert_eq!(slider.value(ThumbPosition::End), Some(8.0));
}

#[test]
fn thumb_input_round_trip_is_quantized_and_clamped() {
    let slider = single(SliderConfig::with_range(0.0, 10.0, 0.5));
    slider.after_view_init().unwrap();
    let input = slider.input(ThumbPosition::End).unwrap();

    input.set_value(3.3).unwrap();
    assert_eq!(input.value(), 3.5);
    input.set_value(-4.0).unwrap();
    assert_eq!(input.value(), 0.0);
    input.set_value(12.0).unwrap();
    assert_eq!(input.value(), 10.0);
}

#[test]
fn set_value_does_not_notify() {
    let slider = single(SliderConfig::default());
    slider.after_view_init().unwrap();
    let input = slider.input(ThumbPosition::End).unwrap();
    let changes = Rc::new(Cell::new(0));
    let changes_clone = changes.clone();
    let _cleanup = input.value_change().subscribe(move |_| changes_clone.set(changes_clone.get() + 1));

    slider.set_value(40.0, ThumbPosition::End).unwrap();
    assert_eq!(changes.get(), 0);
}

#[test]
fn direction_change_lays_out_after_delay() {
    reset_all();
    let dir = Directionality::new(Direction::Ltr);
    let slider = Slider::new(
        host(),
        SliderOptions {
            config: SliderConfig::with_range(0.0, 10.0, 1.0),
            directionality: Some(dir.clone()),
            ..SliderOptions::default()
        },
    );
    slider.attach_input(thumb(START_THUMB_MARKER, Some("2")));
    slider.attach_input(thumb(END_THUMB_MARKER, Some("8")));
    slider.after_view_init().unwrap();
    let passes = slider.layout_passes();

    dir.set(Direction::Rtl);
    assert_eq!(slider.layout_passes(), passes);
    scheduler::advance(9);
    assert_eq!(slider.layout_passes(), passes);
    scheduler::advance(1);
    assert_eq!(slider.layout_passes(), passes + 1);
}

#[test]
fn two_resizes_within_window_give_one_layout() {
    let slider = range(SliderConfig::with_range(0.0, 10.0, 1.0), "2", "8");
    slider.after_view_init().unwrap();
    let passes = slider.layout_passes();
    let reads = dom::rect_reads(slider.host());

    dom::notify_resize(slider.host(), Rect::new(0.0, 0.0, 200.0, 48.0));
    scheduler::advance(20);
    dom::notify_resize(slider.host(), Rect::new(0.0, 0.0, 300.0, 48.0));
    scheduler::advance(100);

    assert_eq!(slider.layout_passes(), passes + 1);
    // The debounced layout uses the observed rect instead of reading the host again.
    assert_eq!(dom::rect_reads(slider.host()), reads);
}

#[test]
fn fake_change_is_not_fed_back() {
    let slider = range(SliderConfig::with_range(0.0, 10.0, 1.0), "2", "8");
    slider.after_view_init().unwrap();
    let start = slider.input(ThumbPosition::Start).unwrap();

    let calls = Rc::new(RefCell::new(Vec::new()));
    let calls_clone = calls.clone();
    start.register_on_change(move |v| calls_clone.borrow_mut().push(v));

    start.emit_fake_event(EventType::Change);
    assert!(calls.borrow().is_empty());

    // A real change runs the foundation once: one change and one input notification.
    dom::set_input_value(start.host(), "4");
    dom::dispatch_event(&Event::new(EventType::Change, start.host()));
    assert_eq!(*calls.borrow(), vec![4.0, 4.0]);
    assert_eq!(slider.value(ThumbPosition::Start), Some(4.0));
}

#[test]
fn fake_events_still_reach_direct_listeners() {
    let slider = single(SliderConfig::default());
    slider.after_view_init().unwrap();
    let input = slider.input(ThumbPosition::End).unwrap();

    let seen = Rc::new(Cell::new(0));
    let seen_clone = seen.clone();
    dom::add_event_listener(
        input.host(),
        EventType::Change,
        ListenerOptions::NONE,
        Rc::new(move |_: &Event| seen_clone.set(seen_clone.get() + 1)),
    );

    input.emit_fake_event(EventType::Change);
    assert_eq!(seen.get(), 1);

    // The real change is claimed at the root; the input only sees the re-emitted fake one.
    dom::dispatch_event(&Event::new(EventType::Change, input.host()));
    assert_eq!(seen.get(), 2);
}

#[test]
fn reinitialize_is_noop_before_init_and_idempotent_after() {
    let slider = range(SliderConfig::with_range(0.0, 10.0, 1.0), "2", "8");
    slider.set_max(20.0).unwrap();
    assert_eq!(slider.lifecycle(), LifecycleState::Uninitialized);
    assert!(slider.foundation().is_none());

    slider.after_view_init().unwrap();
    slider.set_step(2.0).unwrap();
    let end = slider.input(ThumbPosition::End).unwrap().host();
    let snapshot = |el| {
        ["min", "max", "step", "value"].map(|name| dom::get_attribute(el, name))
    };
    let once = snapshot(end);
    slider.reinitialize().unwrap();
    assert_eq!(snapshot(end), once);
    assert_eq!(dom::get_attribute(end, "max").as_deref(), Some("20"));
}

#[test]
fn rejected_reconfiguration_keeps_slider_usable() {
    let slider = range(SliderConfig::with_range(0.0, 10.0, 1.0), "2", "8");
    slider.after_view_init().unwrap();
    let err = slider.set_min(30.0).unwrap_err();
    assert!(matches!(err, SliderError::Foundation(_)));

    assert_eq!(slider.lifecycle(), LifecycleState::Initialized);
    assert!(slider.foundation().is_some());
    assert_eq!(slider.config().min, 0.0);

    slider.set_value(9.0, ThumbPosition::Start).unwrap();
    slider.input(ThumbPosition::End).unwrap().set_value(1.0).unwrap();
    let start = slider.value(ThumbPosition::Start).unwrap();
    let end = slider.value(ThumbPosition::End).unwrap();
    assert!(start <= end, "start {start} > end {end}");
    assert_eq!((start, end), (8.0, 8.0));
}

#[test]
fn step_change_on_range_is_accepted() {
    let slider = range(SliderConfig::with_range(0.0, 10.0, 1.0), "2", "8");
    slider.after_view_init().unwrap();

    slider.set_step(3.0).unwrap();
    assert_eq!(slider.value(ThumbPosition::Start), Some(3.0));
    assert_eq!(slider.value(ThumbPosition::End), Some(9.0));

    slider.set_value(0.0, ThumbPosition::End).unwrap();
    slider.set_value(7.0, ThumbPosition::Start).unwrap();
    let start = slider.value(ThumbPosition::Start).unwrap();
    let end = slider.value(ThumbPosition::End).unwrap();
    assert!(start <= end, "start {start} > end {end}");
    assert_eq!(start % 3.0, 0.0);
    assert_eq!(end % 3.0, 0.0);
}

#[test]
fn invalid_marker_combination_aborts_init() {
    reset_all();
    let slider = Slider::new(host(), SliderOptions::default());
    slider.attach_input(thumb(THUMB_MARKER, None));
    slider.attach_input(thumb(END_THUMB_MARKER, None));

    let err = slider.after_view_init().unwrap_err();
    assert!(matches!(err, SliderError::InvalidThumbConfiguration { range: true }));
    assert_eq!(slider.lifecycle(), LifecycleState::Uninitialized);
    assert_eq!(multiplexer::stats().active_types, 0);
}

#[test]
fn failed_foundation_init_leaves_no_listeners() {
    reset_all();
    let slider = Slider::new(
        host(),
        SliderOptions { config: SliderConfig::with_range(0.0, 10.0, 3.0), ..SliderOptions::default() },
    );
    slider.attach_input(thumb(START_THUMB_MARKER, Some("2")));
    slider.attach_input(thumb(END_THUMB_MARKER, Some("8")));

    // 8 is off the step grid of 3.
    assert!(matches!(slider.after_view_init(), Err(SliderError::Foundation(_))));
    assert_eq!(multiplexer::stats().active_types, 0);
    assert_eq!(dom::listener_count(slider.host(), EventType::PointerDown), 0);
}

#[test]
fn multiplexer_shared_between_sliders() {
    reset_all();
    let sliders: Vec<Slider> = (0..3)
        .map(|_| {
            let slider = Slider::new(host(), SliderOptions::default());
            slider.attach_input(thumb(THUMB_MARKER, None));
            slider.after_view_init().unwrap();
            slider
        })
        .collect();

    assert_eq!(multiplexer::subscriber_count(EventType::Change), 3);
    assert_eq!(dom::listener_count(dom::document_root(), EventType::Change), 1);

    for slider in &sliders {
        slider.destroy();
    }
    let stats = multiplexer::stats();
    assert_eq!((stats.attached, stats.detached, stats.active_types), (2, 2, 0));
}

#[test]
fn headless_platform_keeps_values_working() {
    reset_all();
    dom::set_platform(Platform::headless());
    let slider = Slider::new(host(), SliderOptions::default());
    slider.attach_input(thumb(THUMB_MARKER, None));
    slider.after_view_init().unwrap();

    assert!(!slider.is_initialized());
    slider.set_value(42.0, ThumbPosition::End).unwrap();
    assert_eq!(slider.value(ThumbPosition::End), Some(42.0));
}

#[test]
fn config_from_toml_drives_slider() {
    reset_all();
    let config = SliderConfig::from_toml_str("min = 10.0\nmax = 20.0\nstep = 2.0\ndiscrete = true\n").unwrap();
    let slider = Slider::new(host(), SliderOptions { config, ..SliderOptions::default() });
    slider.attach_input(thumb(START_THUMB_MARKER, None));
    slider.attach_input(thumb(END_THUMB_MARKER, None));
    slider.after_view_init().unwrap();

    assert_eq!(slider.value(ThumbPosition::Start), Some(10.0));
    assert_eq!(slider.value(ThumbPosition::End), Some(20.0));
    assert!(dom::has_class(slider.host(), spark_slider::foundation::classes::DISCRETE));
}

#[test]
fn drag_streams_carry_source_and_value() {
    let slider = range(SliderConfig::with_range(0.0, 100.0, 1.0), "20", "80");
    slider.after_view_init().unwrap();
    let end = slider.input(ThumbPosition::End).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let (start_log, end_log) = (log.clone(), log.clone());
    let _a = end.drag_start().subscribe(move |e| start_log.borrow_mut().push(("start", e.source.position(), e.value)));
    let _b = end.drag_end().subscribe(move |e| end_log.borrow_mut().push(("end", e.source.position(), e.value)));

    let host = slider.host();
    dom::dispatch_event(&Event::new(EventType::PointerDown, host).with_client_x(70.0).with_pointer_id(1));
    assert!(end.is_active());
    dom::dispatch_event(&Event::new(EventType::PointerMove, host).with_client_x(75.0).with_pointer_id(1));
    dom::dispatch_event(&Event::new(EventType::PointerUp, host).with_client_x(75.0).with_pointer_id(1));

    assert!(!end.is_active());
    assert_eq!(
        *log.borrow(),
        vec![("start", ThumbPosition::End, 70.0), ("end", ThumbPosition::End, 75.0)]
    );
    assert_eq!(slider.value(ThumbPosition::End), Some(75.0));
}
