//! Start never passes end, whatever values are thrown at either thumb.

use proptest::prelude::*;

use spark_slider::dom;
use spark_slider::slider::{END_THUMB_MARKER, START_THUMB_MARKER};
use spark_slider::{reset_all, Rect, Slider, SliderConfig, SliderOptions, ThumbPosition};

fn range_slider(min_range: Option<f64>) -> Slider {
    reset_all();
    let host = dom::create_element("div");
    dom::append_child(dom::body(), host);
    dom::set_bounding_rect(host, Rect::new(0.0, 0.0, 200.0, 48.0));
    if let Some(min_range) = min_range {
        dom::set_attribute(host, "data-min-range", &min_range.to_string());
    }
    let slider = Slider::new(
        host,
        SliderOptions { config: SliderConfig::with_range(0.0, 100.0, 1.0), ..SliderOptions::default() },
    );
    for marker in [START_THUMB_MARKER, END_THUMB_MARKER] {
        let el = dom::create_element("input");
        dom::set_attribute(el, marker, "");
        slider.attach_input(el);
    }
    slider
}

fn op() -> impl Strategy<Value = (bool, f64)> {
    (any::<bool>(), -50.0f64..150.0)
}

proptest! {
    #[test]
    fn start_never_exceeds_end(ops in prop::collection::vec(op(), 1..40)) {
        let slider = range_slider(None);
        slider.after_view_init().unwrap();

        for (is_start, value) in ops {
            let position = if is_start { ThumbPosition::Start } else { ThumbPosition::End };
            slider.set_value(value, position).unwrap();

            let start = slider.value(ThumbPosition::Start).unwrap();
            let end = slider.value(ThumbPosition::End).unwrap();
            prop_assert!(start <= end, "start {} > end {}", start, end);
            prop_assert!((0.0..=100.0).contains(&start));
            prop_assert!((0.0..=100.0).contains(&end));
            prop_assert_eq!(start, start.round());
        }
    }

    #[test]
    fn min_range_gap_is_kept(ops in prop::collection::vec(op(), 1..40)) {
        let slider = range_slider(Some(10.0));
        slider.after_view_init().unwrap();

        for (is_start, value) in ops {
            let position = if is_start { ThumbPosition::Start } else { ThumbPosition::End };
            slider.set_value(value, position).unwrap();

            let start = slider.value(ThumbPosition::Start).unwrap();
            let end = slider.value(ThumbPosition::End).unwrap();
            prop_assert!(end - start >= 10.0, "gap {} < 10", end - start);
        }
    }

    #[test]
    fn peer_never_moves(start_target in -50.0f64..150.0, end_target in -50.0f64..150.0) {
        let slider = range_slider(None);
        slider.after_view_init().unwrap();

        let end_before = slider.value(ThumbPosition::End).unwrap();
        slider.set_value(start_target, ThumbPosition::Start).unwrap();
        prop_assert_eq!(slider.value(ThumbPosition::End).unwrap(), end_before);

        let start_before = slider.value(ThumbPosition::Start).unwrap();
        slider.set_value(end_target, ThumbPosition::End).unwrap();
        prop_assert_eq!(slider.value(ThumbPosition::Start).unwrap(), start_before);
    }
}
