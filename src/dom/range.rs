//! Native range input - value sanitization and keyboard stepping.
//!
//! A range input keeps its numeric state in the `min`, `max`, `step` and `value`
//! attributes plus a separate value property. The property is sanitized against the
//! bounds current at the moment it is written: writing `150` while `max` is still
//! unset stores `100`, and raising `max` later does not bring the `150` back. Reads
//! re-sanitize so shrinking bounds clamp an already-stored value.
//!
//! Defaults: `min` 0, `max` 100 (never below `min`), `step` 1, value at the midpoint.

use super::event::{dispatch_event, Event, EventType};
use super::node::{self, ElementId};
use crate::types::{coerce_number_or, format_number, quantize};

/// Effective numeric bounds of a range input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBounds {
    pub min: f64,
    pub max: f64,
    /// `None` when the step is `any`.
    pub step: Option<f64>,
}

impl RangeBounds {
    /// Sanitize a raw value: parse, fall back to the midpoint, clamp, snap.
    pub fn sanitize(&self, raw: Option<&str>) -> f64 {
        let fallback = self.min + (self.max - self.min) / 2.0;
        let value = coerce_number_or(raw, fallback).clamp(self.min, self.max);
        match self.step {
            Some(step) => {
                let mut snapped = quantize(value, self.min, step);
                if snapped > self.max {
                    snapped = quantize(snapped - step, self.min, step);
                }
                snapped.max(self.min)
            }
            None => value,
        }
    }
}

/// Bounds derived from an input's attributes.
pub fn range_bounds(el: ElementId) -> RangeBounds {
    let min = coerce_number_or(node::get_attribute(el, "min").as_deref(), 0.0);
    let max = coerce_number_or(node::get_attribute(el, "max").as_deref(), 100.0).max(min);
    let step = match node::get_attribute(el, "step") {
        Some(raw) if raw.trim().eq_ignore_ascii_case("any") => None,
        raw => Some(coerce_number_or(raw.as_deref(), 1.0)).filter(|s| *s > 0.0).or(Some(1.0)),
    };
    RangeBounds { min, max, step }
}

/// Current sanitized value as a number.
pub fn input_value_as_number(el: ElementId) -> f64 {
    let raw = node::with_node(el, |n| {
        n.dirty_value
            .clone()
            .or_else(|| n.attributes.iter().find(|(k, _)| k == "value").map(|(_, v)| v.clone()))
    })
    .flatten();
    range_bounds(el).sanitize(raw.as_deref())
}

/// Current sanitized value in attribute form.
pub fn input_value(el: ElementId) -> String {
    format_number(input_value_as_number(el))
}

/// Write the value property. Sanitized against the bounds in effect right now.
pub fn set_input_value(el: ElementId, raw: &str) {
    let sanitized = format_number(range_bounds(el).sanitize(Some(raw)));
    node::with_node_mut(el, |n| n.dirty_value = Some(sanitized));
}

/// Keys a focused range input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKey {
    Increment,
    Decrement,
    PageIncrement,
    PageDecrement,
    Home,
    End,
}

/// Step the input the way a native control handles a key press.
///
/// Fires a real `input` then `change` when the value moved. Disabled inputs are
/// left alone. Returns whether the value changed.
pub fn step_by_key(el: ElementId, key: RangeKey) -> bool {
    if !node::exists(el) || node::has_attribute(el, "disabled") {
        return false;
    }
    let bounds = range_bounds(el);
    let current = input_value_as_number(el);
    let step = bounds.step.unwrap_or(1.0);
    let page = step.max((bounds.max - bounds.min) / 10.0);

    let target = match key {
        RangeKey::Increment => current + step,
        RangeKey::Decrement => current - step,
        RangeKey::PageIncrement => current + page,
        RangeKey::PageDecrement => current - page,
        RangeKey::Home => bounds.min,
        RangeKey::End => bounds.max,
    };
    let next = bounds.sanitize(Some(&format_number(target)));
    if next == current {
        return false;
    }

    set_input_value(el, &format_number(next));
    dispatch_event(&Event::new(EventType::Input, el));
    dispatch_event(&Event::new(EventType::Change, el));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{add_event_listener, create_element, reset_dom, set_attribute, ListenerOptions};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() {
        reset_dom();
    }

    #[test]
    fn test_defaults_to_midpoint() {
        setup();
        let el = create_element("input");
        assert_eq!(input_value(el), "50");

        set_attribute(el, "min", "0");
        set_attribute(el, "max", "10");
        assert_eq!(input_value(el), "5");
    }

    #[test]
    fn test_write_is_sanitized_against_current_bounds() {
        setup();
        let el = create_element("input");

        // Written before max is raised: clamped to the default 100
        set_input_value(el, "150");
        set_attribute(el, "max", "200");
        assert_eq!(input_value(el), "100");

        set_input_value(el, "150");
        assert_eq!(input_value(el), "150");

        // Shrinking bounds clamp on read
        set_attribute(el, "max", "120");
        assert_eq!(input_value(el), "120");
    }

    #[test]
    fn test_step_snapping() {
        setup();
        let el = create_element("input");
        set_attribute(el, "min", "1");
        set_attribute(el, "max", "10");
        set_attribute(el, "step", "2");

        set_input_value(el, "4");
        assert_eq!(input_value(el), "5");

        // Snapping past max steps back down
        set_input_value(el, "10");
        assert_eq!(input_value(el), "9");

        set_attribute(el, "step", "any");
        set_input_value(el, "4.2");
        assert_eq!(input_value(el), "4.2");
    }

    #[test]
    fn test_attribute_value_used_until_property_written() {
        setup();
        let el = create_element("input");
        set_attribute(el, "value", "30");
        assert_eq!(input_value(el), "30");

        set_input_value(el, "40");
        set_attribute(el, "value", "10");
        assert_eq!(input_value(el), "40");
    }

    #[test]
    fn test_step_by_key_fires_input_then_change() {
        setup();
        let el = create_element("input");
        set_attribute(el, "min", "0");
        set_attribute(el, "max", "100");
        set_input_value(el, "50");

        let log = Rc::new(RefCell::new(Vec::new()));
        for event_type in [EventType::Input, EventType::Change] {
            let log = log.clone();
            add_event_listener(
                el,
                event_type,
                ListenerOptions::NONE,
                Rc::new(move |e: &Event| log.borrow_mut().push(e.event_type().as_str())),
            );
        }

        assert!(step_by_key(el, RangeKey::Increment));
        assert_eq!(input_value(el), "51");
        assert_eq!(*log.borrow(), vec!["input", "change"]);

        assert!(step_by_key(el, RangeKey::PageDecrement));
        assert_eq!(input_value(el), "41");

        assert!(step_by_key(el, RangeKey::End));
        assert!(!step_by_key(el, RangeKey::Increment));
        assert_eq!(input_value(el), "100");
    }

    #[test]
    fn test_step_by_key_ignores_disabled() {
        setup();
        let el = create_element("input");
        set_attribute(el, "disabled", "");
        assert!(!step_by_key(el, RangeKey::Home));
        assert_eq!(input_value(el), "50");
    }
}
