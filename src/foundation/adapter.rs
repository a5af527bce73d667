//! Slider Adapter - Everything the foundation may touch.
//!
//! The foundation never sees elements, inputs or streams directly. It asks its
//! adapter. A UI binding implements [`SliderAdapter`] once and gets the whole
//! gesture/geometry state machine for free.
//!
//! Event registration returns a [`Registration`] token; the same token is handed
//! back to the matching deregister method.

use crate::dom::{EventHandler, EventType, ListenerId};
use crate::error::{Result, SliderError};
use crate::types::{format_number, Rect, ThumbPosition, TickMark};

// =============================================================================
// INPUT ATTRIBUTES
// =============================================================================

/// Attributes the foundation is allowed to write on a thumb input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAttribute {
    AriaValueText(String),
    Disabled,
    Min(f64),
    Max(f64),
    Value(f64),
    Step(f64),
}

/// Attribute names the foundation may read or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAttributeName {
    AriaValueText,
    Disabled,
    Min,
    Max,
    Value,
    Step,
}

impl InputAttributeName {
    pub fn as_str(self) -> &'static str {
        match self {
            InputAttributeName::AriaValueText => "aria-valuetext",
            InputAttributeName::Disabled => "disabled",
            InputAttributeName::Min => "min",
            InputAttributeName::Max => "max",
            InputAttributeName::Value => "value",
            InputAttributeName::Step => "step",
        }
    }

    fn from_str(name: &str) -> Option<Self> {
        Some(match name {
            "aria-valuetext" => InputAttributeName::AriaValueText,
            "disabled" => InputAttributeName::Disabled,
            "min" => InputAttributeName::Min,
            "max" => InputAttributeName::Max,
            "value" => InputAttributeName::Value,
            "step" => InputAttributeName::Step,
            _ => return None,
        })
    }
}

impl InputAttribute {
    pub fn name(&self) -> InputAttributeName {
        match self {
            InputAttribute::AriaValueText(_) => InputAttributeName::AriaValueText,
            InputAttribute::Disabled => InputAttributeName::Disabled,
            InputAttribute::Min(_) => InputAttributeName::Min,
            InputAttribute::Max(_) => InputAttributeName::Max,
            InputAttribute::Value(_) => InputAttributeName::Value,
            InputAttribute::Step(_) => InputAttributeName::Step,
        }
    }

    /// Attribute text as written to the element.
    pub fn value_string(&self) -> String {
        match self {
            InputAttribute::AriaValueText(text) => text.clone(),
            InputAttribute::Disabled => String::new(),
            InputAttribute::Min(v)
            | InputAttribute::Max(v)
            | InputAttribute::Value(v)
            | InputAttribute::Step(v) => format_number(*v),
        }
    }

    /// Build an attribute write from a dynamic (name, value) pair.
    ///
    /// Names outside the allow-list are rejected. Numeric values that do not parse
    /// coerce to 0, the same way attribute reads do.
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        let kind = InputAttributeName::from_str(name)
            .ok_or_else(|| SliderError::InvalidAttributeWrite { name: name.to_string() })?;
        let number = || crate::types::coerce_number(Some(value));
        Ok(match kind {
            InputAttributeName::AriaValueText => InputAttribute::AriaValueText(value.to_string()),
            InputAttributeName::Disabled => InputAttribute::Disabled,
            InputAttributeName::Min => InputAttribute::Min(number()),
            InputAttributeName::Max => InputAttribute::Max(number()),
            InputAttributeName::Value => InputAttribute::Value(number()),
            InputAttributeName::Step => InputAttribute::Step(number()),
        })
    }
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Token for one registered foundation handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A listener on an element of the host document.
    Listener(ListenerId),
    /// A native `change` handler held by the binding and fed from the shared
    /// capture listener.
    ChangeHandler(ThumbPosition),
    /// Nothing was registered; the target element does not exist.
    Detached,
}

// =============================================================================
// ADAPTER
// =============================================================================

/// Capabilities the foundation needs from its UI binding.
pub trait SliderAdapter {
    // Root element
    fn has_class(&self, class: &str) -> bool;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn get_attribute(&self, name: &str) -> Option<String>;

    // Visual thumbs
    fn add_thumb_class(&self, class: &str, thumb: ThumbPosition);
    fn remove_thumb_class(&self, class: &str, thumb: ThumbPosition);
    fn get_thumb_knob_width(&self, thumb: ThumbPosition) -> f64;
    fn get_thumb_bounding_client_rect(&self, thumb: ThumbPosition) -> Rect;
    fn set_thumb_style_property(&self, property: &str, value: &str, thumb: ThumbPosition);
    fn remove_thumb_style_property(&self, property: &str, thumb: ThumbPosition);
    fn get_value_indicator_container_width(&self, thumb: ThumbPosition) -> f64;
    fn set_value_indicator_text(&self, value: f64, thumb: ThumbPosition);

    // Inputs
    fn get_input_value(&self, thumb: ThumbPosition) -> String;
    fn set_input_value(&self, value: &str, thumb: ThumbPosition);
    fn get_input_attribute(&self, name: InputAttributeName, thumb: ThumbPosition) -> Option<String>;
    fn set_input_attribute(&self, attribute: InputAttribute, thumb: ThumbPosition);
    fn remove_input_attribute(&self, name: InputAttributeName, thumb: ThumbPosition);
    fn focus_input(&self, thumb: ThumbPosition);
    fn is_input_focused(&self, thumb: ThumbPosition) -> bool;

    // Geometry and presentation
    /// Host rectangle. A rect cached from a resize observation wins over a fresh read.
    fn get_bounding_client_rect(&self) -> Rect;
    fn is_rtl(&self) -> bool;
    fn set_track_active_style_property(&self, property: &str, value: &str);
    fn remove_track_active_style_property(&self, property: &str);
    /// ARIA text for a value, `None` to leave `aria-valuetext` alone.
    fn value_to_aria_value_text(&self, value: f64, thumb: ThumbPosition) -> Option<String>;
    fn update_tick_marks(&self, tick_marks: Vec<TickMark>);
    fn set_pointer_capture(&self, pointer_id: i32);
    fn supports_pointer_events(&self) -> bool;

    // Outgoing notifications
    fn emit_change_event(&self, value: f64, thumb: ThumbPosition);
    fn emit_input_event(&self, value: f64, thumb: ThumbPosition);
    fn emit_drag_start_event(&self, value: f64, thumb: ThumbPosition);
    fn emit_drag_end_event(&self, value: f64, thumb: ThumbPosition);

    // Event registration
    fn register_event_handler(&self, event_type: EventType, handler: EventHandler) -> Registration;
    fn deregister_event_handler(&self, registration: Registration);
    fn register_thumb_event_handler(
        &self,
        thumb: ThumbPosition,
        event_type: EventType,
        handler: EventHandler,
    ) -> Registration;
    fn deregister_thumb_event_handler(&self, thumb: ThumbPosition, registration: Registration);
    fn register_input_event_handler(
        &self,
        thumb: ThumbPosition,
        event_type: EventType,
        handler: EventHandler,
    ) -> Registration;
    fn deregister_input_event_handler(&self, thumb: ThumbPosition, registration: Registration);
    fn register_body_event_handler(&self, event_type: EventType, handler: EventHandler) -> Registration;
    fn deregister_body_event_handler(&self, registration: Registration);
    fn register_window_event_handler(&self, event_type: EventType, handler: EventHandler) -> Registration;
    fn deregister_window_event_handler(&self, registration: Registration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_list() {
        assert_eq!(InputAttribute::parse("min", "5").unwrap(), InputAttribute::Min(5.0));
        assert_eq!(InputAttribute::parse("value", "x").unwrap(), InputAttribute::Value(0.0));
        assert_eq!(
            InputAttribute::parse("aria-valuetext", "5 px").unwrap(),
            InputAttribute::AriaValueText("5 px".into())
        );
        assert_eq!(InputAttribute::parse("disabled", "").unwrap(), InputAttribute::Disabled);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        let err = InputAttribute::parse("onclick", "alert(1)").unwrap_err();
        assert!(matches!(err, SliderError::InvalidAttributeWrite { ref name } if name == "onclick"));
    }

    #[test]
    fn test_value_string() {
        assert_eq!(InputAttribute::Step(0.5).value_string(), "0.5");
        assert_eq!(InputAttribute::Max(100.0).value_string(), "100");
        assert_eq!(InputAttribute::Disabled.value_string(), "");
        assert_eq!(InputAttribute::Disabled.name().as_str(), "disabled");
    }
}
