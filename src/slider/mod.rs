//! Slider binding - Container, thumb inputs and visual thumbs.
//!
//! The binding owns the host-side objects and plugs them into the headless
//! [`crate::foundation::SliderFoundation`]:
//!
//! - [`Slider`] - lifecycle, configuration, resize and direction tracking
//! - [`ThumbInput`] - the native range input holding one value
//! - [`VisualThumb`] - knob element and ripples
//!
//! Events the binding dispatches itself are tagged through [`synthetic`] so the
//! shared capture listener does not feed them back into the foundation.

mod adapter;
mod container;
pub mod synthetic;
mod thumb_input;
mod visual_thumb;

pub use container::{
    LifecycleState, Slider, SliderOptions, DIRECTION_RELAYOUT_MS, RESIZE_DEBOUNCE_MS, TRACK_ACTIVE_CLASS,
};
pub use thumb_input::{SliderDragEvent, ThumbInput, END_THUMB_MARKER, START_THUMB_MARKER, THUMB_MARKER};
pub use visual_thumb::{VisualThumb, KNOB_CLASS, THUMB_CLASS, VALUE_INDICATOR_CONTAINER_CLASS};
