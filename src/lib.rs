//! # spark-slider
//!
//! Single and dual-thumb range slider core for Rust UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! reactive bits (direction, tick marks, value indicator text).
//!
//! ## Architecture
//!
//! A slider is a host element holding one or two native range inputs. The inputs
//! own the values; everything else is derived from them.
//!
//! ```text
//! ThumbInput(s) ──► Slider (container) ──► ContainerAdapter ──► SliderFoundation
//!        ▲                  │                                        │
//!        └──── attributes, fake change/input events ◄───────────────┘
//! ```
//!
//! The foundation is headless: gesture handling, thumb selection, clamping and
//! tick marks live there and talk to the world only through
//! [`foundation::adapter::SliderAdapter`]. The container wires it to a small
//! in-memory document ([`dom`]) with listeners, focus, resize observation and a
//! virtual clock ([`scheduler`]).
//!
//! ## Modules
//!
//! - [`types`] - Thumb positions, geometry, number formatting
//! - [`config`] - Slider configuration, TOML loading
//! - [`dom`] - Elements, events, focus, native range behaviour
//! - [`scheduler`] - Virtual clock, microtasks, update zone
//! - [`multiplexer`] - Shared capture listeners for `change`/`input`
//! - [`foundation`] - Headless slider state machine
//! - [`slider`] - Container, thumb inputs, visual thumbs
//! - [`input`] - crossterm event routing

pub mod config;
pub mod direction;
pub mod dom;
pub mod emitter;
pub mod error;
pub mod foundation;
pub mod input;
pub mod multiplexer;
pub mod ripple;
pub mod scheduler;
pub mod slider;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{default_display_with, DisplayWith, SliderConfig};
pub use direction::Directionality;
pub use emitter::Emitter;
pub use error::{Result, SliderError};
pub use foundation::adapter::{InputAttribute, InputAttributeName, Registration, SliderAdapter};
pub use foundation::SliderFoundation;
pub use input::dispatch_terminal_event;
pub use ripple::{RippleConfig, RippleController, RippleLauncher, RippleRef, RippleState};
pub use slider::{LifecycleState, Slider, SliderDragEvent, SliderOptions, ThumbInput, VisualThumb};

/// Reset every thread-local registry: document, clock, shared listeners.
///
/// Tests call this first so each starts from an empty document.
pub fn reset_all() {
    dom::reset_dom();
    scheduler::reset_scheduler();
    multiplexer::reset_multiplexer();
}
