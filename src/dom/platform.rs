//! Platform capabilities of the host environment.

use std::cell::Cell;

/// What the host can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// A real rendering environment. Sliders only initialize interactively here.
    pub is_browser: bool,
    /// Pointer events are delivered (otherwise mouse + touch).
    pub supports_pointer_events: bool,
    pub supports_resize_observer: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            is_browser: true,
            supports_pointer_events: true,
            supports_resize_observer: true,
        }
    }
}

impl Platform {
    /// No rendering, no pointer events, no resize observation.
    pub fn headless() -> Self {
        Self {
            is_browser: false,
            supports_pointer_events: false,
            supports_resize_observer: false,
        }
    }
}

thread_local! {
    static PLATFORM: Cell<Platform> = Cell::new(Platform::default());
}

/// Current platform capabilities.
pub fn platform() -> Platform {
    PLATFORM.with(|p| p.get())
}

/// Replace the platform capabilities.
pub fn set_platform(platform: Platform) {
    PLATFORM.with(|p| p.set(platform));
}

pub(crate) fn reset_platform() {
    set_platform(Platform::default());
}
