//! Ripples - Hover, focus and active feedback on a thumb.
//!
//! The slider only decides *when* a ripple shows or fades. Drawing is somebody
//! else's job behind [`RippleLauncher`]. [`RippleController`] is the in-memory
//! launcher used when nothing else is plugged in: it tracks ripple state over the
//! virtual clock and counts launches.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::scheduler;

// =============================================================================
// TYPES
// =============================================================================

/// Lifecycle of one ripple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RippleState {
    FadingIn,
    Visible,
    FadingOut,
    Hidden,
}

/// Launch parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleConfig {
    pub centered: bool,
    /// Stays visible until faded out explicitly.
    pub persistent: bool,
    pub enter_duration_ms: u64,
    pub exit_duration_ms: u64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            centered: true,
            persistent: true,
            enter_duration_ms: 0,
            exit_duration_ms: 0,
        }
    }
}

struct RippleInner {
    config: RippleConfig,
    state: Cell<RippleState>,
}

/// Handle to a launched ripple.
#[derive(Clone)]
pub struct RippleRef {
    inner: Rc<RippleInner>,
}

impl std::fmt::Debug for RippleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RippleRef").field("state", &self.state()).finish()
    }
}

impl RippleRef {
    fn launch(config: RippleConfig) -> Self {
        let inner = Rc::new(RippleInner { config, state: Cell::new(RippleState::FadingIn) });
        if config.enter_duration_ms == 0 {
            inner.state.set(RippleState::Visible);
        } else {
            let weak = Rc::downgrade(&inner);
            scheduler::set_timeout(config.enter_duration_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    if inner.state.get() == RippleState::FadingIn {
                        inner.state.set(RippleState::Visible);
                    }
                }
            });
        }
        Self { inner }
    }

    pub fn state(&self) -> RippleState {
        self.inner.state.get()
    }

    pub fn config(&self) -> RippleConfig {
        self.inner.config
    }

    /// Fading in or fully visible.
    pub fn is_showing(&self) -> bool {
        matches!(self.state(), RippleState::FadingIn | RippleState::Visible)
    }

    /// Start fading out. Already fading or hidden ripples are left alone.
    pub fn fade_out(&self) {
        if !self.is_showing() {
            return;
        }
        if self.inner.config.exit_duration_ms == 0 {
            self.inner.state.set(RippleState::Hidden);
            return;
        }
        self.inner.state.set(RippleState::FadingOut);
        let weak: Weak<RippleInner> = Rc::downgrade(&self.inner);
        scheduler::set_timeout(self.inner.config.exit_duration_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.state.set(RippleState::Hidden);
            }
        });
    }
}

// =============================================================================
// LAUNCHER
// =============================================================================

/// Something that can show ripples.
pub trait RippleLauncher {
    /// Launch a ripple. `None` when ripples are disabled.
    fn launch(&self, config: RippleConfig) -> Option<RippleRef>;
}

/// In-memory launcher.
#[derive(Default)]
pub struct RippleController {
    disabled: Cell<bool>,
    launched: Cell<usize>,
    ripples: RefCell<Vec<RippleRef>>,
}

impl RippleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Total launches since creation.
    pub fn launch_count(&self) -> usize {
        self.launched.get()
    }

    /// Ripples currently fading in or visible.
    pub fn showing_count(&self) -> usize {
        self.ripples.borrow().iter().filter(|r| r.is_showing()).count()
    }

    /// Fade every ripple this controller launched.
    pub fn fade_out_all(&self) {
        for ripple in self.ripples.borrow().iter() {
            ripple.fade_out();
        }
    }
}

impl RippleLauncher for RippleController {
    fn launch(&self, config: RippleConfig) -> Option<RippleRef> {
        if self.disabled.get() {
            return None;
        }
        self.launched.set(self.launched.get() + 1);
        let ripple = RippleRef::launch(config);
        let mut ripples = self.ripples.borrow_mut();
        ripples.retain(|r| r.state() != RippleState::Hidden);
        ripples.push(ripple.clone());
        Some(ripple)
    }
}
