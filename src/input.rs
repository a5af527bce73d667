//! Terminal Input - Route crossterm events into a slider.
//!
//! Mouse columns become `client_x`, one cell per pixel. Left button gestures turn
//! into pointer events when the platform has them and mouse events otherwise.
//! Keys drive the focused thumb input like a native range control.
//!
//! # Example
//!
//! ```ignore
//! use crossterm::event::read;
//! use spark_slider::input::dispatch_terminal_event;
//!
//! loop {
//!     let event = read()?;
//!     dispatch_terminal_event(&slider, &event);
//! }
//! ```

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind, MouseButton,
    MouseEvent as CrosstermMouseEvent, MouseEventKind,
};
use log::trace;

use crate::dom::{self, ElementId, Event, EventType, RangeKey};
use crate::slider::Slider;
use crate::types::ThumbPosition;

/// Pointer id used for the terminal mouse.
pub const TERMINAL_POINTER_ID: i32 = 1;

/// Route one terminal event. Returns whether the slider consumed it.
pub fn dispatch_terminal_event(slider: &Slider, event: &CrosstermEvent) -> bool {
    match event {
        CrosstermEvent::Mouse(mouse) => route_mouse(slider, mouse),
        CrosstermEvent::Key(key) => route_key(slider, key),
        CrosstermEvent::Resize(width, height) => {
            trace!("input: terminal resized to {width}x{height}");
            dom::dispatch_event(&Event::new(EventType::Resize, dom::window()));
            true
        }
        _ => false,
    }
}

// =============================================================================
// MOUSE
// =============================================================================

fn route_mouse(slider: &Slider, mouse: &CrosstermMouseEvent) -> bool {
    let host = slider.host();
    let x = f64::from(mouse.column);
    let y = f64::from(mouse.row);
    let pointer = dom::platform().supports_pointer_events;

    let (event_type, target) = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let rect = dom::bounding_client_rect(host);
            if !rect.contains_x(x) || y < rect.top || y >= rect.bottom() {
                return false;
            }
            (if pointer { EventType::PointerDown } else { EventType::MouseDown }, host)
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if pointer {
                match dom::pointer_capture(TERMINAL_POINTER_ID) {
                    Some(target) => (EventType::PointerMove, target),
                    None => return false,
                }
            } else {
                (EventType::MouseMove, host)
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if pointer {
                let target = dom::pointer_capture(TERMINAL_POINTER_ID).unwrap_or(host);
                (EventType::PointerUp, target)
            } else {
                (EventType::MouseUp, host)
            }
        }
        _ => return false,
    };

    let mut event = Event::new(event_type, target).with_client_x(x).with_client_y(y);
    if pointer {
        event = event.with_pointer_id(TERMINAL_POINTER_ID);
    }
    dom::dispatch_event(&event);
    true
}

// =============================================================================
// KEYBOARD
// =============================================================================

fn route_key(slider: &Slider, key: &CrosstermKeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    let inputs: Vec<ElementId> = [ThumbPosition::Start, ThumbPosition::End]
        .into_iter()
        .filter_map(|position| slider.input(position))
        .map(|input| input.host())
        .collect();
    if inputs.is_empty() {
        return false;
    }
    let focused = dom::active_element().filter(|el| inputs.contains(el));

    match key.code {
        KeyCode::Tab => move_focus(&inputs, focused, true),
        KeyCode::BackTab => move_focus(&inputs, focused, false),
        code => {
            let Some(el) = focused else {
                return false;
            };
            let Some(range_key) = range_key(code, slider.directionality().is_rtl()) else {
                return false;
            };
            dom::step_by_key(el, range_key);
            true
        }
    }
}

/// Native range keys. Horizontal arrows follow the reading direction.
fn range_key(code: KeyCode, rtl: bool) -> Option<RangeKey> {
    let (forward, backward) =
        if rtl { (RangeKey::Decrement, RangeKey::Increment) } else { (RangeKey::Increment, RangeKey::Decrement) };
    Some(match code {
        KeyCode::Right => forward,
        KeyCode::Left => backward,
        KeyCode::Up => RangeKey::Increment,
        KeyCode::Down => RangeKey::Decrement,
        KeyCode::PageUp => RangeKey::PageIncrement,
        KeyCode::PageDown => RangeKey::PageDecrement,
        KeyCode::Home => RangeKey::Home,
        KeyCode::End => RangeKey::End,
        _ => return None,
    })
}

fn move_focus(inputs: &[ElementId], focused: Option<ElementId>, forward: bool) -> bool {
    let current = focused.and_then(|el| inputs.iter().position(|&i| i == el));
    let next = match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(inputs.len() - 1),
        (Some(i), true) => (i + 1 < inputs.len()).then_some(i + 1),
        (Some(i), false) => i.checked_sub(1),
    };
    match next {
        Some(index) => {
            dom::focus(inputs[index]);
            true
        }
        None => {
            // Focus leaves the slider.
            if let Some(el) = focused {
                dom::blur(el);
            }
            false
        }
    }
}
