//! Scheduler Module - Cooperative timers, microtasks and update zones
//!
//! Everything in the slider runs single-threaded on one task queue. This module is
//! that queue: a virtual clock with one-shot timers, a microtask queue drained after
//! every task, and the inside/outside "zone" escape hatch used to keep
//! high-frequency callbacks (resize, pointer) out of the reactive update cycle.
//!
//! Time only moves when the host calls [`advance`]. Nothing blocks.
//!
//! # Example
//!
//! ```ignore
//! use spark_slider::scheduler;
//!
//! let id = scheduler::set_timeout(50, || println!("debounced"));
//! scheduler::clear_timeout(id);
//!
//! scheduler::set_timeout(10, || println!("fires"));
//! scheduler::advance(10);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

// =============================================================================
// TYPES
// =============================================================================

/// Handle for a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

type Task = Box<dyn FnOnce()>;

struct Timer {
    id: TimerId,
    deadline: u64,
    task: Task,
}

struct SchedulerState {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
    microtasks: VecDeque<Task>,
}

impl SchedulerState {
    fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            timers: Vec::new(),
            microtasks: VecDeque::new(),
        }
    }
}

thread_local! {
    static SCHEDULER: RefCell<SchedulerState> = RefCell::new(SchedulerState::new());
}

// =============================================================================
// TIMERS
// =============================================================================

/// Current virtual time in milliseconds.
pub fn now() -> u64 {
    SCHEDULER.with(|s| s.borrow().now)
}

/// Schedule `task` to run once `delay_ms` from now.
pub fn set_timeout<F>(delay_ms: u64, task: F) -> TimerId
where
    F: FnOnce() + 'static,
{
    SCHEDULER.with(|s| {
        let mut s = s.borrow_mut();
        let id = TimerId(s.next_id);
        s.next_id += 1;
        let deadline = s.now + delay_ms;
        s.timers.push(Timer { id, deadline, task: Box::new(task) });
        id
    })
}

/// Cancel a pending timer. Unknown or already-fired ids are ignored.
pub fn clear_timeout(id: TimerId) {
    SCHEDULER.with(|s| {
        s.borrow_mut().timers.retain(|t| t.id != id);
    });
}

/// Number of timers waiting to fire.
pub fn pending_timers() -> usize {
    SCHEDULER.with(|s| s.borrow().timers.len())
}

/// Whether a specific timer is still pending.
pub fn is_pending(id: TimerId) -> bool {
    SCHEDULER.with(|s| s.borrow().timers.iter().any(|t| t.id == id))
}

/// Move the clock forward by `ms`, firing every timer that comes due.
///
/// Timers fire in deadline order (ties in scheduling order). Microtasks queued by a
/// timer run before the next timer fires. Timers scheduled while advancing fire in
/// the same call if their deadline is inside the window.
pub fn advance(ms: u64) {
    let target = now() + ms;
    loop {
        let next = SCHEDULER.with(|s| {
            let mut s = s.borrow_mut();
            let due = s
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.deadline <= target)
                .min_by_key(|(_, t)| (t.deadline, t.id.0))
                .map(|(i, _)| i);
            due.map(|i| {
                let timer = s.timers.remove(i);
                s.now = timer.deadline;
                timer.task
            })
        });
        match next {
            Some(task) => {
                task();
                run_microtasks();
            }
            None => break,
        }
    }
    SCHEDULER.with(|s| s.borrow_mut().now = target);
}

// =============================================================================
// MICROTASKS
// =============================================================================

/// Queue a continuation to run after the current task completes.
pub fn queue_microtask<F>(task: F)
where
    F: FnOnce() + 'static,
{
    SCHEDULER.with(|s| s.borrow_mut().microtasks.push_back(Box::new(task)));
}

/// Drain the microtask queue, including microtasks queued while draining.
pub fn run_microtasks() {
    loop {
        let task = SCHEDULER.with(|s| s.borrow_mut().microtasks.pop_front());
        match task {
            Some(task) => task(),
            None => break,
        }
    }
}

/// Number of queued microtasks.
pub fn pending_microtasks() -> usize {
    SCHEDULER.with(|s| s.borrow().microtasks.len())
}

// =============================================================================
// ZONES
// =============================================================================

thread_local! {
    static INSIDE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static UPDATE_PASSES: Cell<u64> = const { Cell::new(0) };
}

/// Run `f` inside the reactive update zone.
///
/// When the outermost inside frame exits, one update pass is counted.
pub fn run_inside<R>(f: impl FnOnce() -> R) -> R {
    INSIDE_DEPTH.with(|d| d.set(d.get() + 1));
    let result = f();
    let depth = INSIDE_DEPTH.with(|d| {
        let depth = d.get().saturating_sub(1);
        d.set(depth);
        depth
    });
    if depth == 0 {
        UPDATE_PASSES.with(|p| p.set(p.get() + 1));
    }
    result
}

/// Run `f` outside the update zone. Inside frames opened by `f` count on their own.
pub fn run_outside<R>(f: impl FnOnce() -> R) -> R {
    let saved = INSIDE_DEPTH.with(|d| d.replace(0));
    let result = f();
    INSIDE_DEPTH.with(|d| d.set(saved));
    result
}

/// Whether the caller is currently inside the update zone.
pub fn is_inside() -> bool {
    INSIDE_DEPTH.with(|d| d.get() > 0)
}

/// Number of completed update passes.
pub fn update_passes() -> u64 {
    UPDATE_PASSES.with(|p| p.get())
}

/// Reset clock, timers, microtasks and zone counters (for testing).
pub fn reset_scheduler() {
    SCHEDULER.with(|s| *s.borrow_mut() = SchedulerState::new());
    INSIDE_DEPTH.with(|d| d.set(0));
    UPDATE_PASSES.with(|p| p.set(0));
}

// =============================================================================
// TESTS
// =============================================================================
