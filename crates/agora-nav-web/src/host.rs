#![forbid(unsafe_code)]

//! Bookkeeping for the browser-side frame and timer handles.
//!
//! The tracker only says *whether* it wants a frame and *when* its next
//! deadline is. The browser side owns at most one `requestAnimationFrame`
//! handle and one `setTimeout` handle, and these functions decide what to do
//! with them after every event.

use core::cell::Cell;
use core::time::Duration;

/// Outstanding `setTimeout` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub handle: i32,
    pub deadline: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    Keep,
    Request,
    Cancel(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPlan {
    Keep,
    /// Clear the old registration (if any), then arm a new one (if any).
    Replace {
        clear: Option<i32>,
        arm: Option<Duration>,
    },
}

#[must_use]
pub fn plan_frame(requested: Option<i32>, wanted: bool) -> FramePlan {
    match (requested, wanted) {
        (None, true) => FramePlan::Request,
        (Some(handle), false) => FramePlan::Cancel(handle),
        _ => FramePlan::Keep,
    }
}

#[must_use]
pub fn plan_timer(armed: Option<ArmedTimer>, wanted: Option<Duration>) -> TimerPlan {
    match (armed, wanted) {
        (None, None) => TimerPlan::Keep,
        (Some(timer), Some(deadline)) if timer.deadline == deadline => TimerPlan::Keep,
        (armed, arm) => TimerPlan::Replace {
            clear: armed.map(|t| t.handle),
            arm,
        },
    }
}

/// The live frame and timer handles.
///
/// Shared by `Rc` between the runtime and its browser callbacks. A callback
/// marks its handle consumed before it touches the runtime, so a callback
/// that finds the runtime busy still leaves the handle free for the next
/// request.
#[derive(Debug, Default)]
pub struct HostHandles {
    frame: Cell<Option<i32>>,
    timer: Cell<Option<ArmedTimer>>,
}

impl HostHandles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The animation frame callback is running.
    pub fn frame_fired(&self) {
        self.frame.set(None);
    }

    /// The timeout callback is running.
    pub fn timer_fired(&self) {
        self.timer.set(None);
    }

    #[must_use]
    pub fn plan_frame(&self, wanted: bool) -> FramePlan {
        plan_frame(self.frame.get(), wanted)
    }

    #[must_use]
    pub fn plan_timer(&self, wanted: Option<Duration>) -> TimerPlan {
        plan_timer(self.timer.get(), wanted)
    }

    pub fn set_frame(&self, handle: Option<i32>) {
        self.frame.set(handle);
    }

    pub fn set_timer(&self, timer: Option<ArmedTimer>) {
        self.timer.set(timer);
    }

    pub fn take_frame(&self) -> Option<i32> {
        self.frame.take()
    }

    pub fn take_timer(&self) -> Option<ArmedTimer> {
        self.timer.take()
    }
}

/// `setTimeout` delay reaching `deadline` from `now`, rounded up to whole
/// milliseconds so the callback never fires before the deadline.
#[must_use]
pub fn timeout_delay_ms(now: Duration, deadline: Duration) -> i32 {
    let micros = deadline.saturating_sub(now).as_micros();
    i32::try_from(micros.div_ceil(1000)).unwrap_or(i32::MAX)
}
