#![forbid(unsafe_code)]

//! Deterministic scheduling primitives.
//!
//! None of these own a real timer or animation-frame handle. The host
//! delivers frame ticks and the current monotonic time, and each primitive
//! answers "is my work due now?". This keeps cancellation explicit and makes
//! every schedule testable without a browser.

use core::time::Duration;

// ---------------------------------------------------------------------------
// Frame coalescer
// ---------------------------------------------------------------------------

/// Collapses any number of requests between two frame ticks into one run.
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    pending: bool,
}

impl FrameCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a run on the next frame.
    ///
    /// Returns `true` if this request scheduled a new run, `false` if it was
    /// folded into one that was already pending.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Consume the pending run, if any. Call once per frame tick.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Drop a pending run without executing it.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Fires once after triggers have stopped arriving for a quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record a trigger at `now`, pushing the deadline out to `now + quiet`.
    pub fn trigger(&mut self, now: Duration) -> Duration {
        let deadline = now.saturating_add(self.quiet);
        self.deadline = Some(deadline);
        deadline
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

// ---------------------------------------------------------------------------
// One-shot timer
// ---------------------------------------------------------------------------

/// A single replaceable deadline.
#[derive(Debug, Clone, Default)]
pub struct OneShotTimer {
    deadline: Option<Duration>,
}

impl OneShotTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm for `at`, replacing any earlier deadline.
    pub fn arm(&mut self, at: Duration) {
        self.deadline = Some(at);
    }

    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

// ---------------------------------------------------------------------------
// Frame countdown
// ---------------------------------------------------------------------------

/// Holds a value until a fixed number of frame ticks have elapsed.
///
/// Arming with `frames = 2` from outside a frame releases the value on the
/// second tick that follows, which is the "nested animation frame" pattern:
/// the first tick guarantees the preceding DOM writes were painted.
#[derive(Debug, Clone)]
pub struct FrameCountdown<T> {
    pending: Option<(u8, T)>,
}

impl<T> Default for FrameCountdown<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameCountdown<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Arm with a value, replacing (and dropping) any pending one.
    ///
    /// `frames == 0` is treated as one tick; the value is never released
    /// synchronously.
    pub fn arm(&mut self, frames: u8, value: T) {
        self.pending = Some((frames.max(1), value));
    }

    /// Advance one frame. Returns the value when its countdown reaches zero.
    pub fn tick(&mut self) -> Option<T> {
        let (remaining, _) = self.pending.as_mut()?;
        *remaining -= 1;
        if *remaining == 0 {
            self.pending.take().map(|(_, value)| value)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn coalescer_folds_requests_until_taken() {
        let mut c = FrameCoalescer::new();
        assert!(c.request());
        assert!(!c.request());
        assert!(c.is_pending());

        assert!(c.take());
        assert!(!c.take());
        assert!(c.request());
    }

    #[test]
    fn coalescer_cancel_drops_run() {
        let mut c = FrameCoalescer::new();
        c.request();
        c.cancel();
        assert!(!c.is_pending());
        assert!(!c.take());
    }

    #[test]
    fn debouncer_resets_on_each_trigger() {
        let mut d = Debouncer::new(ms(150));
        d.trigger(ms(0));
        d.trigger(ms(100));
        assert!(!d.fire_if_due(ms(150)));
        assert!(!d.fire_if_due(ms(249)));
        assert!(d.fire_if_due(ms(250)));
        assert!(!d.fire_if_due(ms(400)));
    }

    #[test]
    fn debouncer_cancel_clears_deadline() {
        let mut d = Debouncer::new(ms(150));
        d.trigger(ms(10));
        assert_eq!(d.deadline(), Some(ms(160)));
        d.cancel();
        assert_eq!(d.deadline(), None);
        assert!(!d.fire_if_due(ms(1000)));
    }

    #[test]
    fn one_shot_rearm_replaces_deadline() {
        let mut t = OneShotTimer::new();
        t.arm(ms(400));
        t.arm(ms(900));
        assert!(!t.fire_if_due(ms(500)));
        assert!(t.fire_if_due(ms(900)));
        assert!(!t.fire_if_due(ms(901)));
    }

    #[test]
    fn countdown_releases_on_nth_tick() {
        let mut c = FrameCountdown::new();
        c.arm(2, "b");
        assert_eq!(c.tick(), None);
        assert_eq!(c.tick(), Some("b"));
        assert_eq!(c.tick(), None);
        assert!(!c.is_pending());
    }

    #[test]
    fn countdown_rearm_supersedes_pending_value() {
        let mut c = FrameCountdown::new();
        c.arm(2, 1);
        assert_eq!(c.tick(), None);
        c.arm(2, 7);
        assert_eq!(c.tick(), None);
        assert_eq!(c.tick(), Some(7));
    }

    #[test]
    fn countdown_zero_frames_still_waits_one_tick() {
        let mut c = FrameCountdown::new();
        c.arm(0, ());
        assert!(c.is_pending());
        assert_eq!(c.tick(), Some(()));
    }
}
