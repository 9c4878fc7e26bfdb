#![forbid(unsafe_code)]

//! Viewport-to-navigation synchronization.
//!
//! [`ViewportSectionTracker`] owns the page's [`TrackerState`] and a
//! [`NavSurface`]. The host feeds it raw events (`scroll`, `resize`,
//! `click`), frame ticks and timer polls; the tracker decides when to
//! recompute and which classes to write.
//!
//! # Host loop
//!
//! After delivering any input, the host asks:
//! - [`ViewportSectionTracker::wants_animation_frame`]: deliver
//!   [`ViewportSectionTracker::on_animation_frame`] on the next paint.
//! - [`ViewportSectionTracker::next_deadline`]: call
//!   [`ViewportSectionTracker::poll_timers`] once that time is reached.
//!
//! Both are cheap and may be asked as often as convenient.

use core::time::Duration;

use tracing::{debug, trace};

use crate::config::{NavPolicy, TrackerConfig};
use crate::geometry::most_visible;
use crate::schedule::{Debouncer, FrameCoalescer, FrameCountdown, OneShotTimer};
use crate::surface::{NavClass, NavSurface};

/// Page-lifetime tracker state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    /// Id of the section judged most visible, or `None` if nothing is.
    pub active: Option<String>,
}

/// Counters for host instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Recompute passes run, including no-op passes.
    pub recomputes: u64,
    /// Passes that changed the active section id.
    pub changes: u64,
    /// Deferred `active` classes actually applied.
    pub activations: u64,
    /// Scroll events absorbed into an already scheduled recompute.
    pub coalesced_scrolls: u64,
    pub resize_events: u64,
    pub clicks: u64,
    /// Clicks on entries with no usable target.
    pub ignored_clicks: u64,
    /// Individual class additions/removals written to the surface.
    pub class_writes: u64,
}

/// Result of one recompute pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// The active section did not change; nothing was written.
    Unchanged,
    /// The active section changed to `active`.
    ///
    /// `entry` is the nav entry bound to it, if any. Without an entry every
    /// nav class is cleared.
    Changed {
        active: Option<String>,
        entry: Option<usize>,
    },
}

/// Result of a nav entry click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavClick {
    /// Scrolling toward `section` was started and the fragment updated.
    Navigated { section: String },
    /// The click had no usable target. Default navigation is still
    /// suppressed by the host.
    Ignored(ClickIgnored),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickIgnored {
    NoSuchEntry,
    Unbound,
    SectionNotFound,
}

/// Keeps exactly one nav entry marked active, matching the most visible
/// section.
#[derive(Debug)]
pub struct ViewportSectionTracker<S> {
    surface: S,
    config: TrackerConfig,
    state: TrackerState,
    stats: TrackerStats,
    initialized: bool,
    scroll_frame: FrameCoalescer,
    resize: Debouncer,
    activation: FrameCountdown<usize>,
    settle: OneShotTimer,
}

impl<S: NavSurface> ViewportSectionTracker<S> {
    #[must_use]
    pub fn new(surface: S, config: TrackerConfig) -> Self {
        let resize = Debouncer::new(config.resize_quiet());
        Self {
            surface,
            config,
            state: TrackerState::default(),
            stats: TrackerStats::default(),
            initialized: false,
            scroll_frame: FrameCoalescer::new(),
            resize,
            activation: FrameCountdown::new(),
            settle: OneShotTimer::new(),
        }
    }

    /// Run the initial recompute. Later calls are no-ops.
    pub fn init(&mut self) -> RecomputeOutcome {
        if self.initialized {
            return RecomputeOutcome::Unchanged;
        }
        self.initialized = true;
        debug!(
            policy = ?self.config.policy(),
            nav_entries = self.surface.nav_entry_count(),
            "nav tracker initialized"
        );
        self.recompute_active_section()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn active_section(&self) -> Option<&str> {
        self.state.active.as_deref()
    }

    #[must_use]
    pub const fn stats(&self) -> TrackerStats {
        self.stats
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable page access, e.g. for a host that simulates scrolling.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    /// A `scroll` event arrived. Schedules at most one recompute per frame.
    pub fn on_scroll(&mut self) {
        if !self.scroll_frame.request() {
            self.stats.coalesced_scrolls += 1;
            trace!("scroll coalesced into pending frame");
        }
    }

    /// A `resize` event arrived at `now`. Restarts the quiet period.
    pub fn on_resize(&mut self, now: Duration) {
        self.stats.resize_events += 1;
        let deadline = self.resize.trigger(now);
        trace!(?deadline, "resize debounce reset");
    }

    /// An animation frame is being rendered at `now`.
    ///
    /// A pending activation ticks before the coalesced recompute runs, so an
    /// activation scheduled by this frame's recompute waits for later frames.
    pub fn on_animation_frame(&mut self, now: Duration) {
        if let Some(entry) = self.activation.tick() {
            self.apply_activation(entry, now);
        }
        if self.scroll_frame.take() {
            self.recompute_active_section();
        }
    }

    /// Fire any timers due at `now`.
    pub fn poll_timers(&mut self, now: Duration) {
        if self.resize.fire_if_due(now) {
            trace!("resize settled");
            self.recompute_active_section();
        }
        if self.settle.fire_if_due(now) {
            self.clear_transitioning();
        }
    }

    /// A nav entry was clicked.
    ///
    /// Starts a smooth scroll to the bound section and updates the address
    /// fragment. Does not recompute: the scroll it starts produces its own
    /// `scroll` events.
    pub fn on_nav_entry_click(&mut self, entry: usize) -> NavClick {
        self.stats.clicks += 1;
        let outcome = self.navigate(entry);
        if let NavClick::Ignored(reason) = &outcome {
            self.stats.ignored_clicks += 1;
            debug!(entry, ?reason, "nav click ignored");
        }
        outcome
    }

    fn navigate(&mut self, entry: usize) -> NavClick {
        if entry >= self.surface.nav_entry_count() {
            return NavClick::Ignored(ClickIgnored::NoSuchEntry);
        }
        let Some(section) = self.surface.nav_entry_section(entry) else {
            return NavClick::Ignored(ClickIgnored::Unbound);
        };
        if !self.surface.scroll_to_section(&section) {
            return NavClick::Ignored(ClickIgnored::SectionNotFound);
        }
        self.surface.push_fragment(&section);
        debug!(entry, section = %section, "nav click scrolling to section");
        NavClick::Navigated { section }
    }

    /// Whether the host must deliver a frame tick on the next paint.
    #[must_use]
    pub fn wants_animation_frame(&self) -> bool {
        self.scroll_frame.is_pending() || self.activation.is_pending()
    }

    /// Earliest time [`Self::poll_timers`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.resize.deadline(), self.settle.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop every pending frame and timer. Classes already written stay.
    pub fn cancel_pending(&mut self) {
        self.scroll_frame.cancel();
        self.resize.cancel();
        self.activation.cancel();
        self.settle.cancel();
    }

    // -----------------------------------------------------------------------
    // Recompute
    // -----------------------------------------------------------------------

    /// Measure every section and resynchronize the nav if the winner changed.
    pub fn recompute_active_section(&mut self) -> RecomputeOutcome {
        self.stats.recomputes += 1;

        let extents = self.surface.section_extents();
        let viewport_height = self.surface.viewport_height();
        let next = most_visible(&extents, viewport_height).map(|i| extents[i].id.clone());

        if next == self.state.active {
            trace!(active = ?self.state.active, "active section unchanged");
            return RecomputeOutcome::Unchanged;
        }

        debug!(from = ?self.state.active, to = ?next, "active section changed");
        self.stats.changes += 1;
        self.state.active = next;

        let entry = self
            .state
            .active
            .as_deref()
            .and_then(|id| self.surface.nav_entry_for(id));

        match entry {
            Some(entry) => self.begin_activation(entry),
            None => self.clear_all(),
        }

        RecomputeOutcome::Changed {
            active: self.state.active.clone(),
            entry,
        }
    }

    fn begin_activation(&mut self, target: usize) {
        // A settle left over from the previous activation must not end this
        // transition early.
        self.settle.cancel();
        let count = self.surface.nav_entry_count();
        match self.config.policy() {
            NavPolicy::Simple => {
                for entry in (0..count).filter(|&e| e != target) {
                    self.set_class(entry, NavClass::Active, false);
                }
            }
            NavPolicy::Directional => {
                for entry in 0..count {
                    self.set_class(entry, NavClass::Transitioning, true);
                }
                for entry in 0..count {
                    self.set_class(entry, NavClass::Active, false);
                    self.set_class(entry, NavClass::BeforeActive, entry < target);
                    self.set_class(entry, NavClass::AfterActive, entry > target);
                }
            }
        }
        self.activation.arm(self.config.activation_frames, target);
    }

    fn apply_activation(&mut self, entry: usize, now: Duration) {
        // The nav may have shrunk since the activation was armed.
        if entry >= self.surface.nav_entry_count() {
            return;
        }
        self.set_class(entry, NavClass::Active, true);
        self.stats.activations += 1;
        if self.config.policy() == NavPolicy::Directional {
            self.settle.arm(now.saturating_add(self.config.settle_delay()));
        }
        trace!(entry, "active class applied");
    }

    fn clear_all(&mut self) {
        self.activation.cancel();
        self.settle.cancel();
        for entry in 0..self.surface.nav_entry_count() {
            for class in NavClass::ALL {
                self.set_class(entry, class, false);
            }
        }
    }

    fn clear_transitioning(&mut self) {
        for entry in 0..self.surface.nav_entry_count() {
            self.set_class(entry, NavClass::Transitioning, false);
        }
        trace!("nav transition settled");
    }

    /// Write `class` only when the entry's current state differs.
    fn set_class(&mut self, entry: usize, class: NavClass, on: bool) {
        if self.surface.has_class(entry, class) == on {
            return;
        }
        if on {
            self.surface.add_class(entry, class);
        } else {
            self.surface.remove_class(entry, class);
        }
        self.stats.class_writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn page() -> HeadlessPage {
        HeadlessPage::stacked(800.0, &[("hero", 900.0), ("features", 900.0), ("pricing", 900.0)])
    }

    #[test]
    fn init_runs_once() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        assert_eq!(
            tracker.init(),
            RecomputeOutcome::Changed {
                active: Some("hero".to_owned()),
                entry: Some(0),
            }
        );
        assert_eq!(tracker.init(), RecomputeOutcome::Unchanged);
        assert_eq!(tracker.stats().recomputes, 1);
        assert!(tracker.is_initialized());
    }

    #[test]
    fn active_class_waits_two_frames() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        tracker.init();
        assert!(!tracker.surface().has_class(0, NavClass::Active));
        assert!(tracker.wants_animation_frame());

        tracker.on_animation_frame(ms(16));
        assert!(!tracker.surface().has_class(0, NavClass::Active));

        tracker.on_animation_frame(ms(32));
        assert!(tracker.surface().has_class(0, NavClass::Active));
        assert!(!tracker.wants_animation_frame());
        assert_eq!(tracker.stats().activations, 1);
    }

    #[test]
    fn settle_timer_clears_transitioning_after_activation() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        tracker.init();
        assert!(tracker.surface().has_class(2, NavClass::Transitioning));
        assert_eq!(tracker.next_deadline(), None);

        tracker.on_animation_frame(ms(16));
        tracker.on_animation_frame(ms(32));
        assert_eq!(tracker.next_deadline(), Some(ms(432)));

        tracker.poll_timers(ms(431));
        assert!(tracker.surface().has_class(2, NavClass::Transitioning));
        tracker.poll_timers(ms(432));
        for entry in 0..3 {
            assert!(!tracker.surface().has_class(entry, NavClass::Transitioning));
        }
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn superseded_activation_never_lands() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        tracker.init();
        tracker.on_animation_frame(ms(16));

        // Jump to pricing before hero's activation lands.
        tracker.surface_mut().set_scroll_y(1800.0);
        tracker.recompute_active_section();
        tracker.on_animation_frame(ms(32));
        tracker.on_animation_frame(ms(48));

        assert!(!tracker.surface().has_class(0, NavClass::Active));
        assert!(tracker.surface().has_class(2, NavClass::Active));
        assert_eq!(tracker.surface().active_entries(), vec![2]);
    }

    #[test]
    fn earlier_settle_cannot_end_a_later_transition() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        tracker.init();
        tracker.on_animation_frame(ms(16));
        tracker.on_animation_frame(ms(32));
        assert_eq!(tracker.next_deadline(), Some(ms(432)));

        // New transition starts just before hero's settle was due.
        tracker.surface_mut().set_scroll_y(1800.0);
        tracker.on_scroll();
        tracker.on_animation_frame(ms(420));
        assert_eq!(tracker.state().active.as_deref(), Some("pricing"));
        assert!(tracker.wants_animation_frame());
        assert_eq!(tracker.next_deadline(), None);

        tracker.poll_timers(ms(432));
        let transitioning = (0..3)
            .filter(|&e| tracker.surface().has_class(e, NavClass::Transitioning))
            .count();
        assert_eq!(transitioning, 3);

        // Pricing lands and re-arms the settle from its own activation.
        tracker.on_animation_frame(ms(436));
        tracker.on_animation_frame(ms(452));
        assert_eq!(tracker.surface().active_entries(), vec![2]);
        assert_eq!(tracker.next_deadline(), Some(ms(852)));

        tracker.poll_timers(ms(851));
        assert!(tracker.surface().has_class(0, NavClass::Transitioning));
        tracker.poll_timers(ms(852));
        assert!((0..3).all(|e| !tracker.surface().has_class(e, NavClass::Transitioning)));
    }

    #[test]
    fn section_without_nav_entry_clears_everything() {
        let mut page = page();
        page.unbind_nav_entry(1);
        let mut tracker = ViewportSectionTracker::new(page, TrackerConfig::default());
        tracker.init();
        tracker.on_animation_frame(ms(16));
        tracker.on_animation_frame(ms(32));

        tracker.surface_mut().set_scroll_y(900.0);
        let outcome = tracker.recompute_active_section();
        assert_eq!(
            outcome,
            RecomputeOutcome::Changed {
                active: Some("features".to_owned()),
                entry: None,
            }
        );
        for entry in 0..3 {
            assert!(tracker.surface().classes(entry).is_empty());
        }
        assert_eq!(tracker.next_deadline(), None);
        assert!(!tracker.wants_animation_frame());
    }

    #[test]
    fn click_on_unbound_entry_is_ignored() {
        let mut page = page();
        page.unbind_nav_entry(1);
        let mut tracker = ViewportSectionTracker::new(page, TrackerConfig::default());
        assert_eq!(
            tracker.on_nav_entry_click(1),
            NavClick::Ignored(ClickIgnored::Unbound)
        );
        assert_eq!(
            tracker.on_nav_entry_click(9),
            NavClick::Ignored(ClickIgnored::NoSuchEntry)
        );
        assert_eq!(tracker.stats().ignored_clicks, 2);
        assert_eq!(tracker.surface().fragment(), None);
    }

    #[test]
    fn click_on_missing_section_is_ignored() {
        let mut page = page();
        page.push_nav_entry(Some("faq"));
        let mut tracker = ViewportSectionTracker::new(page, TrackerConfig::default());
        assert_eq!(
            tracker.on_nav_entry_click(3),
            NavClick::Ignored(ClickIgnored::SectionNotFound)
        );
        assert_eq!(tracker.surface().fragment(), None);
    }

    #[test]
    fn resize_and_settle_deadlines_merge() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        tracker.init();
        tracker.on_animation_frame(ms(0));
        tracker.on_animation_frame(ms(16));
        tracker.on_resize(ms(20));
        assert_eq!(tracker.next_deadline(), Some(ms(170)));
        tracker.poll_timers(ms(170));
        assert_eq!(tracker.next_deadline(), Some(ms(416)));
    }

    #[test]
    fn cancel_pending_drops_all_schedules() {
        let mut tracker = ViewportSectionTracker::new(page(), TrackerConfig::default());
        tracker.init();
        tracker.on_scroll();
        tracker.on_resize(ms(0));
        tracker.cancel_pending();
        assert!(!tracker.wants_animation_frame());
        assert_eq!(tracker.next_deadline(), None);
    }
}
