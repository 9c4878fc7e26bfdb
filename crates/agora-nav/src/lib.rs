#![forbid(unsafe_code)]

//! `agora-nav` keeps a page's navigation bar in step with whatever section
//! fills most of the viewport.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment pushes `scroll`, `resize`
//!   and `click` events, delivers animation-frame ticks, and polls timers.
//! - **Deterministic time**: the host supplies a monotonic `Duration` for
//!   every time-dependent call.
//! - **No DOM binding**: page access goes through [`NavSurface`]. The
//!   `agora-nav-web` crate implements it over `web-sys`; [`HeadlessPage`]
//!   implements it in memory.
//!
//! ```
//! use agora_nav::{HeadlessPage, NavClass, NavSurface, TrackerConfig, ViewportSectionTracker};
//! use core::time::Duration;
//!
//! let page = HeadlessPage::stacked(800.0, &[("hero", 900.0), ("pricing", 900.0)]);
//! let mut tracker = ViewportSectionTracker::new(page, TrackerConfig::default());
//! tracker.init();
//! tracker.on_animation_frame(Duration::from_millis(16));
//! tracker.on_animation_frame(Duration::from_millis(33));
//! assert!(tracker.surface().has_class(0, NavClass::Active));
//! ```

pub mod config;
pub mod geometry;
pub mod headless;
pub mod schedule;
pub mod surface;
pub mod tracker;

pub use config::{ConfigError, NavClassNames, NavPolicy, TrackerConfig};
pub use geometry::{SectionExtent, most_visible, visible_height};
pub use headless::HeadlessPage;
pub use surface::{NavClass, NavSurface};
pub use tracker::{
    ClickIgnored, NavClick, RecomputeOutcome, TrackerState, TrackerStats, ViewportSectionTracker,
};
