#![forbid(unsafe_code)]

//! The seam between the tracker and a page.
//!
//! A [`NavSurface`] is everything the tracker knows about the document: it
//! reads section geometry and nav bindings from it and writes classes back.
//! The browser binding implements it over live DOM elements; tests use
//! [`crate::headless::HeadlessPage`].
//!
//! Implementations must not fail loudly. A lookup that matches nothing
//! returns `None`/`false`, and a write that the page rejects is dropped.

use crate::geometry::SectionExtent;

/// A class the tracker may write on a nav entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NavClass {
    Active,
    BeforeActive,
    AfterActive,
    Transitioning,
}

impl NavClass {
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::BeforeActive,
        Self::AfterActive,
        Self::Transitioning,
    ];
}

/// Page access needed by [`crate::ViewportSectionTracker`].
pub trait NavSurface {
    /// Current viewport height in CSS pixels.
    fn viewport_height(&self) -> f64;

    /// Every trackable section in document order, measured now.
    fn section_extents(&self) -> Vec<SectionExtent>;

    /// Number of nav entries.
    fn nav_entry_count(&self) -> usize;

    /// Section id bound to nav entry `entry`, if it carries one.
    fn nav_entry_section(&self, entry: usize) -> Option<String>;

    fn has_class(&self, entry: usize, class: NavClass) -> bool;

    fn add_class(&mut self, entry: usize, class: NavClass);

    fn remove_class(&mut self, entry: usize, class: NavClass);

    /// Smoothly scroll section `id` so its top edge aligns with the viewport.
    ///
    /// Returns `false` if no such section exists.
    fn scroll_to_section(&mut self, id: &str) -> bool;

    /// Set the address fragment to `#id` without scrolling.
    fn push_fragment(&mut self, id: &str);

    /// First nav entry (in nav order) bound to `section`.
    fn nav_entry_for(&self, section: &str) -> Option<usize> {
        (0..self.nav_entry_count())
            .find(|&entry| self.nav_entry_section(entry).as_deref() == Some(section))
    }
}
