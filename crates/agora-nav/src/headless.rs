#![forbid(unsafe_code)]

//! In-memory page for native hosts and tests.
//!
//! Sections are laid out at absolute document offsets; the page keeps a
//! scroll position and reports extents relative to it, the same way
//! `getBoundingClientRect()` does. Click-initiated scrolls jump straight to
//! the target (there is no animation), and the page records them so a test
//! can feed the resulting `scroll` event back to the tracker itself.

use std::collections::BTreeSet;

use crate::geometry::SectionExtent;
use crate::surface::{NavClass, NavSurface};

#[derive(Debug, Clone, PartialEq)]
struct HeadlessSection {
    id: String,
    offset_top: f64,
    height: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct HeadlessNavEntry {
    section: Option<String>,
    classes: BTreeSet<NavClass>,
}

/// A page that exists only in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessPage {
    viewport_height: f64,
    scroll_y: f64,
    sections: Vec<HeadlessSection>,
    nav: Vec<HeadlessNavEntry>,
    fragment: Option<String>,
    class_writes: u64,
    scroll_requests: Vec<String>,
}

impl HeadlessPage {
    /// Empty page with the given viewport height, scrolled to the top.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            scroll_y: 0.0,
            sections: Vec::new(),
            nav: Vec::new(),
            fragment: None,
            class_writes: 0,
            scroll_requests: Vec::new(),
        }
    }

    /// Sections stacked back to back from offset 0, each with a matching
    /// nav entry in the same order.
    #[must_use]
    pub fn stacked(viewport_height: f64, sections: &[(&str, f64)]) -> Self {
        let mut page = Self::new(viewport_height);
        let mut offset = 0.0;
        for &(id, height) in sections {
            page.push_section(id, offset, height);
            page.push_nav_entry(Some(id));
            offset += height;
        }
        page
    }

    /// Append a section at an absolute document offset.
    pub fn push_section(&mut self, id: impl Into<String>, offset_top: f64, height: f64) {
        self.sections.push(HeadlessSection {
            id: id.into(),
            offset_top,
            height,
        });
    }

    /// Append a nav entry, optionally bound to a section id.
    pub fn push_nav_entry(&mut self, section: Option<&str>) {
        self.nav.push(HeadlessNavEntry {
            section: section.map(str::to_owned),
            classes: BTreeSet::new(),
        });
    }

    /// Remove the binding attribute from nav entry `entry`.
    pub fn unbind_nav_entry(&mut self, entry: usize) {
        if let Some(nav) = self.nav.get_mut(entry) {
            nav.section = None;
        }
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    #[must_use]
    pub const fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
    }

    /// Current address fragment, without the leading `#`.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Classes currently on nav entry `entry`, in a stable order.
    #[must_use]
    pub fn classes(&self, entry: usize) -> Vec<NavClass> {
        self.nav
            .get(entry)
            .map(|nav| nav.classes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Indexes of every entry carrying `Active`.
    #[must_use]
    pub fn active_entries(&self) -> Vec<usize> {
        self.nav
            .iter()
            .enumerate()
            .filter(|(_, nav)| nav.classes.contains(&NavClass::Active))
            .map(|(index, _)| index)
            .collect()
    }

    /// Total class additions and removals this page has received.
    #[must_use]
    pub const fn class_writes(&self) -> u64 {
        self.class_writes
    }

    /// Section ids passed to [`NavSurface::scroll_to_section`], oldest first.
    #[must_use]
    pub fn scroll_requests(&self) -> &[String] {
        &self.scroll_requests
    }
}

impl NavSurface for HeadlessPage {
    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn section_extents(&self) -> Vec<SectionExtent> {
        self.sections
            .iter()
            .map(|s| {
                let top = s.offset_top - self.scroll_y;
                SectionExtent::new(s.id.clone(), top, top + s.height)
            })
            .collect()
    }

    fn nav_entry_count(&self) -> usize {
        self.nav.len()
    }

    fn nav_entry_section(&self, entry: usize) -> Option<String> {
        self.nav.get(entry)?.section.clone()
    }

    fn has_class(&self, entry: usize, class: NavClass) -> bool {
        self.nav
            .get(entry)
            .is_some_and(|nav| nav.classes.contains(&class))
    }

    fn add_class(&mut self, entry: usize, class: NavClass) {
        if let Some(nav) = self.nav.get_mut(entry) {
            nav.classes.insert(class);
            self.class_writes += 1;
        }
    }

    fn remove_class(&mut self, entry: usize, class: NavClass) {
        if let Some(nav) = self.nav.get_mut(entry) {
            nav.classes.remove(&class);
            self.class_writes += 1;
        }
    }

    fn scroll_to_section(&mut self, id: &str) -> bool {
        let Some(section) = self.sections.iter().find(|s| s.id == id) else {
            return false;
        };
        self.scroll_y = section.offset_top;
        self.scroll_requests.push(id.to_owned());
        true
    }

    fn push_fragment(&mut self, id: &str) {
        self.fragment = Some(id.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extents_follow_scroll_position() {
        let mut page = HeadlessPage::stacked(800.0, &[("a", 500.0), ("b", 700.0)]);
        assert_eq!(
            page.section_extents(),
            vec![
                SectionExtent::new("a", 0.0, 500.0),
                SectionExtent::new("b", 500.0, 1200.0),
            ]
        );
        page.set_scroll_y(300.0);
        assert_eq!(page.section_extents()[0], SectionExtent::new("a", -300.0, 200.0));
    }

    #[test]
    fn scroll_to_section_jumps_and_records() {
        let mut page = HeadlessPage::stacked(800.0, &[("a", 500.0), ("b", 700.0)]);
        assert!(page.scroll_to_section("b"));
        assert_eq!(page.scroll_y(), 500.0);
        assert!(!page.scroll_to_section("missing"));
        assert_eq!(page.scroll_requests().to_vec(), vec!["b".to_owned()]);
    }

    #[test]
    fn out_of_range_entries_are_inert() {
        let mut page = HeadlessPage::new(800.0);
        page.add_class(3, NavClass::Active);
        assert!(!page.has_class(3, NavClass::Active));
        assert_eq!(page.class_writes(), 0);
        assert_eq!(page.nav_entry_section(3), None);
        assert!(page.classes(3).is_empty());
    }

    #[test]
    fn nav_entry_lookup_takes_first_binding() {
        let mut page = HeadlessPage::new(800.0);
        page.push_nav_entry(None);
        page.push_nav_entry(Some("a"));
        page.push_nav_entry(Some("a"));
        assert_eq!(page.nav_entry_for("a"), Some(1));
        assert_eq!(page.nav_entry_for("b"), None);
    }
}
