#![forbid(unsafe_code)]

//! Viewport coverage measurement.
//!
//! A section's extent is always measured relative to the current viewport
//! (`top == 0.0` is the top edge of the viewport), exactly as
//! `getBoundingClientRect()` reports it. Extents are queried fresh for every
//! recompute and never cached across layout changes.

/// Vertical extent of one trackable section, relative to the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionExtent {
    /// Canonical section identifier (the element's `id`).
    pub id: String,
    /// Top edge in viewport pixels. Negative when scrolled past.
    pub top: f64,
    /// Bottom edge in viewport pixels.
    pub bottom: f64,
}

impl SectionExtent {
    /// Create an extent from viewport-relative edges.
    #[must_use]
    pub fn new(id: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            id: id.into(),
            top,
            bottom,
        }
    }

    /// Visible height of this section inside a viewport of `viewport_height`.
    #[must_use]
    pub fn visible_height(&self, viewport_height: f64) -> f64 {
        visible_height(self.top, self.bottom, viewport_height)
    }
}

/// Height of the `[top, bottom)` band that lies inside `[0, viewport_height)`.
///
/// Non-finite input measures as zero so a detached or collapsed element can
/// never win the scan.
#[must_use]
pub fn visible_height(top: f64, bottom: f64, viewport_height: f64) -> f64 {
    if !top.is_finite() || !bottom.is_finite() || !viewport_height.is_finite() {
        return 0.0;
    }
    let visible_top = top.max(0.0);
    let visible_bottom = bottom.min(viewport_height);
    (visible_bottom - visible_top).max(0.0)
}

/// Index of the section covering the most viewport height.
///
/// Ties resolve to the earliest section in document order: the scan only
/// replaces the current best on a strictly greater height. Returns `None`
/// when nothing is visible at all.
#[must_use]
pub fn most_visible(sections: &[SectionExtent], viewport_height: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_height = 0.0_f64;
    for (index, section) in sections.iter().enumerate() {
        let height = section.visible_height(viewport_height);
        if height > best_height {
            best_height = height;
            best = Some(index);
        }
    }
    best
}
