#![forbid(unsafe_code)]

//! [`NavSurface`] over live DOM elements.
//!
//! Section and nav elements are collected once when the tracker starts, in
//! document order. Their geometry is read fresh through
//! `getBoundingClientRect()` on every recompute.

use agora_nav::{NavClass, NavClassNames, NavSurface, SectionExtent, TrackerConfig};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::error::InstallError;

/// Best-effort human-readable text for a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, InstallError> {
    let list = document
        .query_selector_all(selector)
        .map_err(|err| InstallError::Dom(js_error_message(&err)))?;
    Ok((0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub(crate) struct DomSurface {
    window: Window,
    document: Document,
    sections: Vec<Element>,
    nav: Vec<Element>,
    classes: NavClassNames,
    section_attribute: String,
}

impl DomSurface {
    pub(crate) fn query(
        window: Window,
        document: Document,
        config: &TrackerConfig,
    ) -> Result<Self, InstallError> {
        let sections = query_all(&document, &config.section_selector)?;
        let nav = query_all(&document, &config.nav_selector)?;
        debug!(
            sections = sections.len(),
            nav_entries = nav.len(),
            "nav surface collected"
        );
        Ok(Self {
            window,
            document,
            sections,
            nav,
            classes: config.classes.clone(),
            section_attribute: config.section_attribute.clone(),
        })
    }

    pub(crate) fn nav_elements(&self) -> &[Element] {
        &self.nav
    }
}

impl NavSurface for DomSurface {
    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn section_extents(&self) -> Vec<SectionExtent> {
        self.sections
            .iter()
            .map(|section| {
                let rect = section.get_bounding_client_rect();
                SectionExtent::new(section.id(), rect.top(), rect.bottom())
            })
            .collect()
    }

    fn nav_entry_count(&self) -> usize {
        self.nav.len()
    }

    fn nav_entry_section(&self, entry: usize) -> Option<String> {
        self.nav.get(entry)?.get_attribute(&self.section_attribute)
    }

    fn has_class(&self, entry: usize, class: NavClass) -> bool {
        self.nav
            .get(entry)
            .is_some_and(|el| el.class_list().contains(self.classes.name(class)))
    }

    fn add_class(&mut self, entry: usize, class: NavClass) {
        let Some(el) = self.nav.get(entry) else {
            return;
        };
        let name = self.classes.name(class);
        if let Err(err) = el.class_list().add_1(name) {
            warn!(entry, class = name, error = %js_error_message(&err), "classList.add failed");
        }
    }

    fn remove_class(&mut self, entry: usize, class: NavClass) {
        let Some(el) = self.nav.get(entry) else {
            return;
        };
        let name = self.classes.name(class);
        if let Err(err) = el.class_list().remove_1(name) {
            warn!(entry, class = name, error = %js_error_message(&err), "classList.remove failed");
        }
    }

    fn scroll_to_section(&mut self, id: &str) -> bool {
        let Some(target) = self.document.get_element_by_id(id) else {
            return false;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        target.scroll_into_view_with_scroll_into_view_options(&options);
        true
    }

    fn push_fragment(&mut self, id: &str) {
        // pushState never fires `scroll`, so this cannot loop back into a
        // recompute.
        let history = match self.window.history() {
            Ok(history) => history,
            Err(err) => {
                debug!(error = %js_error_message(&err), "history unavailable, fragment not updated");
                return;
            }
        };
        let url = format!("#{id}");
        if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(&url)) {
            debug!(error = %js_error_message(&err), "pushState rejected, fragment not updated");
        }
    }
}
