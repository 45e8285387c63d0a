//! Interactivity classification and highlight-index eligibility.
//!
//! The rules here are the single most behavior-defining piece of the
//! subsystem, so they live in explicit tables rather than inline
//! conditionals. An element is interactive if *any* rule matches; it only
//! becomes addressable (receives a highlight index) if it is also visible
//! and inside the optionally expanded viewport window.

use crate::dom::node::{ElementNode, ViewportInfo};

/// Tags that are interactive by their nature.
pub const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "select", "textarea", "option", "label",
    "details", "summary", "canvas", "dialog",
];

/// ARIA roles that mark an element interactive regardless of tag.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "checkbox", "radio", "tab", "switch", "textbox",
    "combobox", "slider", "searchbox", "menuitem", "option",
];

/// Event-handler-style attributes whose presence implies interactivity.
pub const HANDLER_ATTRIBUTES: &[&str] = &[
    "onclick", "onmousedown", "onmouseup", "onkeydown", "onkeyup", "data-action",
];

/// ARIA state attributes whose presence implies a widget.
pub const STATE_ATTRIBUTES: &[&str] = &[
    "aria-expanded", "aria-pressed", "aria-selected", "aria-checked",
];

/// Computed cursor styles that imply the element reacts to the pointer.
pub const INTERACTIVE_CURSORS: &[&str] = &["pointer", "move", "text", "grab", "cell"];

/// Apply the rule tables to one element.
pub fn is_interactive(element: &ElementNode) -> bool {
    if INTERACTIVE_TAGS.iter().any(|&tag| element.is_tag(tag)) {
        return true;
    }

    if let Some(role) = element.role() {
        if INTERACTIVE_ROLES.contains(&role.trim()) {
            return true;
        }
    }

    if HANDLER_ATTRIBUTES.iter().any(|&attr| element.attribute(attr).is_some()) {
        return true;
    }

    match element.attribute("contenteditable") {
        Some("false") | None => {}
        // "" and "true" both enable editing.
        Some(_) => return true,
    }
    if element.attribute("draggable") == Some("true") {
        return true;
    }

    if element.tabindex().map_or(false, |idx| idx >= 0) {
        return true;
    }

    if STATE_ATTRIBUTES.iter().any(|&attr| element.attribute(attr).is_some()) {
        return true;
    }

    if let Some(cursor) = element.cursor_style.as_deref() {
        if INTERACTIVE_CURSORS.contains(&cursor) {
            return true;
        }
    }

    false
}

/// Decides which interactive elements are addressable in one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct InteractivityClassifier {
    viewport: Option<ViewportInfo>,
    viewport_expansion: i64,
}

impl InteractivityClassifier {
    /// `viewport_expansion` widens the inclusion window by that many pixels
    /// on every side, keeping elements just outside the visible area
    /// addressable ahead of a scroll. A negative value disables viewport
    /// gating entirely.
    pub fn new(viewport: Option<ViewportInfo>, viewport_expansion: i64) -> Self {
        Self { viewport, viewport_expansion }
    }

    /// Whether `element` (already classified) should receive a highlight
    /// index: interactive, visible, and within the expanded viewport.
    pub fn is_addressable(&self, element: &ElementNode) -> bool {
        element.is_interactive && element.is_visible && self.in_expanded_viewport(element)
    }

    fn in_expanded_viewport(&self, element: &ElementNode) -> bool {
        if self.viewport_expansion < 0 {
            return true;
        }
        match (element.bounding_box, self.viewport) {
            (Some(bbox), Some(viewport)) => {
                bbox.intersects_expanded_viewport(viewport, self.viewport_expansion as f64)
            }
            // Without geometry we can only trust the host's own verdict,
            // which was computed against the unexpanded viewport.
            _ => element.is_in_viewport,
        }
    }
}
