#![forbid(unsafe_code)]

//! The document seam.
//!
//! [`Dom`] is the only way the controller touches the page. The browser
//! binding implements it over `web_sys`, the harness implements it over an
//! in-memory tree. Elements are addressed by opaque [`NodeId`] handles that the
//! implementation hands out from its lookups.
//!
//! Every lookup is fallible by returning `Option`/empty `Vec`: a page that lacks
//! some element simply disables the feature that needed it.

use serde::{Deserialize, Serialize};

/// Opaque handle for an element owned by a [`Dom`] implementation.
///
/// Handles are stable for the lifetime of the implementation: looking the same
/// element up twice yields the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Vertical extent of an element relative to the viewport top (CSS pixels).
///
/// Mirrors the `top`/`bottom` pair of `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }
}

/// Scroll position and size of the visual viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// `window.scrollY`.
    pub scroll_y: f64,
    /// `window.innerHeight`.
    pub height: f64,
}

/// Document access used by [`crate::controller::PageController`].
pub trait Dom {
    /// `document.getElementById(id)`.
    fn element_by_id(&mut self, id: &str) -> Option<NodeId>;

    /// `document.querySelectorAll(selector)` in document order.
    fn query_all(&mut self, selector: &str) -> Vec<NodeId>;

    /// `scope.querySelectorAll(selector)`, descendants only.
    fn query_within(&mut self, scope: NodeId, selector: &str) -> Vec<NodeId>;

    /// `document.querySelector(selector)`.
    fn query(&mut self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Replace the element's text content.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Set an inline style property (`element.style[property] = value`).
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Current value of a form control; empty for anything else.
    fn value(&self, node: NodeId) -> String;

    fn set_value(&mut self, node: NodeId, value: &str);

    /// Smooth, top-aligned `scrollIntoView`.
    fn scroll_into_view(&mut self, node: NodeId);

    /// Client rect of the element, `None` when it is not laid out.
    fn client_rect(&self, node: NodeId) -> Option<Rect>;

    fn viewport(&self) -> Viewport;

    /// Local calendar year, used for the footer stamp.
    fn current_year(&self) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_height_never_negative() {
        assert_eq!(Rect::new(10.0, 60.0).height(), 50.0);
        assert_eq!(Rect::new(60.0, 10.0).height(), 0.0);
    }

    #[test]
    fn node_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&NodeId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
