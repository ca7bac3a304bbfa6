#![forbid(unsafe_code)]

//! [`Dom`] over the live browser document.
//!
//! Elements are interned into a registry the first time a query returns them;
//! the registry index is the [`NodeId`]. Interning compares by identity, so the
//! same element always maps to the same id.

use folio_core::dom::{Dom, NodeId, Rect, Viewport};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, NodeList,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

pub struct WebDom {
    window: Window,
    document: Document,
    nodes: Vec<Element>,
}

impl WebDom {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            nodes: Vec::new(),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.index())
    }

    /// Id of an element already in the registry.
    pub fn node_of(&self, element: &Element) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|known| known == element)
            .map(|i| NodeId(i as u32))
    }

    fn intern(&mut self, element: Element) -> NodeId {
        if let Some(node) = self.node_of(&element) {
            return node;
        }
        self.nodes.push(element);
        NodeId(self.nodes.len() as u32 - 1)
    }

    fn intern_list(&mut self, list: NodeList) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            if let Some(element) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                out.push(self.intern(element));
            }
        }
        out
    }
}

impl Dom for WebDom {
    fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.intern(element))
    }

    fn query_all(&mut self, selector: &str) -> Vec<NodeId> {
        match self.document.query_selector_all(selector) {
            Ok(list) => self.intern_list(list),
            Err(_) => {
                warn!(selector, "invalid selector");
                Vec::new()
            }
        }
    }

    fn query_within(&mut self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(scope) = self.element(scope).cloned() else {
            return Vec::new();
        };
        match scope.query_selector_all(selector) {
            Ok(list) => self.intern_list(list),
            Err(_) => {
                warn!(selector, "invalid selector");
                Vec::new()
            }
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element(node) {
            if el.set_attribute(name, value).is_err() {
                warn!(name, "setAttribute rejected");
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element(node) {
            el.set_text_content(Some(text));
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.element(node).and_then(|el| el.dyn_ref::<HtmlElement>()) else {
            return;
        };
        if el.style().set_property(property, value).is_err() {
            warn!(property, "style write rejected");
        }
    }

    fn value(&self, node: NodeId) -> String {
        let Some(el) = self.element(node) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        let Some(el) = self.element(node) else {
            return;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        let Some(el) = self.element(node) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        el.scroll_into_view_with_scroll_into_view_options(&options);
        trace!(node = node.0, "smooth scroll");
    }

    fn client_rect(&self, node: NodeId) -> Option<Rect> {
        let rect = self.element(node)?.get_bounding_client_rect();
        Some(Rect::new(rect.top(), rect.bottom()))
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
            height: self
                .window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0),
        }
    }

    fn current_year(&self) -> i32 {
        js_sys::Date::new_0().get_full_year() as i32
    }
}
