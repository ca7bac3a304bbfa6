#![forbid(unsafe_code)]

//! In-memory document implementing [`Dom`].
//!
//! Elements carry a document-space vertical extent instead of real layout.
//! Client rects are derived from it and the current scroll offset, which is
//! all the controller and the observer simulator need.
//!
//! Every style write and scroll request is appended to a write log so tests
//! can assert on side effects that the final state would hide (a width set
//! twice to the same value, for instance).

use std::collections::BTreeMap;

use folio_core::dom::{Dom, NodeId, Rect, Viewport};
use tracing::trace;

use crate::selector::{Matchable, SelectorList, parse_compound};

/// One element of the synthetic tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntheticElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub style: BTreeMap<String, String>,
    pub value: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Document-space `(top, bottom)`; `None` for elements without layout.
    pub layout: Option<(f64, f64)>,
}

impl SyntheticElement {
    #[must_use]
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

impl Matchable for SyntheticElement {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn element_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Side effects recorded by the synthetic page.
#[derive(Debug, Clone, PartialEq)]
pub enum DomWrite {
    Style {
        node: NodeId,
        property: String,
        value: String,
    },
    ScrollIntoView {
        node: NodeId,
    },
}

/// In-memory page.
#[derive(Debug, Clone)]
pub struct SyntheticPage {
    nodes: Vec<SyntheticElement>,
    roots: Vec<NodeId>,
    viewport: Viewport,
    year: i32,
    writes: Vec<DomWrite>,
}

impl SyntheticPage {
    /// Empty page with the given viewport height.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            viewport: Viewport {
                scroll_y: 0.0,
                height: viewport_height,
            },
            year: 2026,
            writes: Vec::new(),
        }
    }

    /// Append an element described by a compound selector, e.g.
    /// `a.nav-link[href="#about"]`. Panics on an invalid description.
    pub fn add(&mut self, parent: Option<NodeId>, description: &str) -> NodeId {
        let compound = match parse_compound(description, description) {
            Ok(c) => c,
            Err(e) => panic!("bad element description: {e}"),
        };
        let id = NodeId(self.nodes.len() as u32);
        let mut attributes = BTreeMap::new();
        for (name, value) in compound.attrs {
            attributes.insert(name, value.unwrap_or_default());
        }
        self.nodes.push(SyntheticElement {
            tag: compound.tag.unwrap_or_else(|| "div".to_string()),
            id: compound.id,
            classes: compound.classes,
            attributes,
            parent,
            ..SyntheticElement::default()
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// [`add`](Self::add) plus a document-space extent.
    pub fn add_laid_out(
        &mut self,
        parent: Option<NodeId>,
        description: &str,
        top: f64,
        bottom: f64,
    ) -> NodeId {
        let id = self.add(parent, description);
        self.nodes[id.index()].layout = Some((top, bottom));
        id
    }

    #[must_use]
    pub fn element(&self, node: NodeId) -> &SyntheticElement {
        &self.nodes[node.index()]
    }

    pub fn element_mut(&mut self, node: NodeId) -> &mut SyntheticElement {
        &mut self.nodes[node.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given id attribute.
    #[must_use]
    pub fn find_id(&self, id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|n| self.element(*n).id.as_deref() == Some(id))
    }

    /// Id attribute of `node`, or `node-<n>` for anonymous elements.
    #[must_use]
    pub fn label(&self, node: NodeId) -> String {
        self.element(node)
            .id
            .clone()
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    pub fn set_scroll(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y.max(0.0);
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport.height = height;
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    #[must_use]
    pub fn writes(&self) -> &[DomWrite] {
        &self.writes
    }

    /// How many times `property` was written on `node`.
    #[must_use]
    pub fn style_write_count(&self, node: NodeId, property: &str) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, DomWrite::Style { node: n, property: p, .. } if *n == node && p == property))
            .count()
    }

    /// Pre-order traversal of the whole tree.
    #[must_use]
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_subtree(*root, &mut out);
        }
        out
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        for child in &self.element(node).children {
            self.collect_subtree(*child, out);
        }
    }

    fn select(&self, candidates: Vec<NodeId>, selector: &str) -> Vec<NodeId> {
        match SelectorList::parse(selector) {
            Ok(list) => candidates
                .into_iter()
                .filter(|n| list.matches(self.element(*n)))
                .collect(),
            Err(e) => {
                trace!(error = %e, "selector rejected");
                Vec::new()
            }
        }
    }

    fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }
}

impl Dom for SyntheticPage {
    fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
        self.find_id(id)
    }

    fn query_all(&mut self, selector: &str) -> Vec<NodeId> {
        self.select(self.document_order(), selector)
    }

    fn query_within(&mut self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        if !self.contains(scope) {
            return Vec::new();
        }
        let mut subtree = Vec::new();
        self.collect_subtree(scope, &mut subtree);
        subtree.remove(0);
        self.select(subtree, selector)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let el = self.nodes.get(node.index())?;
        match name {
            "id" => el.id.clone(),
            "class" => (!el.classes.is_empty()).then(|| el.classes.join(" ")),
            _ => el.attributes.get(name).cloned(),
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.nodes.get_mut(node.index()) else {
            return;
        };
        match name {
            "id" => el.id = Some(value.to_string()),
            "class" => el.classes = value.split_whitespace().map(str::to_string).collect(),
            _ => {
                el.attributes.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.index())
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(node.index()) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(node.index()) {
            el.classes.retain(|c| c != class);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.nodes.get_mut(node.index()) {
            el.text = text.to_string();
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(node.index()) {
            el.style.insert(property.to_string(), value.to_string());
            self.writes.push(DomWrite::Style {
                node,
                property: property.to_string(),
                value: value.to_string(),
            });
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.nodes
            .get(node.index())
            .filter(|el| el.is_form_control())
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.nodes.get_mut(node.index()) {
            if el.is_form_control() {
                el.value = value.to_string();
            }
        }
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        let Some(el) = self.nodes.get(node.index()) else {
            return;
        };
        if let Some((top, _)) = el.layout {
            self.viewport.scroll_y = top.max(0.0);
        }
        self.writes.push(DomWrite::ScrollIntoView { node });
    }

    fn client_rect(&self, node: NodeId) -> Option<Rect> {
        let (top, bottom) = self.nodes.get(node.index())?.layout?;
        let scroll = self.viewport.scroll_y;
        Some(Rect::new(top - scroll, bottom - scroll))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn current_year(&self) -> i32 {
        self.year
    }
}

/// Handles to the interesting elements of [`portfolio`].
#[derive(Debug, Clone)]
pub struct PortfolioNodes {
    pub header: NodeId,
    pub toggle: NodeId,
    pub panel: NodeId,
    /// Nav links in section order: about, education, experience, skills, contact.
    pub links: Vec<NodeId>,
    pub hero_reveal: NodeId,
    /// Sections in page order, same order as `links`.
    pub sections: Vec<NodeId>,
    pub revealables: Vec<NodeId>,
    /// `(container, bar)` pairs inside the skills section.
    pub bars: Vec<(NodeId, NodeId)>,
    pub form: NodeId,
    pub name: NodeId,
    pub email: NodeId,
    pub message: NodeId,
    pub name_error: NodeId,
    pub email_error: NodeId,
    pub message_error: NodeId,
    pub status: NodeId,
    pub year: NodeId,
}

/// Section ids of the stock page, top to bottom.
pub const SECTION_IDS: [&str; 5] = ["about", "education", "experience", "skills", "contact"];

/// Height of every stacked section in [`portfolio`].
pub const SECTION_HEIGHT: f64 = 800.0;

/// Document-space top of the first stacked section.
pub const FIRST_SECTION_TOP: f64 = 1000.0;

/// Percentages configured on the three skill bars.
pub const SKILL_PERCENTAGES: [u8; 3] = [80, 65, 90];

/// The stock portfolio page in a 1000px viewport.
///
/// Layout (document space): header `0..80`, hero `0..1000` with a revealable
/// block at `200..600`, then about/education/experience/skills/contact stacked
/// at 800px each from 1000, footer below. Every section is revealable; the
/// skills section holds three progress bars and the contact section holds the
/// form.
#[must_use]
pub fn portfolio() -> (SyntheticPage, PortfolioNodes) {
    let mut page = SyntheticPage::new(1000.0);

    let header = page.add_laid_out(None, "header#site-header", 0.0, 80.0);
    let toggle = page.add(Some(header), r#"button.nav-toggle[aria-expanded="false"]"#);
    let panel = page.add(Some(header), "nav#site-nav");
    let links = SECTION_IDS
        .iter()
        .map(|id| page.add(Some(panel), &format!(r##"a.nav-link[href="#{id}"]"##)))
        .collect();

    let main = page.add(None, "main");
    let hero = page.add_laid_out(Some(main), "section#hero", 0.0, FIRST_SECTION_TOP);
    let hero_reveal = page.add_laid_out(Some(hero), "div.reveal", 200.0, 600.0);

    let mut sections = Vec::new();
    for (i, id) in SECTION_IDS.iter().enumerate() {
        let top = FIRST_SECTION_TOP + SECTION_HEIGHT * i as f64;
        let node = page.add_laid_out(
            Some(main),
            &format!("section#{id}.reveal"),
            top,
            top + SECTION_HEIGHT,
        );
        sections.push(node);
    }
    let mut revealables = vec![hero_reveal];
    revealables.extend(sections.iter().copied());

    let skills = sections[3];
    let skills_top = FIRST_SECTION_TOP + SECTION_HEIGHT * 3.0;
    let bars = SKILL_PERCENTAGES
        .iter()
        .enumerate()
        .map(|(i, pct)| {
            let top = skills_top + 100.0 + 120.0 * i as f64;
            let container = page.add_laid_out(
                Some(skills),
                &format!(r#"div.progress[data-percentage="{pct}"]"#),
                top,
                top + 40.0,
            );
            let bar = page.add_laid_out(Some(container), "div.progress-bar", top, top + 40.0);
            (container, bar)
        })
        .collect();

    let contact = sections[4];
    let form = page.add(Some(contact), "form#contact-form");
    let name = page.add(Some(form), "input#name");
    let name_error = page.add(Some(form), "span#error-name.error");
    let email = page.add(Some(form), "input#email");
    let email_error = page.add(Some(form), "span#error-email.error");
    let message = page.add(Some(form), "textarea#message");
    let message_error = page.add(Some(form), "span#error-message.error");
    let status = page.add(Some(form), "p#form-status");

    let footer_top = FIRST_SECTION_TOP + SECTION_HEIGHT * SECTION_IDS.len() as f64;
    let footer = page.add_laid_out(None, "footer", footer_top, footer_top + 100.0);
    let year = page.add(Some(footer), "span#year");

    let nodes = PortfolioNodes {
        header,
        toggle,
        panel,
        links,
        hero_reveal,
        sections,
        revealables,
        bars,
        form,
        name,
        email,
        message,
        name_error,
        email_error,
        message_error,
        status,
        year,
    };
    (page, nodes)
}
