#![forbid(unsafe_code)]

//! The page interaction controller.
//!
//! [`PageController`] is built once against a [`Dom`] and then receives every
//! page event from the host:
//!
//! | Host event | Method |
//! |---|---|
//! | toggle `click` | [`PageController::on_toggle_click`] |
//! | document `keydown` | [`PageController::on_key_down`] |
//! | nav link `click` | [`PageController::on_link_click`] |
//! | observer callback | [`PageController::on_visibility`] |
//! | form `submit` / `reset` | [`PageController::on_submit`] / [`PageController::on_reset`] |
//! | window `scroll` | [`PageController::on_scroll`] then [`PageController::on_animation_frame`] |
//! | window `load` | [`PageController::on_load`] |
//! | timer wakeup | [`PageController::advance_time`] |
//!
//! Every flag the page shows through classes and attributes is mirrored in
//! [`PageState`]; the DOM writes follow from state changes, never the reverse.
//! Work the host has to perform on the controller's behalf (unobserving a
//! target) is queued as [`HostRequest`]s and drained with
//! [`PageController::drain_requests`].

use core::time::Duration;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ConfigError, PageConfig};
use crate::dom::{Dom, NodeId};
use crate::form::{self, ContactField, ContactSubmission};
use crate::frame::{FrameCoalescer, FrameRequest, FrameToken};
use crate::observer::{ObserverKind, ObserverSpec, VisibilityEntry};
use crate::progress::parse_percentage;
use crate::timers::{DeferredTask, TimerQueue};

/// Whether the host should call `preventDefault()` on the DOM event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    PreventDefault,
    Ignored,
}

/// Work the host performs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostRequest {
    /// Stop observing `target` on the given observer.
    Unobserve {
        observer: ObserverKind,
        target: NodeId,
    },
}

/// A progress container and its bar, when it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSlot {
    pub container: NodeId,
    pub bar: Option<NodeId>,
}

/// Elements acquired at attach time. Absent elements disable their feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageElements {
    pub nav_toggle: Option<NodeId>,
    pub nav_panel: Option<NodeId>,
    pub nav_links: Vec<NodeId>,
    pub revealables: Vec<NodeId>,
    pub progress: Vec<ProgressSlot>,
    pub form: Option<NodeId>,
    pub status: Option<NodeId>,
    pub name_input: Option<NodeId>,
    pub email_input: Option<NodeId>,
    pub message_input: Option<NodeId>,
    pub error_slots: BTreeMap<ContactField, NodeId>,
    /// Every element matching the error selector plus the three known slots.
    pub all_error_slots: Vec<NodeId>,
    pub year: Option<NodeId>,
    pub header: Option<NodeId>,
    pub spy_sections: Vec<NodeId>,
    pub skills: Option<NodeId>,
}

impl PageElements {
    fn acquire<D: Dom>(dom: &mut D, config: &PageConfig) -> Self {
        let sel = &config.selectors;

        let progress = dom
            .query_all(&sel.progress)
            .into_iter()
            .map(|container| {
                let bar = dom
                    .query_within(container, &sel.progress_bar)
                    .into_iter()
                    .next();
                ProgressSlot { container, bar }
            })
            .collect();

        let mut error_slots = BTreeMap::new();
        for (field, id) in [
            (ContactField::Name, &sel.name_error_id),
            (ContactField::Email, &sel.email_error_id),
            (ContactField::Message, &sel.message_error_id),
        ] {
            if let Some(node) = dom.element_by_id(id) {
                error_slots.insert(field, node);
            }
        }
        let mut all_error_slots = dom.query_all(&sel.error);
        for node in error_slots.values() {
            if !all_error_slots.contains(node) {
                all_error_slots.push(*node);
            }
        }

        let spy_sections = sel
            .spy_sections
            .iter()
            .filter_map(|id| dom.element_by_id(id))
            .collect();

        Self {
            nav_toggle: dom.query(&sel.nav_toggle),
            nav_panel: dom.element_by_id(&sel.nav_panel_id),
            nav_links: dom.query_all(&sel.nav_link),
            revealables: dom.query_all(&sel.reveal),
            progress,
            form: dom.element_by_id(&sel.form_id),
            status: dom.element_by_id(&sel.status_id),
            name_input: dom.element_by_id(&sel.name_id),
            email_input: dom.element_by_id(&sel.email_id),
            message_input: dom.element_by_id(&sel.message_id),
            error_slots,
            all_error_slots,
            year: dom.element_by_id(&sel.year_id),
            header: dom.element_by_id(&sel.header_id),
            spy_sections,
            skills: dom.element_by_id(&sel.skills_id),
        }
    }
}

/// Outcome of the most recent contact form submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Idle,
    Rejected,
    Sent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub status: FormStatus,
    /// Messages currently shown in the per-field error slots.
    pub errors: BTreeMap<ContactField, String>,
}

/// Explicit mirror of everything the controller reflects into the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub nav_open: bool,
    /// Revealed elements. Only ever grows.
    pub revealed: BTreeSet<NodeId>,
    /// Bars marked filled. Only ever grows.
    pub filled: BTreeSet<NodeId>,
    /// Widths actually applied, keyed by bar.
    pub bar_widths: BTreeMap<NodeId, u8>,
    /// The nav link currently carrying the active class.
    pub active_link: Option<NodeId>,
    pub header_scrolled: bool,
    pub form: FormState,
    pub initialized: bool,
    pub loaded: bool,
}

/// Serializable view of the controller for hosts and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub now_ms: u64,
    pub state: PageState,
    pub pending_timers: usize,
    pub observed_reveal: usize,
    pub observed_spy: usize,
}

/// Page interaction controller.
#[derive(Debug)]
pub struct PageController {
    config: PageConfig,
    reveal_spec: ObserverSpec,
    spy_spec: ObserverSpec,
    elements: PageElements,
    state: PageState,
    timers: TimerQueue,
    frames: FrameCoalescer,
    reveal_watch: BTreeSet<NodeId>,
    spy_watch: BTreeSet<NodeId>,
    requests: Vec<HostRequest>,
}

impl PageController {
    /// Validate `config` and acquire the page's elements.
    ///
    /// Nothing is written to the page yet; call [`init`](Self::init) once the
    /// host has registered its listeners.
    pub fn attach<D: Dom>(dom: &mut D, config: PageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let reveal_spec = config.reveal_observer.compile()?;
        let spy_spec = config.spy_observer.compile()?;
        let elements = PageElements::acquire(dom, &config);

        // The panel's open class is authoritative; the toggle attribute only
        // stands in when there is no panel.
        let nav_open = match elements.nav_panel {
            Some(panel) => dom.has_class(panel, &config.markers.open_class),
            None => elements
                .nav_toggle
                .and_then(|t| dom.attribute(t, &config.markers.expanded_attr))
                .is_some_and(|v| v == "true"),
        };

        debug!(
            nav_links = elements.nav_links.len(),
            revealables = elements.revealables.len(),
            progress = elements.progress.len(),
            spy_sections = elements.spy_sections.len(),
            has_form = elements.form.is_some(),
            "page controller attached"
        );

        Ok(Self {
            reveal_watch: elements.revealables.iter().copied().collect(),
            spy_watch: elements.spy_sections.iter().copied().collect(),
            config,
            reveal_spec,
            spy_spec,
            elements,
            state: PageState {
                nav_open,
                ..PageState::default()
            },
            timers: TimerQueue::new(),
            frames: FrameCoalescer::new(),
            requests: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn elements(&self) -> &PageElements {
        &self.elements
    }

    #[must_use]
    pub fn state(&self) -> &PageState {
        &self.state
    }

    #[must_use]
    pub fn observer_spec(&self, kind: ObserverKind) -> ObserverSpec {
        match kind {
            ObserverKind::Reveal => self.reveal_spec,
            ObserverKind::Spy => self.spy_spec,
        }
    }

    /// Targets currently watched by `kind`, in id order.
    #[must_use]
    pub fn observed(&self, kind: ObserverKind) -> Vec<NodeId> {
        self.watch(kind).iter().copied().collect()
    }

    fn watch(&self, kind: ObserverKind) -> &BTreeSet<NodeId> {
        match kind {
            ObserverKind::Reveal => &self.reveal_watch,
            ObserverKind::Spy => &self.spy_watch,
        }
    }

    /// Take the queued host requests.
    pub fn drain_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Earliest time [`advance_time`](Self::advance_time) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            now_ms: u64::try_from(self.now().as_millis()).unwrap_or(u64::MAX),
            state: self.state.clone(),
            pending_timers: self.timers.len(),
            observed_reveal: self.reveal_watch.len(),
            observed_spy: self.spy_watch.len(),
        }
    }

    /// One-time setup: footer year and the initial header evaluation.
    pub fn init<D: Dom>(&mut self, dom: &mut D) {
        if self.state.initialized {
            trace!("init called again; ignoring");
            return;
        }
        self.state.initialized = true;
        if let Some(year) = self.elements.year {
            let stamp = dom.current_year().to_string();
            dom.set_text(year, &stamp);
        }
        self.evaluate_header(dom);
    }

    // ── Navigation ─────────────────────────────────────────────────────

    /// Toggle control clicked: flip the panel.
    pub fn on_toggle_click<D: Dom>(&mut self, dom: &mut D) {
        if self.elements.nav_toggle.is_none() {
            return;
        }
        let open = !self.state.nav_open;
        self.set_nav_open(dom, open);
    }

    /// Keydown anywhere in the document.
    pub fn on_key_down<D: Dom>(&mut self, dom: &mut D, key: &str) {
        if key == "Escape" && self.state.nav_open {
            self.set_nav_open(dom, false);
        }
    }

    fn set_nav_open<D: Dom>(&mut self, dom: &mut D, open: bool) {
        let changed = self.state.nav_open != open;
        self.state.nav_open = open;
        let markers = &self.config.markers;
        if let Some(toggle) = self.elements.nav_toggle {
            let expanded = if open { "true" } else { "false" };
            dom.set_attribute(toggle, &markers.expanded_attr, expanded);
        }
        if let Some(panel) = self.elements.nav_panel {
            if open {
                dom.add_class(panel, &markers.open_class);
            } else {
                dom.remove_class(panel, &markers.open_class);
            }
        }
        if changed {
            debug!(open, "nav panel");
        }
    }

    /// Nav link clicked. In-page anchors scroll smoothly and dismiss the panel.
    pub fn on_link_click<D: Dom>(&mut self, dom: &mut D, link: NodeId) -> EventOutcome {
        let Some(href) = dom.attribute(link, "href") else {
            return EventOutcome::Ignored;
        };
        let Some(fragment) = href.strip_prefix('#') else {
            return EventOutcome::Ignored;
        };
        let target = if fragment.is_empty() {
            None
        } else {
            dom.element_by_id(fragment)
        };
        match target {
            Some(target) => {
                dom.scroll_into_view(target);
                self.set_nav_open(dom, false);
                debug!(href = %href, "in-page navigation");
            }
            None => trace!(href = %href, "anchor does not resolve"),
        }
        EventOutcome::PreventDefault
    }

    // ── Observers ──────────────────────────────────────────────────────

    /// One observer callback batch, processed in delivery order.
    pub fn on_visibility<D: Dom>(
        &mut self,
        dom: &mut D,
        kind: ObserverKind,
        entries: &[VisibilityEntry],
    ) {
        for entry in entries {
            if !self.watch(kind).contains(&entry.target) {
                trace!(?kind, target = entry.target.0, "entry for unobserved target");
                continue;
            }
            match kind {
                ObserverKind::Reveal => {
                    if entry.is_intersecting {
                        self.reveal(dom, entry.target);
                    }
                }
                ObserverKind::Spy => self.spy(dom, entry),
            }
        }
    }

    fn reveal<D: Dom>(&mut self, dom: &mut D, target: NodeId) {
        dom.add_class(target, &self.config.markers.active_class);
        let first = self.state.revealed.insert(target);
        if self.reveal_watch.remove(&target) {
            self.requests.push(HostRequest::Unobserve {
                observer: ObserverKind::Reveal,
                target,
            });
        }
        if !first {
            return;
        }
        trace!(target = target.0, "revealed");
        let is_skills = self.elements.skills == Some(target);
        let has_bars = !dom
            .query_within(target, &self.config.selectors.progress)
            .is_empty();
        if is_skills || has_bars {
            self.animate_progress_bars(dom);
        }
    }

    fn spy<D: Dom>(&mut self, dom: &mut D, entry: &VisibilityEntry) {
        let Some(id) = dom.attribute(entry.target, "id").filter(|id| !id.is_empty()) else {
            return;
        };
        if !entry.is_intersecting {
            return;
        }
        let active = &self.config.markers.active_class;
        for link in &self.elements.nav_links {
            dom.remove_class(*link, active);
        }
        let wanted = format!("#{id}");
        let link = self
            .elements
            .nav_links
            .iter()
            .copied()
            .find(|link| dom.attribute(*link, "href").as_deref() == Some(wanted.as_str()));
        if let Some(link) = link {
            dom.add_class(link, active);
        }
        if self.state.active_link != link {
            debug!(section = %id, link = ?link.map(|l| l.0), "scroll-spy");
        }
        self.state.active_link = link;
    }

    // ── Progress bars ──────────────────────────────────────────────────

    /// Start every bar that has not been started yet.
    pub fn animate_progress_bars<D: Dom>(&mut self, dom: &mut D) {
        let markers = &self.config.markers;
        let filled_attr = &markers.filled_attr;
        let delay = self.config.progress_delay();
        for slot in &self.elements.progress {
            let Some(bar) = slot.bar else {
                continue;
            };
            let marked = dom.attribute(bar, filled_attr).is_some_and(|v| v == "true");
            if marked || self.state.filled.contains(&bar) {
                continue;
            }
            let raw = dom.attribute(slot.container, &markers.percentage_attr);
            let percent = parse_percentage(raw.as_deref());
            dom.set_attribute(bar, filled_attr, "true");
            self.state.filled.insert(bar);
            self.timers.schedule(delay, DeferredTask::FillBar { bar, percent });
            trace!(bar = bar.0, percent, "progress bar scheduled");
        }
    }

    // ── Contact form ───────────────────────────────────────────────────

    /// Form submitted. Validates and reports; nothing is ever sent.
    pub fn on_submit<D: Dom>(&mut self, dom: &mut D) -> EventOutcome {
        if self.elements.form.is_none() {
            return EventOutcome::Ignored;
        }
        let read = |dom: &D, node: Option<NodeId>| node.map(|n| dom.value(n)).unwrap_or_default();
        let submission = ContactSubmission {
            name: read(&*dom, self.elements.name_input),
            email: read(&*dom, self.elements.email_input),
            message: read(&*dom, self.elements.message_input),
        };

        self.clear_errors(dom);
        let failed = form::validate(&submission, self.config.min_message_chars);

        for field in &failed {
            let messages = &self.config.messages;
            let text = match field {
                ContactField::Name => &messages.name_required,
                ContactField::Email => &messages.email_invalid,
                ContactField::Message => &messages.message_too_short,
            };
            if let Some(slot) = self.elements.error_slots.get(field) {
                dom.set_text(*slot, text);
            }
            self.state.form.errors.insert(*field, text.clone());
        }

        if failed.is_empty() {
            self.show_status(dom, FormStatus::Sent);
            self.timers
                .schedule(self.config.form_clear_delay(), DeferredTask::ClearForm);
            debug!("contact form accepted");
        } else {
            self.show_status(dom, FormStatus::Rejected);
            debug!(failed = ?failed, "contact form rejected");
        }
        EventOutcome::PreventDefault
    }

    /// Native form reset: wipe every error and the status line.
    pub fn on_reset<D: Dom>(&mut self, dom: &mut D) {
        if self.elements.form.is_none() {
            return;
        }
        self.clear_errors(dom);
        if let Some(status) = self.elements.status {
            dom.set_text(status, "");
        }
        self.state.form.status = FormStatus::Idle;
    }

    fn show_status<D: Dom>(&mut self, dom: &mut D, status: FormStatus) {
        self.state.form.status = status;
        let Some(node) = self.elements.status else {
            return;
        };
        let messages = &self.config.messages;
        let (text, color) = match status {
            FormStatus::Idle => ("", ""),
            FormStatus::Rejected => (messages.retry.as_str(), messages.warning_color.as_str()),
            FormStatus::Sent => (messages.sent.as_str(), messages.success_color.as_str()),
        };
        dom.set_text(node, text);
        if !color.is_empty() {
            dom.set_style(node, "color", color);
        }
    }

    fn clear_errors<D: Dom>(&mut self, dom: &mut D) {
        for slot in &self.elements.all_error_slots {
            dom.set_text(*slot, "");
        }
        self.state.form.errors.clear();
    }

    fn clear_form<D: Dom>(&mut self, dom: &mut D) {
        for input in [
            self.elements.name_input,
            self.elements.email_input,
            self.elements.message_input,
        ]
        .into_iter()
        .flatten()
        {
            dom.set_value(input, "");
        }
        self.clear_errors(dom);
        trace!("contact form cleared");
    }

    // ── Header ─────────────────────────────────────────────────────────

    /// Window scrolled. The host requests the returned frame and cancels the
    /// superseded one.
    pub fn on_scroll(&mut self) -> FrameRequest {
        self.frames.request()
    }

    /// An animation frame fired. Stale tokens are ignored.
    pub fn on_animation_frame<D: Dom>(&mut self, dom: &mut D, token: FrameToken) {
        if self.frames.fire(token) {
            self.evaluate_header(dom);
        }
    }

    fn evaluate_header<D: Dom>(&mut self, dom: &mut D) {
        let Some(header) = self.elements.header else {
            return;
        };
        let scrolled = dom.viewport().scroll_y > self.config.header_threshold_px;
        let class = &self.config.markers.scrolled_class;
        if scrolled {
            if !dom.has_class(header, class) {
                dom.add_class(header, class);
            }
        } else {
            dom.remove_class(header, class);
        }
        if self.state.header_scrolled != scrolled {
            trace!(scrolled, "header");
        }
        self.state.header_scrolled = scrolled;
    }

    // ── Load & time ────────────────────────────────────────────────────

    /// Window finished loading: catch up on anything already on screen.
    pub fn on_load<D: Dom>(&mut self, dom: &mut D) {
        self.state.loaded = true;
        let viewport = dom.viewport();

        if let Some(rect) = self.elements.skills.and_then(|s| dom.client_rect(s)) {
            if rect.top < viewport.height && rect.bottom >= 0.0 {
                self.animate_progress_bars(dom);
            }
        }

        let cutoff = viewport.height * self.config.initial_reveal_fraction;
        let visible: Vec<NodeId> = self
            .elements
            .revealables
            .iter()
            .copied()
            .filter(|el| dom.client_rect(*el).is_some_and(|r| r.top < cutoff))
            .collect();
        debug!(count = visible.len(), "revealing elements visible at load");
        for el in visible {
            self.reveal(dom, el);
        }
    }

    /// Report monotonic host time and run whatever became due.
    pub fn advance_time<D: Dom>(&mut self, dom: &mut D, now: Duration) {
        for task in self.timers.advance_to(now) {
            self.run_task(dom, task);
        }
    }

    fn run_task<D: Dom>(&mut self, dom: &mut D, task: DeferredTask) {
        match task {
            DeferredTask::FillBar { bar, percent } => {
                if self.state.bar_widths.contains_key(&bar) {
                    return;
                }
                dom.set_style(bar, "width", &format!("{percent}%"));
                self.state.bar_widths.insert(bar, percent);
            }
            DeferredTask::ClearForm => self.clear_form(dom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Rect, Viewport};
    use pretty_assertions::assert_eq;

    /// Flat document: selectors are a single `.class`, ids are exact.
    #[derive(Default)]
    struct FlatDom {
        ids: Vec<Option<String>>,
        classes: Vec<Vec<String>>,
        attrs: Vec<BTreeMap<String, String>>,
        text: Vec<String>,
        values: Vec<String>,
        rects: Vec<Option<Rect>>,
        scroll_y: f64,
    }

    impl FlatDom {
        fn push(&mut self, id: Option<&str>, classes: &[&str]) -> NodeId {
            self.ids.push(id.map(str::to_string));
            self.classes
                .push(classes.iter().map(|c| c.to_string()).collect());
            self.attrs.push(BTreeMap::new());
            self.text.push(String::new());
            self.values.push(String::new());
            self.rects.push(None);
            NodeId(self.ids.len() as u32 - 1)
        }
    }

    impl Dom for FlatDom {
        fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
            self.ids
                .iter()
                .position(|i| i.as_deref() == Some(id))
                .map(|i| NodeId(i as u32))
        }
        fn query_all(&mut self, selector: &str) -> Vec<NodeId> {
            let Some(class) = selector.strip_prefix('.') else {
                return Vec::new();
            };
            (0..self.classes.len())
                .filter(|i| self.classes[*i].iter().any(|c| c == class))
                .map(|i| NodeId(i as u32))
                .collect()
        }
        fn query_within(&mut self, _scope: NodeId, _selector: &str) -> Vec<NodeId> {
            Vec::new()
        }
        fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
            if name == "id" {
                return self.ids[node.index()].clone();
            }
            self.attrs[node.index()].get(name).cloned()
        }
        fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
            self.attrs[node.index()].insert(name.to_string(), value.to_string());
        }
        fn has_class(&self, node: NodeId, class: &str) -> bool {
            self.classes[node.index()].iter().any(|c| c == class)
        }
        fn add_class(&mut self, node: NodeId, class: &str) {
            if !self.has_class(node, class) {
                self.classes[node.index()].push(class.to_string());
            }
        }
        fn remove_class(&mut self, node: NodeId, class: &str) {
            self.classes[node.index()].retain(|c| c != class);
        }
        fn set_text(&mut self, node: NodeId, text: &str) {
            self.text[node.index()] = text.to_string();
        }
        fn set_style(&mut self, _node: NodeId, _property: &str, _value: &str) {}
        fn value(&self, node: NodeId) -> String {
            self.values[node.index()].clone()
        }
        fn set_value(&mut self, node: NodeId, value: &str) {
            self.values[node.index()] = value.to_string();
        }
        fn scroll_into_view(&mut self, node: NodeId) {
            if let Some(rect) = self.rects[node.index()] {
                self.scroll_y += rect.top;
            }
        }
        fn client_rect(&self, node: NodeId) -> Option<Rect> {
            self.rects[node.index()]
        }
        fn viewport(&self) -> Viewport {
            Viewport {
                scroll_y: self.scroll_y,
                height: 1000.0,
            }
        }
        fn current_year(&self) -> i32 {
            2026
        }
    }

    fn nav_page() -> (FlatDom, NodeId, NodeId) {
        let mut dom = FlatDom::default();
        let toggle = dom.push(None, &["nav-toggle"]);
        let panel = dom.push(Some("site-nav"), &[]);
        (dom, toggle, panel)
    }

    #[test]
    fn toggle_flips_attribute_and_class_together() {
        let (mut dom, toggle, panel) = nav_page();
        let mut ctl = PageController::attach(&mut dom, PageConfig::default()).unwrap();
        ctl.on_toggle_click(&mut dom);
        assert_eq!(dom.attribute(toggle, "aria-expanded").as_deref(), Some("true"));
        assert!(dom.has_class(panel, "open"));
        ctl.on_toggle_click(&mut dom);
        assert_eq!(dom.attribute(toggle, "aria-expanded").as_deref(), Some("false"));
        assert!(!dom.has_class(panel, "open"));
    }

    #[test]
    fn escape_while_closed_writes_nothing() {
        let (mut dom, toggle, _) = nav_page();
        let mut ctl = PageController::attach(&mut dom, PageConfig::default()).unwrap();
        ctl.on_key_down(&mut dom, "Escape");
        assert_eq!(dom.attribute(toggle, "aria-expanded"), None);
    }

    #[test]
    fn init_runs_once() {
        let mut dom = FlatDom::default();
        let year = dom.push(Some("year"), &[]);
        let mut ctl = PageController::attach(&mut dom, PageConfig::default()).unwrap();
        ctl.init(&mut dom);
        dom.set_text(year, "edited");
        ctl.init(&mut dom);
        assert_eq!(dom.text[year.index()], "edited");
        assert!(ctl.state().initialized);
    }

    #[test]
    fn submit_without_form_is_left_to_the_browser() {
        let mut dom = FlatDom::default();
        dom.push(Some("name"), &[]);
        let mut ctl = PageController::attach(&mut dom, PageConfig::default()).unwrap();
        assert_eq!(ctl.on_submit(&mut dom), EventOutcome::Ignored);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut dom = FlatDom::default();
        dom.push(Some("contact-form"), &[]);
        dom.push(Some("error-email"), &["error"]);
        let section = dom.push(Some("about"), &["reveal"]);
        dom.rects[section.index()] = Some(Rect::new(100.0, 500.0));

        let mut ctl = PageController::attach(&mut dom, PageConfig::default()).unwrap();
        ctl.on_submit(&mut dom);
        ctl.on_load(&mut dom);

        let snap = ctl.snapshot();
        assert_eq!(snap.state.form.status, FormStatus::Rejected);
        assert_eq!(snap.pending_timers, 0);
        assert_eq!(snap.observed_reveal, 0);
        assert_eq!(snap.observed_spy, 1);

        let json = serde_json::to_string(&snap).unwrap();
        let back: ControllerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
