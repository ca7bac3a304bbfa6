#![forbid(unsafe_code)]

//! Scripted page sessions with JSONL record/replay.
//!
//! A [`Session`] wires a [`PageController`] to a [`SyntheticPage`] the way the
//! browser binding wires it to the real document: observers are sampled after
//! every geometry change, scroll events request frames, unobserve requests are
//! honored and time only moves on explicit `advance` events.
//!
//! Sessions record every applied [`ScenarioEvent`]. The record serializes to
//! JSONL, one event per line:
//!
//! ```text
//! {"type":"scroll","y":3000.0}
//! {"type":"frame"}
//! {"type":"advance","ms":100}
//! ```
//!
//! Replaying a recording against a fresh copy of the same page must produce an
//! identical [`PageSnapshot`].

use core::time::Duration;
use std::collections::BTreeMap;

use folio_core::config::{ConfigError, PageConfig};
use folio_core::controller::{FormStatus, HostRequest, PageController};
use folio_core::dom::{Dom, NodeId};
use folio_core::form::ContactField;
use folio_core::frame::FrameToken;
use folio_core::observer::ObserverKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observer::ObserverSimulator;
use crate::synthetic::SyntheticPage;

/// One scripted page interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Window `load`.
    Load,
    /// Click on the nav toggle.
    ToggleClick,
    /// Document `keydown`.
    KeyDown { key: String },
    /// Click on the first nav link with this `href`.
    LinkClick { href: String },
    /// Scroll the window to `y`.
    Scroll { y: f64 },
    /// Paint a frame: the pending animation-frame callback runs.
    Frame,
    /// Type into a contact form field.
    Fill { field: ContactField, value: String },
    Submit,
    Reset,
    /// Advance host time.
    Advance { ms: u64 },
}

/// Error loading a JSONL scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioParseError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl core::fmt::Display for ScenarioParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScenarioParseError {}

/// Parse a JSONL scenario. Blank lines are skipped.
pub fn parse_jsonl(input: &str) -> Result<Vec<ScenarioEvent>, ScenarioParseError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| ScenarioParseError {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Serialize events as JSONL.
#[must_use]
pub fn to_jsonl(events: &[ScenarioEvent]) -> String {
    let mut out = String::new();
    for event in events {
        // Plain tagged enum; serialization cannot fail.
        if let Ok(line) = serde_json::to_string(event) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// Observable page facts, keyed by element ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub now_ms: u64,
    pub nav_open: bool,
    pub toggle_expanded: Option<String>,
    pub panel_open_class: bool,
    /// Labels of elements carrying the active class among revealables.
    pub revealed: Vec<String>,
    /// `href`s of nav links carrying the active class.
    pub active_links: Vec<String>,
    pub header_scrolled: bool,
    /// Bar width styles keyed by container `data-percentage` order index.
    pub bar_widths: Vec<Option<String>>,
    /// Error slot text keyed by slot id.
    pub errors: BTreeMap<String, String>,
    pub status: FormStatus,
    pub status_text: String,
    pub status_color: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub scroll_y: f64,
}

/// A controller driven against a synthetic page.
#[derive(Debug)]
pub struct Session {
    page: SyntheticPage,
    controller: PageController,
    observers: ObserverSimulator,
    now: Duration,
    pending_frame: Option<FrameToken>,
    recorded: Vec<ScenarioEvent>,
}

impl Session {
    /// Attach, init and deliver the initial observer entries.
    pub fn start(mut page: SyntheticPage, config: PageConfig) -> Result<Self, ConfigError> {
        let mut controller = PageController::attach(&mut page, config)?;
        controller.init(&mut page);
        let mut session = Self {
            page,
            controller,
            observers: ObserverSimulator::new(),
            now: Duration::ZERO,
            pending_frame: None,
            recorded: Vec::new(),
        };
        session.sample_observers();
        Ok(session)
    }

    #[must_use]
    pub fn page(&self) -> &SyntheticPage {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut SyntheticPage {
        &mut self.page
    }

    #[must_use]
    pub fn controller(&self) -> &PageController {
        &self.controller
    }

    /// Events applied so far.
    #[must_use]
    pub fn recorded(&self) -> &[ScenarioEvent] {
        &self.recorded
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a ScenarioEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Apply one event the way the browser binding would dispatch it.
    pub fn apply(&mut self, event: &ScenarioEvent) {
        debug!(?event, "scenario event");
        self.recorded.push(event.clone());
        let page = &mut self.page;
        match event {
            ScenarioEvent::Load => self.controller.on_load(page),
            ScenarioEvent::ToggleClick => self.controller.on_toggle_click(page),
            ScenarioEvent::KeyDown { key } => self.controller.on_key_down(page, key),
            ScenarioEvent::LinkClick { href } => {
                let link = self
                    .controller
                    .elements()
                    .nav_links
                    .iter()
                    .copied()
                    .find(|l| page.attribute(*l, "href").as_deref() == Some(href.as_str()));
                if let Some(link) = link {
                    let before = page.viewport().scroll_y;
                    self.controller.on_link_click(page, link);
                    if page.viewport().scroll_y != before {
                        self.scrolled();
                    }
                }
            }
            ScenarioEvent::Scroll { y } => {
                page.set_scroll(*y);
                self.scrolled();
            }
            ScenarioEvent::Frame => {
                if let Some(token) = self.pending_frame.take() {
                    self.controller.on_animation_frame(page, token);
                }
            }
            ScenarioEvent::Fill { field, value } => {
                let node = match field {
                    ContactField::Name => self.controller.elements().name_input,
                    ContactField::Email => self.controller.elements().email_input,
                    ContactField::Message => self.controller.elements().message_input,
                };
                if let Some(node) = node {
                    page.set_value(node, value);
                }
            }
            ScenarioEvent::Submit => {
                self.controller.on_submit(page);
            }
            ScenarioEvent::Reset => {
                // Native reset empties the controls before the reset event fires.
                let elements = self.controller.elements();
                for node in [elements.name_input, elements.email_input, elements.message_input]
                    .into_iter()
                    .flatten()
                {
                    page.set_value(node, "");
                }
                self.controller.on_reset(page);
            }
            ScenarioEvent::Advance { ms } => {
                self.now = self.now.saturating_add(Duration::from_millis(*ms));
                self.controller.advance_time(page, self.now);
            }
        }
        self.honor_requests();
    }

    /// The window scrolled: request a frame and let observers catch up.
    fn scrolled(&mut self) {
        let request = self.controller.on_scroll();
        if request.cancel.is_some() {
            debug_assert_eq!(request.cancel, self.pending_frame);
        }
        self.pending_frame = Some(request.token);
        self.sample_observers();
    }

    fn sample_observers(&mut self) {
        for kind in [ObserverKind::Reveal, ObserverKind::Spy] {
            let targets = self.controller.observed(kind);
            let spec = self.controller.observer_spec(kind);
            let entries = self.observers.sample(&self.page, kind, &spec, &targets);
            if !entries.is_empty() {
                self.controller.on_visibility(&mut self.page, kind, &entries);
            }
            self.honor_requests();
        }
    }

    fn honor_requests(&mut self) {
        for request in self.controller.drain_requests() {
            match request {
                HostRequest::Unobserve { observer, target } => {
                    self.observers.forget(observer, target);
                }
            }
        }
    }

    /// Capture the observable page state.
    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        let page = &self.page;
        let elements = self.controller.elements();
        let markers = &self.controller.config().markers;
        let label = |n: NodeId| page.label(n);

        let revealed = elements
            .revealables
            .iter()
            .copied()
            .filter(|n| page.has_class(*n, &markers.active_class))
            .map(label)
            .collect();
        let active_links = elements
            .nav_links
            .iter()
            .copied()
            .filter(|n| page.has_class(*n, &markers.active_class))
            .filter_map(|n| page.attribute(n, "href"))
            .collect();
        let bar_widths = elements
            .progress
            .iter()
            .map(|slot| slot.bar.and_then(|b| page.element(b).style.get("width").cloned()))
            .collect();
        let errors = elements
            .all_error_slots
            .iter()
            .map(|n| (label(*n), page.element(*n).text.clone()))
            .collect();
        let fields = [elements.name_input, elements.email_input, elements.message_input]
            .into_iter()
            .flatten()
            .map(|n| (label(n), page.value(n)))
            .collect();
        let (status_text, status_color) = elements
            .status
            .map(|n| {
                let el = page.element(n);
                (el.text.clone(), el.style.get("color").cloned())
            })
            .unwrap_or_default();

        PageSnapshot {
            now_ms: self.now.as_millis() as u64,
            nav_open: self.controller.state().nav_open,
            toggle_expanded: elements
                .nav_toggle
                .and_then(|t| page.attribute(t, &markers.expanded_attr)),
            panel_open_class: elements
                .nav_panel
                .is_some_and(|p| page.has_class(p, &markers.open_class)),
            revealed,
            active_links,
            header_scrolled: elements
                .header
                .is_some_and(|h| page.has_class(h, &markers.scrolled_class)),
            bar_widths,
            errors,
            status: self.controller.state().form.status,
            status_text,
            status_color,
            fields,
            scroll_y: page.viewport().scroll_y,
        }
    }
}

/// Replay `events` against `page` from scratch.
pub fn replay(
    page: SyntheticPage,
    config: PageConfig,
    events: &[ScenarioEvent],
) -> Result<PageSnapshot, ConfigError> {
    let mut session = Session::start(page, config)?;
    session.apply_all(events);
    Ok(session.snapshot())
}
