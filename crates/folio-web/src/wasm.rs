#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_core::controller::{EventOutcome, HostRequest, PageController};
use folio_core::frame::{FrameRequest, FrameToken};
use folio_core::observer::{ObserverKind, VisibilityEntry};
use tracing::{debug, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent,
};

use crate::clock::{HostClock, timeout_ms};
use crate::dom::WebDom;
use crate::guard::borrow_or_drop;
use crate::options::{config_from_options, load_already_fired, state_json};

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Everything a page event needs, behind one borrow.
struct Mounted {
    controller: PageController,
    dom: WebDom,
    clock: HostClock,
    reveal: Option<IntersectionObserver>,
    spy: Option<IntersectionObserver>,
    /// Pending animation frame: controller token and rAF handle.
    frame: Option<(FrameToken, i32)>,
    timeout: Option<i32>,
}

impl Mounted {
    fn observer(&self, kind: ObserverKind) -> Option<&IntersectionObserver> {
        match kind {
            ObserverKind::Reveal => self.reveal.as_ref(),
            ObserverKind::Spy => self.spy.as_ref(),
        }
    }

    fn honor_requests(&mut self) {
        for request in self.controller.drain_requests() {
            match request {
                HostRequest::Unobserve { observer, target } => {
                    if let (Some(obs), Some(el)) = (self.observer(observer), self.dom.element(target))
                    {
                        obs.unobserve(el);
                    }
                }
            }
        }
    }
}

struct Host {
    state: RefCell<Mounted>,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    timer_callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Host {
    /// Re-arm the single `setTimeout` for the controller's next deadline.
    fn arm_timer(&self) {
        let Some(mut m) = borrow_or_drop(&self.state, "arm timer") else {
            return;
        };
        let window = m.dom.window().clone();
        if let Some(handle) = m.timeout.take() {
            window.clear_timeout_with_handle(handle);
        }
        let Some(deadline) = m.controller.next_deadline() else {
            return;
        };
        let delay = timeout_ms(m.clock.elapsed(), deadline);
        let callback = self.timer_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(handle) => m.timeout = Some(handle),
            Err(_) => warn!("setTimeout failed"),
        }
    }

    /// Request the frame and cancel the one it supersedes.
    fn schedule_frame(&self, request: FrameRequest) {
        let Some(mut m) = borrow_or_drop(&self.state, "schedule frame") else {
            return;
        };
        let window = m.dom.window().clone();
        if let Some((_, handle)) = m.frame.take() {
            if request.cancel.is_some() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
        let callback = self.frame_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => m.frame = Some((request.token, handle)),
            Err(_) => warn!("requestAnimationFrame failed"),
        }
    }

    fn teardown(&self) {
        if let Ok(mut m) = self.state.try_borrow_mut() {
            let window = m.dom.window().clone();
            if let Some((_, handle)) = m.frame.take() {
                let _ = window.cancel_animation_frame(handle);
            }
            if let Some(handle) = m.timeout.take() {
                window.clear_timeout_with_handle(handle);
            }
            for obs in [m.reveal.take(), m.spy.take()].into_iter().flatten() {
                obs.disconnect();
            }
        }
        self.frame_callback.borrow_mut().take();
        self.timer_callback.borrow_mut().take();
    }
}

/// Run one page event against the controller.
///
/// Host time is brought up to date first so deferred work stays ordered with
/// the event. Re-entrant events (a handler causing another synchronously) are
/// dropped.
fn dispatch<R>(
    host: &Weak<Host>,
    f: impl FnOnce(&mut PageController, &mut WebDom) -> R,
) -> Option<R> {
    let host = host.upgrade()?;
    let result = {
        let mut m = borrow_or_drop(&host.state, "page event")?;
        let m = &mut *m;
        let now = m.clock.elapsed();
        m.controller.advance_time(&mut m.dom, now);
        let result = f(&mut m.controller, &mut m.dom);
        m.honor_requests();
        result
    };
    host.arm_timer();
    Some(result)
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener, JsValue> {
    let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    Ok(Listener {
        target: target.clone(),
        kind,
        callback,
    })
}

fn prevent_if(event: &Event, outcome: Option<EventOutcome>) {
    if outcome == Some(EventOutcome::PreventDefault) {
        event.prevent_default();
    }
}

fn to_js(err: impl core::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A mounted portfolio page.
///
/// Listeners, observers and pending callbacks stay registered until
/// [`destroy`](Self::destroy) (or the handle is freed).
#[wasm_bindgen]
pub struct FolioPage {
    host: Option<Rc<Host>>,
    listeners: Vec<Listener>,
    observer_callbacks: Vec<ObserverCallback>,
}

#[wasm_bindgen]
impl FolioPage {
    /// JSON snapshot of the controller state.
    pub fn state(&self) -> String {
        let Some(host) = &self.host else {
            return "null".to_string();
        };
        match host.state.try_borrow() {
            Ok(m) => state_json(&m.controller.snapshot()),
            Err(_) => "null".to_string(),
        }
    }

    /// Remove every listener, disconnect observers and cancel pending work.
    pub fn destroy(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        if let Some(host) = self.host.take() {
            host.teardown();
            debug!("portfolio page destroyed");
        }
        self.observer_callbacks.clear();
    }
}

impl Drop for FolioPage {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Attach the page controller to `window.document`.
///
/// `options` is a (partial) `PageConfig` object; omitted fields keep their
/// defaults.
#[wasm_bindgen(js_name = mountPortfolio)]
pub fn mount_portfolio(options: Option<JsValue>) -> Result<FolioPage, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let raw = match &options {
        Some(value) if !value.is_undefined() && !value.is_null() => {
            Some(String::from(js_sys::JSON::stringify(value)?))
        }
        _ => None,
    };
    let config = config_from_options(raw.as_deref()).map_err(to_js)?;

    let mut dom = WebDom::new(window.clone(), document.clone());
    let mut controller = PageController::attach(&mut dom, config).map_err(to_js)?;
    controller.init(&mut dom);

    let host = Rc::new(Host {
        state: RefCell::new(Mounted {
            controller,
            dom,
            clock: HostClock::start(),
            reveal: None,
            spy: None,
            frame: None,
            timeout: None,
        }),
        frame_callback: RefCell::new(None),
        timer_callback: RefCell::new(None),
    });
    let weak = Rc::downgrade(&host);

    {
        let weak = weak.clone();
        *host.frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            let Some(host) = weak.upgrade() else {
                return;
            };
            let pending =
                borrow_or_drop(&host.state, "animation frame").and_then(|mut m| m.frame.take());
            if let Some((token, _)) = pending {
                dispatch(&weak, |ctl, dom| ctl.on_animation_frame(dom, token));
            }
        }) as Box<dyn FnMut(f64)>));
    }
    {
        let weak = weak.clone();
        *host.timer_callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(host) = weak.upgrade() else {
                return;
            };
            if let Some(mut m) = borrow_or_drop(&host.state, "timeout") {
                m.timeout = None;
            }
            dispatch(&weak, |_, _| ());
        }) as Box<dyn FnMut()>));
    }

    let mut page = FolioPage {
        host: None,
        listeners: Vec::new(),
        observer_callbacks: Vec::new(),
    };

    for kind in [ObserverKind::Reveal, ObserverKind::Spy] {
        let (targets, settings) = {
            let m = host.state.borrow();
            let targets: Vec<Element> = m
                .controller
                .observed(kind)
                .into_iter()
                .filter_map(|n| m.dom.element(n).cloned())
                .collect();
            let settings = match kind {
                ObserverKind::Reveal => m.controller.config().reveal_observer.clone(),
                ObserverKind::Spy => m.controller.config().spy_observer.clone(),
            };
            (targets, settings)
        };
        if targets.is_empty() {
            trace!(?kind, "no targets; observer not created");
            continue;
        }

        let weak = weak.clone();
        let callback: ObserverCallback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                dispatch(&weak, |ctl, dom| {
                    let batch: Vec<VisibilityEntry> = entries
                        .iter()
                        .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                        .filter_map(|entry| {
                            Some(VisibilityEntry {
                                target: dom.node_of(&entry.target())?,
                                is_intersecting: entry.is_intersecting(),
                                ratio: entry.intersection_ratio(),
                            })
                        })
                        .collect();
                    ctl.on_visibility(dom, kind, &batch);
                });
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&settings.root_margin);
        init.set_threshold(&JsValue::from_f64(settings.threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for target in &targets {
            observer.observe(target);
        }
        let mut m = host.state.borrow_mut();
        match kind {
            ObserverKind::Reveal => m.reveal = Some(observer),
            ObserverKind::Spy => m.spy = Some(observer),
        }
        page.observer_callbacks.push(callback);
    }

    let (toggle, links, form) = {
        let m = host.state.borrow();
        let elements = m.controller.elements();
        let toggle = elements.nav_toggle.and_then(|n| m.dom.element(n).cloned());
        let links: Vec<_> = elements
            .nav_links
            .iter()
            .filter_map(|n| Some((*n, m.dom.element(*n)?.clone())))
            .collect();
        let form = elements.form.and_then(|n| m.dom.element(n).cloned());
        (toggle, links, form)
    };

    if let Some(toggle) = toggle {
        let weak = weak.clone();
        page.listeners.push(listen(toggle.as_ref(), "click", move |_| {
            dispatch(&weak, |ctl, dom| ctl.on_toggle_click(dom));
        })?);
    }
    for (node, link) in links {
        let weak = weak.clone();
        page.listeners.push(listen(link.as_ref(), "click", move |event| {
            let outcome = dispatch(&weak, |ctl, dom| ctl.on_link_click(dom, node));
            prevent_if(&event, outcome);
        })?);
    }
    {
        let weak = weak.clone();
        page.listeners.push(listen(document.as_ref(), "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            dispatch(&weak, |ctl, dom| ctl.on_key_down(dom, &key));
        })?);
    }
    if let Some(form) = form {
        let submit_weak = weak.clone();
        page.listeners.push(listen(form.as_ref(), "submit", move |event| {
            let outcome = dispatch(&submit_weak, |ctl, dom| ctl.on_submit(dom));
            prevent_if(&event, outcome);
        })?);
        let reset_weak = weak.clone();
        page.listeners.push(listen(form.as_ref(), "reset", move |_| {
            dispatch(&reset_weak, |ctl, dom| ctl.on_reset(dom));
        })?);
    }
    {
        let weak = weak.clone();
        page.listeners.push(listen(window.as_ref(), "scroll", move |_| {
            let request = dispatch(&weak, |ctl, _| ctl.on_scroll());
            if let (Some(request), Some(host)) = (request, weak.upgrade()) {
                host.schedule_frame(request);
            }
        })?);
    }

    if load_already_fired(&document.ready_state()) {
        dispatch(&weak, |ctl, dom| ctl.on_load(dom));
    } else {
        let weak = weak.clone();
        page.listeners.push(listen(window.as_ref(), "load", move |_| {
            dispatch(&weak, |ctl, dom| ctl.on_load(dom));
        })?);
    }

    {
        let m = host.state.borrow();
        debug!(
            listeners = page.listeners.len(),
            observers = page.observer_callbacks.len(),
            "portfolio page mounted"
        );
        trace!(state = %state_json(&m.controller.snapshot()), "initial state");
    }
    page.host = Some(host);
    Ok(page)
}
