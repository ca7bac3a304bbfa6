#![forbid(unsafe_code)]

//! `folio-core` is the host-agnostic half of the Folio portfolio page.
//!
//! Design goals:
//! - **Injected document**: every page access goes through the [`dom::Dom`]
//!   trait, so the controller runs against the browser or a synthetic page.
//! - **Explicit state**: each flag reflected into the page (panel open,
//!   revealed, filled, active link, header scrolled, form status) lives in
//!   [`controller::PageState`].
//! - **Host-driven time**: deferred work and animation frames are modeled
//!   ([`timers`], [`frame`]); the host advances the clock and fires frames.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.

pub mod config;
pub mod controller;
pub mod dom;
pub mod form;
pub mod frame;
pub mod observer;
pub mod progress;
pub mod timers;

pub use config::{ConfigError, PageConfig};
pub use controller::{
    ControllerSnapshot, EventOutcome, HostRequest, PageController, PageElements, PageState,
};
pub use dom::{Dom, NodeId, Rect, Viewport};
pub use observer::{ObserverKind, VisibilityEntry};
