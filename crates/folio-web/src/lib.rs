#![forbid(unsafe_code)]

//! Browser binding for the Folio portfolio page.
//!
//! `mountPortfolio(options?)` builds a [`folio_core::PageController`] against
//! `window.document` and wires it to the page:
//! - click listeners on the nav toggle and each nav link,
//! - document `keydown`, form `submit`/`reset`, window `scroll`/`load`,
//! - one `IntersectionObserver` each for reveal and scroll-spy,
//! - `requestAnimationFrame` for the header and a single re-armed
//!   `setTimeout` for deferred work.
//!
//! The returned `FolioPage` exposes `state()` (JSON) and `destroy()`.

mod clock;
mod guard;
pub mod options;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use clock::{HostClock, timeout_ms};
pub use options::{config_from_options, load_already_fired, state_json};

#[cfg(target_arch = "wasm32")]
pub use wasm::{FolioPage, mount_portfolio};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FolioPage;

#[cfg(not(target_arch = "wasm32"))]
impl FolioPage {
    /// There is no document to report on natively.
    pub fn state(&self) -> String {
        "null".to_string()
    }

    pub fn destroy(&mut self) {}
}
