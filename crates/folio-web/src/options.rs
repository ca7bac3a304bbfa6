#![forbid(unsafe_code)]

//! Mount options and state export at the JS boundary.

use folio_core::{ConfigError, ControllerSnapshot, PageConfig};
use tracing::warn;

/// Build the config from the JSON text of the `options` argument.
///
/// Absent, `null` and `undefined` options mean defaults.
pub fn config_from_options(raw: Option<&str>) -> Result<PageConfig, ConfigError> {
    match raw.map(str::trim) {
        None | Some("" | "null" | "undefined") => Ok(PageConfig::default()),
        Some(json) => PageConfig::from_json(json),
    }
}

/// Whether `document.readyState` says `load` has already fired.
#[must_use]
pub fn load_already_fired(ready_state: &str) -> bool {
    ready_state == "complete"
}

/// JSON text handed back by `FolioPage.state()`.
#[must_use]
pub fn state_json(snapshot: &ControllerSnapshot) -> String {
    match serde_json::to_string(snapshot) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "state snapshot did not serialize");
            "{}".to_string()
        }
    }
}
