#![forbid(unsafe_code)]

//! Controller configuration.
//!
//! [`PageConfig::default`] describes the stock portfolio page: the element
//! ids/classes it queries, the two visibility observers, the header threshold
//! and the timing of deferred work. Hosts may override any subset through
//! JSON ([`PageConfig::from_json`]); omitted fields keep their defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observer::{ObserverSpec, RootMargin};

/// Configuration error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A root margin string that is not valid CSS margin shorthand.
    InvalidRootMargin { value: String, reason: &'static str },
    /// Observer threshold outside `0.0..=1.0`.
    ThresholdOutOfRange(f64),
    /// Initial reveal fraction outside `0.0..=1.0`.
    RevealFractionOutOfRange(f64),
    /// Options payload was not valid JSON for [`PageConfig`].
    Json(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidRootMargin { value, reason } => {
                write!(f, "invalid root margin {value:?}: {reason}")
            }
            Self::ThresholdOutOfRange(t) => write!(f, "threshold {t} outside 0..=1"),
            Self::RevealFractionOutOfRange(v) => {
                write!(f, "initial reveal fraction {v} outside 0..=1")
            }
            Self::Json(msg) => write!(f, "invalid options: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Root margin + threshold pair handed to an IntersectionObserver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// CSS margin shorthand, e.g. `"0px 0px -10% 0px"`.
    pub root_margin: String,
    pub threshold: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_string(),
            threshold: 0.0,
        }
    }
}

impl ObserverConfig {
    #[must_use]
    pub fn new(root_margin: &str, threshold: f64) -> Self {
        Self {
            root_margin: root_margin.to_string(),
            threshold,
        }
    }

    /// Reveal observer: biased toward the bottom edge, 15% visible.
    #[must_use]
    pub fn reveal() -> Self {
        Self::new("0px 0px -10% 0px", 0.15)
    }

    /// Scroll-spy observer: the centered activation band.
    #[must_use]
    pub fn spy() -> Self {
        Self::new("-40% 0px -40% 0px", 0.0)
    }

    /// Parse and range-check into the form the geometry code works with.
    pub fn compile(&self) -> Result<ObserverSpec, ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        let margin = RootMargin::parse(&self.root_margin)?;
        Ok(ObserverSpec {
            margin,
            threshold: self.threshold,
        })
    }
}

/// Element ids and selectors the controller queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub nav_toggle: String,
    pub nav_panel_id: String,
    pub nav_link: String,
    pub reveal: String,
    pub progress: String,
    pub progress_bar: String,
    pub form_id: String,
    pub status_id: String,
    pub name_id: String,
    pub email_id: String,
    pub message_id: String,
    pub name_error_id: String,
    pub email_error_id: String,
    pub message_error_id: String,
    /// Matches every error slot; all of them are wiped on each validation.
    pub error: String,
    pub year_id: String,
    pub header_id: String,
    /// Landmark section ids watched by scroll-spy, in page order.
    pub spy_sections: Vec<String>,
    /// Section whose reveal (or load-time visibility) starts the progress bars.
    pub skills_id: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            nav_toggle: ".nav-toggle".to_string(),
            nav_panel_id: "site-nav".to_string(),
            nav_link: ".nav-link".to_string(),
            reveal: ".reveal".to_string(),
            progress: ".progress".to_string(),
            progress_bar: ".progress-bar".to_string(),
            form_id: "contact-form".to_string(),
            status_id: "form-status".to_string(),
            name_id: "name".to_string(),
            email_id: "email".to_string(),
            message_id: "message".to_string(),
            name_error_id: "error-name".to_string(),
            email_error_id: "error-email".to_string(),
            message_error_id: "error-message".to_string(),
            error: ".error".to_string(),
            year_id: "year".to_string(),
            header_id: "site-header".to_string(),
            spy_sections: ["about", "education", "experience", "skills", "contact"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            skills_id: "skills".to_string(),
        }
    }
}

/// Class names and attributes the controller writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub open_class: String,
    pub active_class: String,
    pub scrolled_class: String,
    pub expanded_attr: String,
    pub percentage_attr: String,
    pub filled_attr: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open_class: "open".to_string(),
            active_class: "active".to_string(),
            scrolled_class: "scrolled".to_string(),
            expanded_attr: "aria-expanded".to_string(),
            percentage_attr: "data-percentage".to_string(),
            filled_attr: "data-filled".to_string(),
        }
    }
}

/// User-facing contact form copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormMessages {
    pub name_required: String,
    pub email_invalid: String,
    pub message_too_short: String,
    pub retry: String,
    pub sent: String,
    pub warning_color: String,
    pub success_color: String,
}

impl Default for FormMessages {
    fn default() -> Self {
        Self {
            name_required: "Please enter your name.".to_string(),
            email_invalid: "Please enter a valid email address.".to_string(),
            message_too_short: "Message must be at least 10 characters.".to_string(),
            retry: "Please check the form and try again.".to_string(),
            sent: "Message sent! Thank you. (Simulated)".to_string(),
            warning_color: "#d9534f".to_string(),
            success_color: "green".to_string(),
        }
    }
}

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub selectors: Selectors,
    pub markers: Markers,
    pub messages: FormMessages,
    pub reveal_observer: ObserverConfig,
    pub spy_observer: ObserverConfig,
    /// Header gets the scrolled class when `scrollY` is strictly above this.
    pub header_threshold_px: f64,
    /// Delay between marking a bar filled and setting its width.
    pub progress_delay_ms: u64,
    /// Delay between a successful submit and clearing the form.
    pub form_clear_delay_ms: u64,
    /// On load, revealables whose top is above this fraction of the viewport
    /// height are revealed immediately.
    pub initial_reveal_fraction: f64,
    /// Minimum trimmed message length, in characters.
    pub min_message_chars: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            markers: Markers::default(),
            messages: FormMessages::default(),
            reveal_observer: ObserverConfig::reveal(),
            spy_observer: ObserverConfig::spy(),
            header_threshold_px: 12.0,
            progress_delay_ms: 80,
            form_clear_delay_ms: 1000,
            initial_reveal_fraction: 0.9,
            min_message_chars: 10,
        }
    }
}

impl PageConfig {
    /// Parse a (possibly partial) JSON options object and validate it.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field that can be wrong without looking at the page.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reveal_observer.compile()?;
        self.spy_observer.compile()?;
        if !(0.0..=1.0).contains(&self.initial_reveal_fraction) {
            return Err(ConfigError::RevealFractionOutOfRange(
                self.initial_reveal_fraction,
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn progress_delay(&self) -> Duration {
        Duration::from_millis(self.progress_delay_ms)
    }

    #[must_use]
    pub const fn form_clear_delay(&self) -> Duration {
        Duration::from_millis(self.form_clear_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_validate() {
        assert_eq!(PageConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PageConfig::from_json(
            r#"{ "header_threshold_px": 40, "spy_observer": { "root_margin": "-30% 0px" } }"#,
        )
        .unwrap();
        assert_eq!(config.header_threshold_px, 40.0);
        assert_eq!(config.spy_observer.root_margin, "-30% 0px");
        assert_eq!(config.spy_observer.threshold, 0.0);
        assert_eq!(config.reveal_observer, ObserverConfig::reveal());
        assert_eq!(config.selectors.nav_panel_id, "site-nav");
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let err = PageConfig::from_json(r#"{ "reveal_observer": { "threshold": 1.5 } }"#)
            .unwrap_err();
        assert_eq!(err, ConfigError::ThresholdOutOfRange(1.5));
    }

    #[test]
    fn bad_margin_rejected() {
        let err = PageConfig::from_json(r#"{ "spy_observer": { "root_margin": "40em" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRootMargin { .. }));
        assert!(err.to_string().contains("40em"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = PageConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn delays_convert_to_durations() {
        let config = PageConfig::default();
        assert_eq!(config.progress_delay(), Duration::from_millis(80));
        assert_eq!(config.form_clear_delay(), Duration::from_secs(1));
    }
}
