#![forbid(unsafe_code)]

//! Visibility observation model.
//!
//! The browser binding feeds real `IntersectionObserver` entries into the
//! controller; the harness computes them from synthetic geometry with
//! [`ObserverSpec::evaluate`]. Both produce the same [`VisibilityEntry`]
//! batches, so reveal and scroll-spy logic never depends on real scrolling.
//!
//! Only the vertical axis is modeled. Horizontal margins are parsed and kept so
//! they can be forwarded to the browser, but they do not affect evaluation.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::dom::{NodeId, Rect};

/// Which of the two page observers an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverKind {
    Reveal,
    Spy,
}

/// One visibility change, in the shape of an `IntersectionObserverEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl VisibilityEntry {
    #[must_use]
    pub const fn entering(target: NodeId) -> Self {
        Self {
            target,
            is_intersecting: true,
            ratio: 1.0,
        }
    }

    #[must_use]
    pub const fn leaving(target: NodeId) -> Self {
        Self {
            target,
            is_intersecting: false,
            ratio: 0.0,
        }
    }
}

/// A single CSS margin component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl MarginLength {
    fn parse(token: &str, whole: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidRootMargin {
            value: whole.to_string(),
            reason,
        };
        let (number, percent) = if let Some(n) = token.strip_suffix("px") {
            (n, false)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, true)
        } else {
            return Err(invalid("each value needs a px or % unit"));
        };
        let value: f64 = number.parse().map_err(|_| invalid("not a number"))?;
        if !value.is_finite() {
            return Err(invalid("not a number"));
        }
        Ok(if percent {
            Self::Percent(value)
        } else {
            Self::Px(value)
        })
    }

    /// Resolve against the root extent on the same axis.
    #[must_use]
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }
}

/// Parsed `rootMargin` (top, right, bottom, left).
///
/// Positive values grow the root box, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub const ZERO: Self = Self {
        top: MarginLength::Px(0.0),
        right: MarginLength::Px(0.0),
        bottom: MarginLength::Px(0.0),
        left: MarginLength::Px(0.0),
    };

    /// Parse CSS margin shorthand with one to four `px`/`%` values.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let parts = input
            .split_whitespace()
            .map(|token| MarginLength::parse(token, input))
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [all] => Ok(Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            [] => Err(ConfigError::InvalidRootMargin {
                value: input.to_string(),
                reason: "empty",
            }),
            _ => Err(ConfigError::InvalidRootMargin {
                value: input.to_string(),
                reason: "more than four values",
            }),
        }
    }
}

/// Validated observer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverSpec {
    pub margin: RootMargin,
    pub threshold: f64,
}

impl ObserverSpec {
    /// Vertical bounds of the margin-adjusted root for a viewport height.
    #[must_use]
    pub fn root_band(&self, viewport_height: f64) -> (f64, f64) {
        let top = -self.margin.top.resolve(viewport_height);
        let bottom = viewport_height + self.margin.bottom.resolve(viewport_height);
        (top, bottom)
    }

    /// Intersection ratio of `rect` with the root band, `None` when disjoint.
    ///
    /// Zero-height targets count as fully visible when they sit inside the band.
    #[must_use]
    pub fn intersection_ratio(&self, rect: Rect, viewport_height: f64) -> Option<f64> {
        let (band_top, band_bottom) = self.root_band(viewport_height);
        let start = rect.top.max(band_top);
        let end = rect.bottom.min(band_bottom);
        let height = rect.height();
        if height == 0.0 {
            return (rect.top >= band_top && rect.top <= band_bottom).then_some(1.0);
        }
        (end > start).then(|| ((end - start) / height).clamp(0.0, 1.0))
    }

    /// Whether `rect` counts as visible under this spec.
    #[must_use]
    pub fn evaluate(&self, target: NodeId, rect: Rect, viewport_height: f64) -> VisibilityEntry {
        match self.intersection_ratio(rect, viewport_height) {
            Some(ratio) if ratio >= self.threshold => VisibilityEntry {
                target,
                is_intersecting: true,
                ratio,
            },
            Some(ratio) => VisibilityEntry {
                target,
                is_intersecting: false,
                ratio,
            },
            None => VisibilityEntry::leaving(target),
        }
    }
}
