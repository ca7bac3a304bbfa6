#![forbid(unsafe_code)]

//! Animation-frame coalescing for scroll handling.
//!
//! Scroll events arrive far more often than frames are painted. Each scroll
//! asks for a frame; a newer request supersedes the pending one, which the host
//! cancels (`cancelAnimationFrame`). Only the most recent token is honored when
//! frames fire, so at most one evaluation runs per painted frame and it always
//! sees the latest scroll state.

use serde::{Deserialize, Serialize};

/// Identifies one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameToken(pub u64);

/// What the host should do in response to a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    /// Frame to request now.
    pub token: FrameToken,
    /// Previously requested frame to cancel, if still pending.
    pub cancel: Option<FrameToken>,
}

/// Latest-wins frame request tracker.
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    pending: Option<FrameToken>,
    next: u64,
}

impl FrameCoalescer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            next: 0,
        }
    }

    /// Request a frame, superseding any pending request.
    pub fn request(&mut self) -> FrameRequest {
        let token = FrameToken(self.next);
        self.next += 1;
        let cancel = self.pending.replace(token);
        FrameRequest { token, cancel }
    }

    /// A frame fired. Returns `true` when it is the one still pending.
    pub fn fire(&mut self, token: FrameToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn pending(&self) -> Option<FrameToken> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn burst_collapses_to_latest_request() {
        let mut c = FrameCoalescer::new();
        let a = c.request();
        assert_eq!(a.cancel, None);
        let b = c.request();
        assert_eq!(b.cancel, Some(a.token));
        let d = c.request();
        assert_eq!(d.cancel, Some(b.token));

        // A cancelled frame that still fires (race with the host) is ignored.
        assert!(!c.fire(a.token));
        assert!(c.fire(d.token));
        assert_eq!(c.pending(), None);
        // Each token is honored once.
        assert!(!c.fire(d.token));
    }

    #[test]
    fn request_after_fire_cancels_nothing() {
        let mut c = FrameCoalescer::new();
        let a = c.request();
        assert!(c.fire(a.token));
        let b = c.request();
        assert_eq!(b.cancel, None);
        assert_ne!(a.token, b.token);
    }
}
