#![forbid(unsafe_code)]

//! Geometric stand-in for `IntersectionObserver`.
//!
//! Like the browser, the simulator delivers an entry for every target the
//! first time it is sampled, and afterwards only when a target crosses the
//! observer's threshold. Entries come out in the order targets are given.

use std::collections::BTreeMap;

use folio_core::dom::{Dom, NodeId};
use folio_core::observer::{ObserverKind, ObserverSpec, VisibilityEntry};

#[derive(Debug, Clone, Default)]
pub struct ObserverSimulator {
    last: BTreeMap<(ObserverKind, NodeId), bool>,
}

impl ObserverSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the entries `kind` would deliver for the current geometry.
    ///
    /// Targets without layout are treated as not intersecting.
    pub fn sample<D: Dom>(
        &mut self,
        dom: &D,
        kind: ObserverKind,
        spec: &ObserverSpec,
        targets: &[NodeId],
    ) -> Vec<VisibilityEntry> {
        let height = dom.viewport().height;
        let mut out = Vec::new();
        for target in targets {
            let entry = match dom.client_rect(*target) {
                Some(rect) => spec.evaluate(*target, rect, height),
                None => VisibilityEntry::leaving(*target),
            };
            let previous = self.last.insert((kind, *target), entry.is_intersecting);
            if previous != Some(entry.is_intersecting) {
                out.push(entry);
            }
        }
        out
    }

    /// Drop tracking for a target the host stopped observing.
    pub fn forget(&mut self, kind: ObserverKind, target: NodeId) {
        self.last.remove(&(kind, target));
    }
}
