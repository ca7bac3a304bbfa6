#![forbid(unsafe_code)]

//! Deterministic deferred work.
//!
//! The controller never reads a real clock. The host reports monotonic time
//! through [`TimerQueue::advance_to`]; tasks whose deadline has passed come out
//! in `(due, scheduling order)` order. The browser binding arms one
//! `setTimeout` for [`TimerQueue::next_deadline`] and reports time when it fires.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Work the controller postpones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum DeferredTask {
    /// Set a progress bar's width once the start state has been painted.
    FillBar { bar: NodeId, percent: u8 },
    /// Empty the contact form after a simulated send.
    ClearForm,
}

#[derive(Debug, Clone)]
struct Timer {
    due: Duration,
    seq: u64,
    task: DeferredTask,
}

/// Host-driven monotonic clock plus pending deferred tasks.
#[derive(Debug, Default, Clone)]
pub struct TimerQueue {
    now: Duration,
    next_seq: u64,
    pending: Vec<Timer>,
}

impl TimerQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Queue `task` to run `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: DeferredTask) {
        let due = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Timer { due, seq, task });
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|t| t.due).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move the clock to `now` (never backwards) and return every task due.
    pub fn advance_to(&mut self, now: Duration) -> Vec<DeferredTask> {
        self.now = self.now.max(now);
        let current = self.now;
        let (mut due, rest): (Vec<Timer>, Vec<Timer>) =
            self.pending.drain(..).partition(|t| t.due <= current);
        self.pending = rest;
        due.sort_by_key(|t| (t.due, t.seq));
        due.into_iter().map(|t| t.task).collect()
    }

    /// Advance the clock by `dt`.
    pub fn advance_by(&mut self, dt: Duration) -> Vec<DeferredTask> {
        let target = self.now.saturating_add(dt);
        self.advance_to(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn tasks_fire_in_deadline_then_fifo_order() {
        let mut q = TimerQueue::new();
        q.schedule(MS * 1000, DeferredTask::ClearForm);
        q.schedule(MS * 80, DeferredTask::FillBar { bar: NodeId(1), percent: 80 });
        q.schedule(MS * 80, DeferredTask::FillBar { bar: NodeId(2), percent: 60 });
        assert_eq!(q.next_deadline(), Some(MS * 80));

        assert!(q.advance_to(MS * 79).is_empty());
        let fired = q.advance_to(MS * 80);
        assert_eq!(
            fired,
            vec![
                DeferredTask::FillBar { bar: NodeId(1), percent: 80 },
                DeferredTask::FillBar { bar: NodeId(2), percent: 60 },
            ]
        );
        assert_eq!(q.len(), 1);
        assert_eq!(q.advance_by(MS * 920), vec![DeferredTask::ClearForm]);
        assert!(q.is_empty());
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut q = TimerQueue::new();
        q.advance_to(MS * 500);
        q.advance_to(MS * 100);
        assert_eq!(q.now(), MS * 500);

        // Scheduled relative to the retained time, not the stale report.
        q.schedule(MS * 10, DeferredTask::ClearForm);
        assert_eq!(q.next_deadline(), Some(MS * 510));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let mut q = TimerQueue::new();
        q.advance_to(Duration::MAX);
        q.schedule(MS, DeferredTask::ClearForm);
        assert_eq!(q.next_deadline(), Some(Duration::MAX));
        assert_eq!(q.advance_by(MS), vec![DeferredTask::ClearForm]);
    }
}
