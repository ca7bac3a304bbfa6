#![forbid(unsafe_code)]

//! Host time for the controller.

use core::time::Duration;

use web_time::Instant;

/// Monotonic time since the page was mounted.
#[derive(Debug, Clone, Copy)]
pub struct HostClock {
    origin: Instant,
}

impl HostClock {
    #[must_use]
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// `setTimeout` delay that lands at or after `deadline`.
///
/// Rounds up to whole milliseconds so the wakeup never fires early.
#[must_use]
pub fn timeout_ms(now: Duration, deadline: Duration) -> i32 {
    let remaining = deadline.saturating_sub(now);
    let ms = remaining.as_micros().div_ceil(1000);
    i32::try_from(ms).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn timeout_rounds_up() {
        let now = Duration::from_micros(10_400);
        assert_eq!(timeout_ms(now, Duration::from_millis(90)), 80);
        assert_eq!(timeout_ms(Duration::ZERO, Duration::from_micros(1)), 1);
    }

    #[test]
    fn past_deadline_fires_immediately() {
        assert_eq!(
            timeout_ms(Duration::from_secs(5), Duration::from_secs(1)),
            0
        );
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = HostClock::start();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
