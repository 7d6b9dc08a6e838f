//! Quiet-period debouncer.
//!
//! Pure timing state: callers pass `now` in, so the same type drives the
//! scroll fallback (inside the overrider) and file watching (inside the CLI)
//! and can be tested without sleeping.

use std::time::{Duration, Instant};

/// Idle sleep when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Fires once after `quiet` has elapsed since the last `touch`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record an event, pushing the deadline out by a full quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume the pending deadline when it has passed.
    pub fn take_if_ready(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.deadline = None;
            return true;
        }
        false
    }

    /// Precise sleep duration until the deadline.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => IDLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(100);

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.touch(start);

        assert!(!debouncer.take_if_ready(start + Duration::from_millis(99)));
        assert!(debouncer.take_if_ready(start + QUIET));
        assert!(debouncer.deadline().is_none());
        assert!(!debouncer.take_if_ready(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_touch_rearms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(80));

        assert!(!debouncer.is_ready(start + Duration::from_millis(150)));
        assert!(debouncer.is_ready(start + Duration::from_millis(180)));
        assert_eq!(
            debouncer.sleep_duration(start + Duration::from_millis(150)),
            Duration::from_millis(30)
        );
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.touch(start);
        debouncer.cancel();

        assert!(!debouncer.is_ready(start + QUIET));
        assert_eq!(debouncer.sleep_duration(start), IDLE);
    }
}
