//! Cooperative, single-threaded timing primitives.
//!
//! Nothing here spawns threads or reads the clock: time is always handed in
//! by the host's event loop, which calls the coordinator's `tick` once per
//! turn. That makes the two suspension points of the system (the deferred
//! selection-match evaluation and the debounced resize) deterministic under
//! test.

use std::time::{Duration, Instant};

/// Quiet window for coalescing resize notifications.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Trailing-edge debounce with reschedule-cancels-previous semantics.
///
/// Each `signal` replaces any pending deadline (last call wins); `fire`
/// consumes the deadline once the quiet window has elapsed.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a signal at `now`, rescheduling the trailing deadline.
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Consume the deadline if the quiet window has elapsed by `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// One-shot task armed now and run on the next scheduling tick.
///
/// Models the zero-delay deferral that lets platform selection state settle
/// before it is read.
#[derive(Debug, Default)]
pub struct Deferred {
    armed: bool,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Consume the armed flag; true at most once per arm.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_fires_only_after_quiet_window() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));

        debounce.signal(start);
        assert!(debounce.is_pending());
        assert!(!debounce.fire(start + Duration::from_millis(50)));
        assert!(debounce.fire(start + Duration::from_millis(100)));
        assert!(!debounce.fire(start + Duration::from_millis(200)), "deadline is consumed");
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_resignal_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));

        debounce.signal(start);
        debounce.signal(start + Duration::from_millis(80));

        // The first deadline would have passed, but rescheduling canceled it
        assert!(!debounce.fire(start + Duration::from_millis(120)));
        assert!(debounce.fire(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_rapid_signals_collapse_to_one_firing() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));

        for burst in 0..10 {
            debounce.signal(start + Duration::from_millis(burst * 10));
        }
        let mut firings = 0;
        for tick in 0..40 {
            if debounce.fire(start + Duration::from_millis(tick * 10)) {
                firings += 1;
            }
        }
        assert_eq!(firings, 1);
    }

    #[test]
    fn test_deferred_runs_once_per_arm() {
        let mut deferred = Deferred::new();
        assert!(!deferred.take());

        deferred.arm();
        assert!(deferred.is_armed());
        assert!(deferred.take());
        assert!(!deferred.take());
    }
}
