//! Restart intensity: a sliding-window rate limiter for restarts.
//!
//! [`RestartWindow`] records the timestamps of recent restarts and decides
//! whether one more is still permitted. The window slides continuously —
//! it is not a fixed bucket reset on a timer — and timestamps age out
//! lazily on each check.
//!
//! For `OneForOne` each child entry owns its own window; for the group
//! strategies the supervisor keeps a single shared window, because a group
//! restart is one logical event (charging every stopped sibling
//! individually would make `max_restarts` strategy-dependent).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rolling set of restart timestamps.
#[derive(Debug, Default)]
pub(crate) struct RestartWindow {
    marks: VecDeque<Instant>,
}

impl RestartWindow {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decides whether a prospective restart at `now` must escalate.
    ///
    /// Prunes timestamps older than `now - window`, then:
    /// - if one more restart would exceed `max_restarts`, returns `true`
    ///   and records nothing (the supervisor is about to die anyway);
    /// - otherwise records `now` and returns `false`.
    ///
    /// At most `max_restarts` restarts are tolerated in any window of
    /// length `window`; with `max_restarts = 0` the first check escalates.
    pub(crate) fn should_escalate(
        &mut self,
        max_restarts: u32,
        window: Duration,
        now: Instant,
    ) -> bool {
        while let Some(&oldest) = self.marks.front() {
            if now.duration_since(oldest) > window {
                self.marks.pop_front();
            } else {
                break;
            }
        }
        if self.marks.len() as u64 + 1 > u64::from(max_restarts) {
            return true;
        }
        self.marks.push_back(now);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1);

    #[test]
    fn zero_budget_escalates_immediately() {
        let mut w = RestartWindow::new();
        assert!(w.should_escalate(0, WINDOW, Instant::now()));
    }

    #[test]
    fn escalates_on_excess_within_window() {
        let mut w = RestartWindow::new();
        let t0 = Instant::now();
        assert!(!w.should_escalate(3, WINDOW, t0));
        assert!(!w.should_escalate(3, WINDOW, t0 + Duration::from_millis(100)));
        assert!(!w.should_escalate(3, WINDOW, t0 + Duration::from_millis(200)));
        assert!(w.should_escalate(3, WINDOW, t0 + Duration::from_millis(300)));
    }

    #[test]
    fn window_slides_continuously() {
        let mut w = RestartWindow::new();
        let t0 = Instant::now();
        assert!(!w.should_escalate(2, WINDOW, t0));
        assert!(!w.should_escalate(2, WINDOW, t0 + Duration::from_millis(900)));
        // t0 has aged out by now; one slot is free again.
        assert!(!w.should_escalate(2, WINDOW, t0 + Duration::from_millis(1500)));
        assert!(w.should_escalate(2, WINDOW, t0 + Duration::from_millis(1600)));
    }

    #[test]
    fn veto_does_not_record() {
        let mut w = RestartWindow::new();
        let t0 = Instant::now();
        assert!(!w.should_escalate(1, WINDOW, t0));
        assert!(w.should_escalate(1, WINDOW, t0 + Duration::from_millis(100)));
        // The vetoed attempt left no mark: after the window passes, a
        // restart is permitted again.
        assert!(!w.should_escalate(1, WINDOW, t0 + Duration::from_millis(1200)));
    }
}
