//! Hysteresis state machine.
//!
//! # State Transitions
//! ```text
//! Unknown/Down → Up:   consecutive successes >= healthy threshold
//! Unknown/Up   → Down: consecutive failures  >= unhealthy threshold
//! ```
//!
//! # Design Decisions
//! - Counters are mutually exclusive run lengths; a success zeroes the failure
//!   run and vice versa
//! - Counters saturate at their threshold, so long uptimes never overflow
//! - A change is reported only when the held verdict actually differs;
//!   re-crossing a threshold for the verdict already held is silent
//! - Pure logic: no I/O, no clock, no locking

use std::num::NonZeroU32;

use thiserror::Error;

use crate::health::verdict::Verdict;

/// Rejected threshold configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("healthy threshold must be at least 1")]
    ZeroHealthy,
    #[error("unhealthy threshold must be at least 1")]
    ZeroUnhealthy,
}

/// Run lengths required to confirm a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    healthy: NonZeroU32,
    unhealthy: NonZeroU32,
}

impl Thresholds {
    /// Build thresholds, refusing zero for either run length.
    pub fn new(healthy: u32, unhealthy: u32) -> Result<Self, ThresholdError> {
        let healthy = NonZeroU32::new(healthy).ok_or(ThresholdError::ZeroHealthy)?;
        let unhealthy = NonZeroU32::new(unhealthy).ok_or(ThresholdError::ZeroUnhealthy)?;
        Ok(Self { healthy, unhealthy })
    }

    /// Consecutive successes needed to confirm `Up`.
    pub fn healthy(&self) -> u32 {
        self.healthy.get()
    }

    /// Consecutive failures needed to confirm `Down`.
    pub fn unhealthy(&self) -> u32 {
        self.unhealthy.get()
    }
}

/// A verdict transition reported by [`HysteresisTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictChange {
    pub from: Verdict,
    pub to: Verdict,
}

/// Per-channel debouncer turning probe outcomes into a verdict.
#[derive(Debug, Clone)]
pub struct HysteresisTracker {
    thresholds: Thresholds,
    consecutive_successes: u32,
    consecutive_failures: u32,
    verdict: Verdict,
}

impl HysteresisTracker {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            consecutive_successes: 0,
            consecutive_failures: 0,
            verdict: Verdict::Unknown,
        }
    }

    /// Feed one probe outcome. Returns a change only when a threshold is
    /// crossed towards a verdict that is not already held.
    pub fn observe(&mut self, healthy: bool) -> Option<VerdictChange> {
        if healthy {
            self.consecutive_failures = 0;
            self.consecutive_successes = self
                .consecutive_successes
                .saturating_add(1)
                .min(self.thresholds.healthy());
        } else {
            self.consecutive_successes = 0;
            self.consecutive_failures = self
                .consecutive_failures
                .saturating_add(1)
                .min(self.thresholds.unhealthy());
        }

        if self.consecutive_successes >= self.thresholds.healthy() && self.verdict != Verdict::Up {
            return Some(self.transition(Verdict::Up));
        }
        if self.consecutive_failures >= self.thresholds.unhealthy() && self.verdict != Verdict::Down {
            return Some(self.transition(Verdict::Down));
        }
        None
    }

    fn transition(&mut self, to: Verdict) -> VerdictChange {
        let from = self.verdict;
        self.verdict = to;
        VerdictChange { from, to }
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(healthy: u32, unhealthy: u32) -> HysteresisTracker {
        HysteresisTracker::new(Thresholds::new(healthy, unhealthy).unwrap())
    }

    fn feed(tracker: &mut HysteresisTracker, outcomes: &[bool]) -> Vec<Verdict> {
        outcomes
            .iter()
            .filter_map(|&o| tracker.observe(o))
            .map(|change| change.to)
            .collect()
    }

    #[test]
    fn test_zero_thresholds_rejected() {
        assert_eq!(Thresholds::new(0, 3), Err(ThresholdError::ZeroHealthy));
        assert_eq!(Thresholds::new(3, 0), Err(ThresholdError::ZeroUnhealthy));
        assert!(Thresholds::new(1, 1).is_ok());
    }

    #[test]
    fn test_starts_unknown() {
        let t = tracker(3, 2);
        assert_eq!(t.verdict(), Verdict::Unknown);
        assert_eq!(t.consecutive_successes(), 0);
        assert_eq!(t.consecutive_failures(), 0);
    }

    #[test]
    fn test_mixed_sequence_reports_down_then_up() {
        let mut t = tracker(3, 2);
        let outcomes = [false, false, true, true, true, false, true, true];

        let mut events = Vec::new();
        for (i, &o) in outcomes.iter().enumerate() {
            if let Some(change) = t.observe(o) {
                events.push((i, change));
            }
        }

        assert_eq!(
            events,
            vec![
                (1, VerdictChange { from: Verdict::Unknown, to: Verdict::Down }),
                (4, VerdictChange { from: Verdict::Down, to: Verdict::Up }),
            ]
        );
        assert_eq!(t.verdict(), Verdict::Up);
    }

    #[test]
    fn test_below_threshold_stays_unknown() {
        let mut t = tracker(3, 3);
        assert!(feed(&mut t, &[true, true, false, false]).is_empty());
        assert_eq!(t.verdict(), Verdict::Unknown);
    }

    #[test]
    fn test_single_failure_breaks_success_run() {
        let mut t = tracker(3, 5);
        let events = feed(&mut t, &[true, true, false, true, true]);
        assert!(events.is_empty());
        assert_eq!(t.verdict(), Verdict::Unknown);
        assert_eq!(t.consecutive_successes(), 2);
    }

    #[test]
    fn test_no_duplicate_up_events() {
        let mut t = tracker(2, 2);
        assert_eq!(feed(&mut t, &[true, true]), vec![Verdict::Up]);
        assert!(feed(&mut t, &[true; 50]).is_empty());
        assert_eq!(feed(&mut t, &[false]), vec![]);
        assert_eq!(feed(&mut t, &[false]), vec![Verdict::Down]);
    }

    #[test]
    fn test_counters_are_mutually_exclusive() {
        let mut t = tracker(4, 4);
        for &o in &[true, true, false, true, false, false, true] {
            t.observe(o);
            assert!(t.consecutive_successes() == 0 || t.consecutive_failures() == 0);
        }
    }

    #[test]
    fn test_counters_saturate() {
        let mut t = tracker(3, 2);
        for _ in 0..10_000 {
            t.observe(true);
        }
        assert_eq!(t.consecutive_successes(), 3);

        for _ in 0..10_000 {
            t.observe(false);
        }
        assert_eq!(t.consecutive_failures(), 2);
        assert_eq!(t.consecutive_successes(), 0);
        assert_eq!(t.verdict(), Verdict::Down);
    }

    #[test]
    fn test_threshold_of_one_reacts_immediately() {
        let mut t = tracker(1, 1);
        assert_eq!(feed(&mut t, &[false]), vec![Verdict::Down]);
        assert!(feed(&mut t, &[false; 100]).is_empty());
        assert_eq!(t.verdict(), Verdict::Down);
        assert_eq!(feed(&mut t, &[true]), vec![Verdict::Up]);
    }

    #[test]
    fn test_trailing_success_run_converges_up() {
        let prefixes: [&[bool]; 4] = [
            &[],
            &[false, false, false],
            &[true, false, true, false],
            &[true, true, true, false, false],
        ];
        for prefix in prefixes {
            let mut t = tracker(3, 2);
            feed(&mut t, prefix);
            feed(&mut t, &[true, true, true]);
            assert_eq!(t.verdict(), Verdict::Up, "prefix {:?}", prefix);
        }
    }
}
