//! Decides when a probe cycle over non-selected next-hops is due (C7).

use std::time::{Duration, Instant};

/// Default interval between probe cycles. The original leaves this
/// unspecified; treated here as a configurable parameter (see
/// `StrategyConfig::probing_interval`).
pub const DEFAULT_PROBING_INTERVAL: Duration = Duration::from_secs(15);

/// Tracks the last time a probe cycle fired and decides when the next one
/// is due. Cheap and idempotent: calling `due` repeatedly with the same
/// `now` returns the same answer until a probe is actually recorded.
#[derive(Debug, Clone)]
pub struct ProbingHelper {
    interval: Duration,
    last_probe: Option<Instant>,
}

impl ProbingHelper {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_probe: None,
        }
    }

    /// `true` iff a probe cycle is due at `now`. Does not itself mark a
    /// probe as having happened — callers that act on `true` must follow up
    /// with [`Self::record_probe`].
    pub fn due(&self, now: Instant) -> bool {
        match self.last_probe {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    /// Marks a probe cycle as having fired at `now`.
    pub fn record_probe(&mut self, now: Instant) {
        self.last_probe = Some(now);
    }
}

impl Default for ProbingHelper {
    fn default() -> Self {
        Self::new(DEFAULT_PROBING_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_is_always_due() {
        let probing = ProbingHelper::new(Duration::from_secs(10));
        assert!(probing.due(Instant::now()));
    }

    #[test]
    fn not_due_again_until_interval_elapses() {
        let mut probing = ProbingHelper::new(Duration::from_secs(10));
        let t0 = Instant::now();
        probing.record_probe(t0);
        assert!(!probing.due(t0 + Duration::from_secs(5)));
        assert!(probing.due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn repeated_due_checks_without_recording_are_stable() {
        let probing = ProbingHelper::new(Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(probing.due(t0), probing.due(t0));
    }
}
