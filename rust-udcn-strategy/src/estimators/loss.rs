//! Time-windowed loss ratio from sent/satisfied/timed-out Interests (C2).

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Disposition of an Interest once it leaves the `unknown` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacketStatus {
    /// Data returned before the interest lifetime elapsed.
    Satisfied,
    /// No Data returned before the interest lifetime elapsed.
    Lost,
    /// Data returned, but the interest lifetime has not elapsed yet —
    /// promoted to `Satisfied` the next time the window is queried.
    FutureSatisfied,
}

/// Loss estimator with a sliding time window, as described in §4.2.
///
/// Interests live in `unknown` (keyed by name) until they are satisfied or
/// time out, at which point they move into `decided`, keyed by their
/// original send timestamp so the window can be evaluated by range. Two
/// Interests can share the same send timestamp (§3 only requires `decided`'s
/// timestamps to be monotonically *non-decreasing*, not distinct — S1 sends
/// three Interests at the same instant), so each timestamp bucket holds a
/// `Vec` of dispositions rather than a single one.
#[derive(Debug)]
pub struct LossEstimator {
    interest_lifetime: Duration,
    window_size: Duration,
    unknown: HashMap<String, Instant>,
    decided: BTreeMap<Instant, Vec<PacketStatus>>,
}

impl LossEstimator {
    /// Constructs a loss estimator. Fails with [`Error::InvalidWindow`] if
    /// `window_size` is not strictly greater than `interest_lifetime`.
    pub fn new(interest_lifetime: Duration, window_size: Duration) -> Result<Self> {
        if window_size <= interest_lifetime {
            return Err(Error::InvalidWindow {
                window_ms: window_size.as_millis() as u64,
                lifetime_ms: interest_lifetime.as_millis() as u64,
            });
        }
        Ok(Self {
            interest_lifetime,
            window_size,
            unknown: HashMap::new(),
            decided: BTreeMap::new(),
        })
    }

    /// Records an Interest as sent at `now`. Fails with
    /// [`Error::DuplicateSend`] if `name` is already pending — the caller
    /// owns name uniqueness, so a duplicate indicates a programming error.
    pub fn add_sent(&mut self, name: &str, now: Instant) -> Result<()> {
        if self.unknown.contains_key(name) {
            return Err(Error::DuplicateSend(name.to_string()));
        }
        self.unknown.insert(name.to_string(), now);
        Ok(())
    }

    /// Records a Data arrival for `name` at `now`. If the name is still
    /// pending, it moves from `unknown` into `decided` tagged
    /// `FutureSatisfied`, keyed by its original send time. If the name is
    /// unknown (Data returned after its lifetime already expired it into
    /// `Lost`, or after `lossPercentage` dropped it from the window), the
    /// satisfaction is still recorded positively, keyed by `now`.
    pub fn add_satisfied(&mut self, name: &str, now: Instant) {
        match self.unknown.remove(name) {
            Some(sent_at) => {
                self.decided
                    .entry(sent_at)
                    .or_default()
                    .push(PacketStatus::FutureSatisfied);
            }
            None => {
                log::debug!(
                    "Data for {name} arrived with no pending Interest; late or already decided"
                );
                self.decided
                    .entry(now)
                    .or_default()
                    .push(PacketStatus::FutureSatisfied);
            }
        }
    }

    /// Computes the current loss ratio in `[0, 1]`, as of `now`.
    ///
    /// Mutates internal state first (promotion, timeout, window eviction),
    /// snapshotting the keys that must move before mutating either map, so
    /// no structure is mutated while it is being iterated.
    pub fn loss_percentage(&mut self, now: Instant) -> f64 {
        // 1. Promote FutureSatisfied -> Satisfied once the lifetime elapses.
        for (sent_at, statuses) in self.decided.iter_mut() {
            if now > *sent_at + self.interest_lifetime {
                for status in statuses.iter_mut() {
                    if *status == PacketStatus::FutureSatisfied {
                        *status = PacketStatus::Satisfied;
                    }
                }
            }
        }

        // 2. Time out any still-unknown Interest whose lifetime has elapsed.
        let timed_out: Vec<(String, Instant)> = self
            .unknown
            .iter()
            .filter(|(_, sent_at)| now > **sent_at + self.interest_lifetime)
            .map(|(name, sent_at)| (name.clone(), *sent_at))
            .collect();
        for (name, sent_at) in timed_out {
            self.unknown.remove(&name);
            self.decided.entry(sent_at).or_default().push(PacketStatus::Lost);
        }

        // 3. Evict anything that has fallen out of the window.
        let cutoff = now.checked_sub(self.window_size);
        if let Some(cutoff) = cutoff {
            self.decided.retain(|ts, _| *ts >= cutoff);
        }

        // 4. Compute the ratio over SATISFIED and LOST only.
        if self.decided.is_empty() {
            return 0.0;
        }
        let (mut satisfied, mut lost) = (0u64, 0u64);
        for statuses in self.decided.values() {
            for status in statuses {
                match status {
                    PacketStatus::Satisfied => satisfied += 1,
                    PacketStatus::Lost => lost += 1,
                    PacketStatus::FutureSatisfied => {}
                }
            }
        }
        if satisfied + lost == 0 {
            return 0.0;
        }
        lost as f64 / (satisfied + lost) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_window_not_greater_than_lifetime() {
        let err = LossEstimator::new(Duration::from_millis(2000), Duration::from_millis(2000));
        assert!(matches!(err, Err(Error::InvalidWindow { .. })));
    }

    #[test]
    fn duplicate_send_is_an_error() {
        let mut loss =
            LossEstimator::new(Duration::from_millis(2000), Duration::from_millis(5000)).unwrap();
        let t0 = Instant::now();
        loss.add_sent("/a", t0).unwrap();
        assert!(matches!(loss.add_sent("/a", t0), Err(Error::DuplicateSend(_))));
    }

    #[test]
    fn loss_ratio_bounds_hold() {
        let mut loss =
            LossEstimator::new(Duration::from_millis(2000), Duration::from_millis(5000)).unwrap();
        let t0 = Instant::now();
        loss.add_sent("/a", t0).unwrap();
        loss.add_sent("/b", t0).unwrap();
        loss.add_sent("/c", t0).unwrap();
        loss.add_satisfied("/a", t0 + Duration::from_millis(100));

        // S1: at t=2500, b and c have timed out LOST, a is SATISFIED.
        let p = loss.loss_percentage(t0 + Duration::from_millis(2500));
        assert!((p - (2.0 / 3.0)).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn late_satisfaction_never_counts_as_lost() {
        let mut loss =
            LossEstimator::new(Duration::from_millis(2000), Duration::from_millis(5000)).unwrap();
        let t0 = Instant::now();
        loss.add_sent("/a", t0).unwrap();
        // Satisfied well before the lifetime elapses.
        loss.add_satisfied("/a", t0 + Duration::from_millis(500));
        // Query after the lifetime has elapsed: FutureSatisfied -> Satisfied.
        let p = loss.loss_percentage(t0 + Duration::from_millis(2500));
        assert_eq!(p, 0.0);
    }

    #[test]
    fn simultaneous_sends_each_get_their_own_decided_entry() {
        // /a, /b, /c all decided at the same instant must not collide into
        // a single decided-map slot.
        let mut loss =
            LossEstimator::new(Duration::from_millis(2000), Duration::from_millis(5000)).unwrap();
        let t0 = Instant::now();
        loss.add_sent("/a", t0).unwrap();
        loss.add_sent("/b", t0).unwrap();
        loss.add_sent("/c", t0).unwrap();
        loss.add_satisfied("/a", t0);
        loss.add_satisfied("/b", t0);
        // /c never satisfied -> times out LOST once the lifetime elapses.
        let p = loss.loss_percentage(t0 + Duration::from_millis(2500));
        assert!((p - (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_window_is_zero() {
        let mut loss =
            LossEstimator::new(Duration::from_millis(2000), Duration::from_millis(5000)).unwrap();
        assert_eq!(loss.loss_percentage(Instant::now()), 0.0);
    }
}
