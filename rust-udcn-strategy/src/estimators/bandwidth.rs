//! Moving average of delivered bytes per unit time (C3).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default window over which throughput is averaged, matching
/// `InterfaceEstimation`'s calculation window in the original.
pub const DEFAULT_CALCULATION_WINDOW: Duration = Duration::from_millis(5000);

/// Tracks delivered bytes in a sliding time window and reports throughput
/// in kilobits per second.
#[derive(Debug, Clone)]
pub struct BandwidthEstimator {
    window: Duration,
    deliveries: VecDeque<(Instant, u64)>,
}

impl BandwidthEstimator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deliveries: VecDeque::new(),
        }
    }

    /// Records `bytes` delivered at `now`.
    pub fn add_delivered(&mut self, bytes: u64, now: Instant) {
        self.deliveries.push_back((now, bytes));
    }

    /// Current throughput in kbps over the calculation window, evicting
    /// stale entries first. Returns `-1.0` if nothing remains in the window.
    pub fn current(&mut self, now: Instant) -> f64 {
        let cutoff = now.checked_sub(self.window);
        if let Some(cutoff) = cutoff {
            while let Some(&(ts, _)) = self.deliveries.front() {
                if ts < cutoff {
                    self.deliveries.pop_front();
                } else {
                    break;
                }
            }
        }

        if self.deliveries.is_empty() {
            return -1.0;
        }

        let total_bytes: u64 = self.deliveries.iter().map(|(_, bytes)| bytes).sum();
        let window_secs = self.window.as_secs_f64();
        if window_secs <= 0.0 {
            return -1.0;
        }
        // bytes/s -> kbps
        (total_bytes as f64 * 8.0 / 1000.0) / window_secs
    }
}

impl Default for BandwidthEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CALCULATION_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_samples_returns_negative_one() {
        let mut bw = BandwidthEstimator::new(Duration::from_millis(1000));
        assert_eq!(bw.current(Instant::now()), -1.0);
    }

    #[test]
    fn throughput_accumulates_within_window() {
        let mut bw = BandwidthEstimator::new(Duration::from_secs(1));
        let t0 = Instant::now();
        bw.add_delivered(125_000, t0); // 1000 kbit
        let kbps = bw.current(t0);
        assert!((kbps - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn stale_entries_are_evicted() {
        let mut bw = BandwidthEstimator::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        bw.add_delivered(125_000, t0);
        let later = t0 + Duration::from_millis(2000);
        assert_eq!(bw.current(later), -1.0);
    }
}
