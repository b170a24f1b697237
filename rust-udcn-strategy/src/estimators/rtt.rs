//! EWMA smoothing of per-face round-trip delay samples (C1).

use std::time::Duration;

/// Exponential weighting factor applied to each new sample. Matches the
/// classic TCP-style RTT smoothing constant (1/8).
const SMOOTHING_FACTOR: f64 = 1.0 / 8.0;

/// Smooths per-face RTT samples with an exponentially weighted moving
/// average. Returns `-1.0` until the first sample has been recorded.
#[derive(Debug, Clone, Default)]
pub struct RttEstimator {
    smoothed_rtt_us: Option<f64>,
}

impl RttEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a new RTT sample. The first sample seeds the smoothed mean
    /// directly; later samples are blended in with [`SMOOTHING_FACTOR`].
    pub fn add_sample(&mut self, sample: Duration) {
        let sample_us = sample.as_micros() as f64;
        self.smoothed_rtt_us = Some(match self.smoothed_rtt_us {
            None => sample_us,
            Some(prev) => prev + SMOOTHING_FACTOR * (sample_us - prev),
        });
    }

    /// Current smoothed RTT in milliseconds, or `-1.0` if no sample has ever
    /// been recorded.
    pub fn current(&self) -> f64 {
        match self.smoothed_rtt_us {
            Some(us) => us / 1000.0,
            None => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_samples_returns_negative_one() {
        let rtt = RttEstimator::new();
        assert_eq!(rtt.current(), -1.0);
    }

    #[test]
    fn first_sample_seeds_mean() {
        let mut rtt = RttEstimator::new();
        rtt.add_sample(Duration::from_millis(50));
        assert_eq!(rtt.current(), 50.0);
    }

    #[test]
    fn subsequent_samples_are_smoothed_towards_the_new_value() {
        let mut rtt = RttEstimator::new();
        rtt.add_sample(Duration::from_millis(100));
        rtt.add_sample(Duration::from_millis(50));
        // 100 + 1/8 * (50 - 100) = 93.75
        assert!((rtt.current() - 93.75).abs() < 1e-9);
    }
}
