//! Per-face bundle of RTT/loss/bandwidth estimators (C5).

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::estimators::bandwidth::BandwidthEstimator;
use crate::estimators::loss::LossEstimator;
use crate::estimators::rtt::RttEstimator;
use crate::requirements::RequirementType;

/// Bundles the three raw estimators (C1-C3) that together describe one
/// face's recent performance, and dispatches by [`RequirementType`].
#[derive(Debug)]
pub struct InterfaceEstimation {
    rtt: RttEstimator,
    loss: LossEstimator,
    bandwidth: BandwidthEstimator,
}

impl InterfaceEstimation {
    pub fn new(interest_lifetime: Duration, loss_window: Duration) -> Result<Self> {
        Ok(Self {
            rtt: RttEstimator::new(),
            loss: LossEstimator::new(interest_lifetime, loss_window)?,
            bandwidth: BandwidthEstimator::default(),
        })
    }

    /// Records an Interest as sent, for loss tracking.
    pub fn add_sent(&mut self, name: &str, now: Instant) -> Result<()> {
        self.loss.add_sent(name, now)
    }

    /// Records a satisfying Data: `bytes` feeds the bandwidth estimator,
    /// `name` resolves the loss estimator's pending entry.
    pub fn add_satisfied(&mut self, bytes: u64, name: &str, now: Instant) {
        self.loss.add_satisfied(name, now);
        self.bandwidth.add_delivered(bytes, now);
    }

    /// Records an RTT sample observed for this face.
    pub fn add_rtt(&mut self, sample: Duration) {
        self.rtt.add_sample(sample);
    }

    /// Reads the current value of `ty` for this face. Unknown/unsupported
    /// types return `-1.0`, matching the raw estimators' own sentinel for
    /// "no data yet".
    pub fn value(&mut self, ty: RequirementType, now: Instant) -> f64 {
        match ty {
            RequirementType::Delay => self.rtt.current(),
            RequirementType::Loss => self.loss.loss_percentage(now),
            RequirementType::Bandwidth => self.bandwidth.current(now),
            RequirementType::Cost => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface() -> InterfaceEstimation {
        InterfaceEstimation::new(Duration::from_millis(2000), Duration::from_millis(5000)).unwrap()
    }

    #[test]
    fn delay_reads_through_to_rtt() {
        let mut iface = iface();
        assert_eq!(iface.value(RequirementType::Delay, Instant::now()), -1.0);
        iface.add_rtt(Duration::from_millis(40));
        assert_eq!(iface.value(RequirementType::Delay, Instant::now()), 40.0);
    }

    #[test]
    fn bandwidth_reads_through_to_bandwidth_estimator() {
        let mut iface = iface();
        let t0 = Instant::now();
        iface.add_sent("/a", t0).unwrap();
        iface.add_satisfied(125_000, "/a", t0);
        // a fresh BandwidthEstimator uses the 5s default window
        let kbps = iface.value(RequirementType::Bandwidth, t0);
        assert!((kbps - 200.0).abs() < 1e-6);
    }

    #[test]
    fn loss_reads_through_to_loss_estimator() {
        let mut iface = iface();
        let t0 = Instant::now();
        iface.add_sent("/a", t0).unwrap();
        iface.add_sent("/b", t0).unwrap();
        iface.add_satisfied(10, "/a", t0);
        let ratio = iface.value(RequirementType::Loss, t0 + Duration::from_millis(2500));
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn cost_is_not_tracked_here() {
        let mut iface = iface();
        assert_eq!(iface.value(RequirementType::Cost, Instant::now()), -1.0);
    }
}
