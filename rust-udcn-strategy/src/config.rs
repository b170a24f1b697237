//! Configuration for the forwarding strategy core.
//!
//! Bundles the constants the original C++ headers hard-code (hysteresis
//! percentage, default cost bounds, RTT smoothing factor) alongside the one
//! parameter the source leaves unspecified — the probing interval (§4.7,
//! an open question) — so an embedding daemon can tune them without
//! touching strategy code.

use std::time::Duration;

use crate::estimators::cost::{DEFAULT_COST, MAX_COST};
use crate::probing::DEFAULT_PROBING_INTERVAL;
use crate::strategy::lowest_cost::HYSTERESIS;

/// Construction parameters shared by every strategy and its per-face
/// estimators.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Assumed Interest lifetime; the loss estimator's window must exceed
    /// this (§4.2).
    pub interest_lifetime: Duration,

    /// Sliding window over which the loss ratio is computed.
    pub loss_window: Duration,

    /// Sliding window over which bandwidth is averaged (§4.3).
    pub bandwidth_window: Duration,

    /// Interval between probe cycles (§4.7). Left unspecified in the
    /// original; treated here as a tunable.
    pub probing_interval: Duration,

    /// Fraction by which a non-working face's limits are tightened
    /// (downward attributes) or widened (upward attributes) — §4.8/§4.9.
    pub hysteresis: f64,

    /// Initial per-face cost before any traffic limit is configured.
    pub default_cost: f64,

    /// Upper bound of the cost scale.
    pub max_cost: f64,
}

impl StrategyConfig {
    pub fn with_interest_lifetime(mut self, lifetime: Duration) -> Self {
        self.interest_lifetime = lifetime;
        self
    }

    pub fn with_loss_window(mut self, window: Duration) -> Self {
        self.loss_window = window;
        self
    }

    pub fn with_bandwidth_window(mut self, window: Duration) -> Self {
        self.bandwidth_window = window;
        self
    }

    pub fn with_probing_interval(mut self, interval: Duration) -> Self {
        self.probing_interval = interval;
        self
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            interest_lifetime: Duration::from_millis(2000),
            loss_window: Duration::from_millis(5000),
            bandwidth_window: Duration::from_millis(5000),
            probing_interval: DEFAULT_PROBING_INTERVAL,
            hysteresis: HYSTERESIS,
            default_cost: DEFAULT_COST,
            max_cost: MAX_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_original_constants() {
        let cfg = StrategyConfig::default();
        assert_eq!(cfg.hysteresis, 0.05);
        assert_eq!(cfg.default_cost, 100.0);
        assert_eq!(cfg.max_cost, 1000.0);
    }

    #[test]
    fn builder_methods_override_defaults() {
        let cfg = StrategyConfig::default()
            .with_probing_interval(Duration::from_secs(30))
            .with_loss_window(Duration::from_millis(8000));
        assert_eq!(cfg.probing_interval, Duration::from_secs(30));
        assert_eq!(cfg.loss_window, Duration::from_millis(8000));
    }
}
