//! Maps traffic-consumed / traffic-limit to a bounded cost (C4).

/// Initial cost assigned to a face before any traffic limit is configured.
pub const DEFAULT_COST: f64 = 100.0;
/// Upper bound of the cost scale; a face that has exceeded its traffic
/// limit is pushed one unit past this.
pub const MAX_COST: f64 = 1000.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Traffic-driven cost estimator, as described in §4.4.
///
/// `cost` only ever moves up while a traffic limit is set: [`Self::add_traffic`]
/// proposes a new cost from consumed-over-limit and applies it only if it
/// exceeds the current cost.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    cost: f64,
    consumed_mb: f64,
    limit_mb: Option<f64>,
}

impl CostEstimator {
    pub fn new() -> Self {
        Self {
            cost: DEFAULT_COST,
            consumed_mb: 0.0,
            limit_mb: None,
        }
    }

    /// Directly sets the cost, bypassing the monotone-upward ramp. Used to
    /// seed a face's cost from the FIB next-hop cost rather than from
    /// traffic, matching `MadmStrategy`'s one-time initialization.
    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Adds `bytes` of delivered traffic and re-evaluates the cost.
    pub fn add_traffic(&mut self, bytes: f64) {
        self.consumed_mb += bytes / BYTES_PER_MB;
        self.adjust_cost();
    }

    /// Sets (or replaces) the traffic limit in MB and re-evaluates the cost.
    pub fn set_limit(&mut self, limit_mb: f64) {
        self.limit_mb = Some(limit_mb);
        self.adjust_cost();
    }

    pub fn is_limited(&self) -> bool {
        self.limit_mb.is_some()
    }

    fn adjust_cost(&mut self) {
        let Some(limit_mb) = self.limit_mb else {
            log::trace!("face is not traffic-limited; not adjusting cost");
            return;
        };
        let fraction = self.consumed_mb / limit_mb;
        let proposed = if fraction > 1.0 {
            MAX_COST + 1.0
        } else {
            MAX_COST * fraction
        };
        if proposed > self.cost {
            self.cost = proposed;
        }
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_face_never_changes_cost() {
        let mut cost = CostEstimator::new();
        cost.add_traffic(10.0 * 1024.0 * 1024.0);
        assert_eq!(cost.cost(), DEFAULT_COST);
    }

    #[test]
    fn cost_ramp_matches_scenario_s2() {
        let mut cost = CostEstimator::new();
        cost.set_limit(10.0);
        assert_eq!(cost.cost(), DEFAULT_COST);

        cost.add_traffic(5.0 * 1024.0 * 1024.0);
        assert!((cost.cost() - 500.0).abs() < 1e-6);

        cost.add_traffic(4.0 * 1024.0 * 1024.0);
        assert!((cost.cost() - 900.0).abs() < 1e-6);

        cost.add_traffic(2.0 * 1024.0 * 1024.0);
        assert!((cost.cost() - 1001.0).abs() < 1e-6);
    }

    #[test]
    fn cost_is_monotone_upward() {
        let mut cost = CostEstimator::new();
        cost.set_limit(10.0);
        let mut last = cost.cost();
        for _ in 0..5 {
            cost.add_traffic(1.0 * 1024.0 * 1024.0);
            assert!(cost.cost() >= last);
            last = cost.cost();
        }
    }

    #[test]
    fn set_cost_bypasses_the_ramp() {
        let mut cost = CostEstimator::new();
        cost.set_cost(42.0);
        assert_eq!(cost.cost(), 42.0);
        // Without a limit, traffic does not move it.
        cost.add_traffic(1.0 * 1024.0 * 1024.0);
        assert_eq!(cost.cost(), 42.0);
    }
}
