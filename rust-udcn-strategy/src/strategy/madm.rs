//! Normalized additive-weight (MADM) selection (C9).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rust_udcn_common::types::FaceId;

use crate::collaborators::{Forwarder, MeasurementAccessor, NextHop, PitEntry, MEASUREMENT_TYPE_ID};
use crate::config::StrategyConfig;
use crate::estimators::{CostEstimator, InterfaceEstimation};
use crate::measurement::PrefixMeasurement;
use crate::probing::ProbingHelper;
use crate::requirements::{RequirementSet, RequirementType};
use crate::strategy::lowest_cost::HYSTERESIS;
use crate::strategy::{IncomingData, IncomingInterest, Strategy};

const STRATEGY_NAME: &str = "ndn:/localhost/nfd/strategy/madm/%FD%01/";

/// Normalized-additive-weight forwarding strategy: scores every forwardable
/// next-hop on each requirement attribute in `[0, 1]` and picks the highest
/// total (§4.9).
///
/// Per-prefix state lives in the forwarder's measurement accessor, like
/// `LowestCostStrategy`; `face_info_table` and `cost_map` are this strategy
/// instance's own, per §3.
pub struct MadmStrategy {
    face_info_table: HashMap<FaceId, InterfaceEstimation>,
    cost_map: HashMap<FaceId, CostEstimator>,
    probing: ProbingHelper,
    initialized: bool,
    interest_lifetime: Duration,
    loss_window: Duration,
}

impl MadmStrategy {
    pub fn new(interest_lifetime: Duration, loss_window: Duration) -> Self {
        Self {
            face_info_table: HashMap::new(),
            cost_map: HashMap::new(),
            probing: ProbingHelper::default(),
            initialized: false,
            interest_lifetime,
            loss_window,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            face_info_table: HashMap::new(),
            cost_map: HashMap::new(),
            probing: ProbingHelper::new(config.probing_interval),
            initialized: false,
            interest_lifetime: config.interest_lifetime,
            loss_window: config.loss_window,
        }
    }

    pub fn strategy_name() -> &'static str {
        STRATEGY_NAME
    }

    fn face_info(&mut self, face: FaceId) -> &mut InterfaceEstimation {
        self.face_info_table.entry(face).or_insert_with(|| {
            InterfaceEstimation::new(self.interest_lifetime, self.loss_window)
                .expect("loss window configured greater than interest lifetime")
        })
    }

    fn cost(&mut self, face: FaceId) -> &mut CostEstimator {
        self.cost_map.entry(face).or_default()
    }

    /// Finds the measurement record pinned at `fib_prefix`, or creates and
    /// persists a fresh one (parsing Strategy-Choice parameters for
    /// `interest_name`) if none exists yet — see
    /// `LowestCostStrategy::load_or_create_measurement`.
    fn load_or_create_measurement<F: Forwarder>(
        forwarder: &mut F,
        fib_prefix: &str,
        interest_name: &str,
    ) -> PrefixMeasurement {
        if let Some(m) = forwarder
            .measurements()
            .find_prefix_measurement(fib_prefix, MEASUREMENT_TYPE_ID)
        {
            return m;
        }
        log::info!("new prefix {fib_prefix}");
        let mut requirements = RequirementSet::all_supported();
        let params = forwarder
            .strategy_choice()
            .find_effective_parameters(interest_name);
        requirements.parse_parameters(&params);
        let measurement = PrefixMeasurement::new(requirements);
        forwarder.measurements_mut().add_prefix_measurement(
            fib_prefix,
            MEASUREMENT_TYPE_ID,
            measurement.clone(),
        );
        measurement
    }

    /// §4.9 step 2's `s(v, lo, hi)`, already folded with the
    /// upward/downward flip.
    fn sub_score(value: f64, lo: f64, hi: f64, is_upward: bool) -> f64 {
        let s = if value <= lo {
            1.0
        } else if value >= hi {
            0.0
        } else {
            1.0 - (value - lo) / (hi - lo)
        };
        if is_upward {
            1.0 - s
        } else {
            s
        }
    }

    fn probe(
        &mut self,
        out_face: FaceId,
        nexthops: &[NextHop],
        req: &RequirementSet,
        interest: &IncomingInterest,
    ) {
        let (_, cost_hi) = req.get_limits(RequirementType::Cost);
        let cost_bound = if cost_hi != -1.0 { Some(cost_hi) } else { None };

        for hop in nexthops {
            if hop.face == out_face {
                continue;
            }
            if let Some(bound) = cost_bound {
                let current = self.cost(hop.face).cost();
                if current > bound {
                    log::debug!("cost too high: {current} > {bound}");
                    continue;
                }
            }
            let name = interest.name.clone();
            if let Err(err) = self.face_info(hop.face).add_sent(&name, Instant::now()) {
                log::debug!("probe add_sent failed for face {:?}: {err}", hop.face);
            }
        }
    }
}

impl<F: Forwarder> Strategy<F> for MadmStrategy {
    fn after_receive_interest(
        &mut self,
        forwarder: &mut F,
        _in_face: FaceId,
        interest: &IncomingInterest,
        fib_prefix: &str,
        nexthops: &[NextHop],
        pit_entry: &dyn PitEntry,
    ) {
        let now = Instant::now();

        if !self.initialized {
            for hop in nexthops {
                self.cost(hop.face).set_cost(hop.cost as f64);
            }
            self.initialized = true;
        }

        let mut measurement = Self::load_or_create_measurement(forwarder, fib_prefix, &interest.name);
        let working_face = measurement.working_face();
        let req = measurement.requirements().clone();
        let own_types: Vec<RequirementType> = req.own_types().into_iter().collect();

        let mut out_face = None;
        let mut max_total = -1.0f64;

        for hop in nexthops {
            // §5: PIT-forwardability is not consulted here — MADM's
            // original scoring loop iterates every FIB next-hop
            // unconditionally and gates only at probe time.
            let is_working = Some(hop.face) == working_face;
            let mut total = 0.0;
            for &ty in &own_types {
                let value = if ty == RequirementType::Cost {
                    self.cost(hop.face).cost()
                } else {
                    self.face_info(hop.face).value(ty, now)
                };
                let (lo, hi) = req.get_limits(ty);

                let local_value = if ty == RequirementType::Bandwidth && !is_working {
                    0.5
                } else {
                    Self::sub_score(value, lo, hi, RequirementSet::is_upward_attribute(ty))
                };

                if local_value == 0.0 {
                    total = 0.0;
                    break;
                }
                total += local_value;
            }

            if is_working {
                total *= 1.0 + HYSTERESIS;
            }

            if total >= max_total {
                max_total = total;
                out_face = Some(hop.face);
            }
        }

        let Some(out_face) = out_face else {
            log::warn!("no face available for {}", interest.name);
            return;
        };

        if self.probing.due(now) {
            self.probing.record_probe(now);
            self.probe(out_face, nexthops, &req, interest);
        }

        if let Err(err) = self.face_info(out_face).add_sent(&interest.name, now) {
            log::debug!("add_sent failed for face {:?}: {err}", out_face);
        }

        if Some(out_face) != measurement.working_face() {
            log::trace!(
                "new current working face from {:?} to {:?}",
                measurement.working_face(),
                out_face
            );
            measurement.set_working_face(out_face);
            forwarder.measurements_mut().add_prefix_measurement(
                fib_prefix,
                MEASUREMENT_TYPE_ID,
                measurement,
            );
        }

        if let Some(face) = forwarder.face(out_face) {
            face.send_interest(&interest.name, false);
        }
        let _ = pit_entry;
    }

    fn before_satisfy_interest(
        &mut self,
        pit_entry: &dyn PitEntry,
        in_face: FaceId,
        data: &IncomingData,
    ) {
        let now = Instant::now();
        self.face_info(in_face)
            .add_satisfied(data.content_size, &data.name, now);
        self.cost(in_face).add_traffic(data.content_size as f64);

        if !pit_entry.has_in_records() {
            return;
        }
        if let Some(last_renewed) = pit_entry.out_record_last_renewed(in_face) {
            let rtt = now.saturating_duration_since(last_renewed);
            self.face_info(in_face).add_rtt(rtt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubPit;
    impl PitEntry for StubPit {
        fn can_forward_to(&self, _face: FaceId) -> bool {
            true
        }
        fn has_unexpired_out_records(&self) -> bool {
            false
        }
        fn has_in_records(&self) -> bool {
            true
        }
        fn out_record_last_renewed(&self, _face: FaceId) -> Option<Instant> {
            None
        }
    }

    #[test]
    fn zero_sub_score_zeroes_the_total() {
        assert_eq!(MadmStrategy::sub_score(200.0, 30.0, 100.0, false), 0.0);
    }

    #[test]
    fn scenario_s5_delay_only_scoring() {
        // F1 delay=40, F2 delay=80, limits 30-100, working=F1.
        let s1 = MadmStrategy::sub_score(40.0, 30.0, 100.0, false);
        let s2 = MadmStrategy::sub_score(80.0, 30.0, 100.0, false);
        assert!((s1 - 0.857142857).abs() < 1e-6);
        assert!((s2 - 0.285714286).abs() < 1e-6);
        let boosted_s1 = s1 * (1.0 + HYSTERESIS);
        assert!(boosted_s1 > s2);
    }

    #[test]
    fn upward_attribute_flips_the_score() {
        let downward = MadmStrategy::sub_score(50.0, 0.0, 100.0, false);
        let upward = MadmStrategy::sub_score(50.0, 0.0, 100.0, true);
        assert!((downward + upward - 1.0).abs() < 1e-9);
    }

    #[test]
    fn first_interest_seeds_cost_map_from_fib() {
        let mut s = MadmStrategy::new(Duration::from_millis(2000), Duration::from_millis(5000));
        let nexthops = vec![
            NextHop { face: FaceId(1), cost: 10 },
            NextHop { face: FaceId(2), cost: 20 },
        ];
        assert!(!s.initialized);
        for hop in &nexthops {
            s.cost(hop.face).set_cost(hop.cost as f64);
        }
        s.initialized = true;
        assert_eq!(s.cost(FaceId(1)).cost(), 10.0);
        assert_eq!(s.cost(FaceId(2)).cost(), 20.0);
    }
}
