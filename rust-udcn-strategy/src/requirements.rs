//! Per-prefix requirement parser and store (C6).

use std::collections::{BTreeMap, BTreeSet};

/// An attribute a strategy can bound with an operator-supplied requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequirementType {
    /// Usable bandwidth, in kbps. Upward: higher is better.
    Bandwidth,
    /// Traffic-driven cost metric. Downward: lower is better.
    Cost,
    /// Round-trip delay, in milliseconds. Downward: lower is better.
    Delay,
    /// Loss ratio, in `[0, 1]`. Downward: lower is better.
    Loss,
}

impl RequirementType {
    /// `true` for attributes where a higher measured value is preferable
    /// (only [`RequirementType::Bandwidth`]).
    pub fn is_upward(self) -> bool {
        matches!(self, RequirementType::Bandwidth)
    }
}

/// The set of per-attribute bounds parsed from a prefix's parameter string,
/// plus bookkeeping for which attributes this strategy understands and
/// which have actually been assigned a value.
#[derive(Debug, Clone)]
pub struct RequirementSet {
    limits: BTreeMap<RequirementType, (f64, f64)>,
    supported: BTreeSet<RequirementType>,
    initialized: BTreeSet<RequirementType>,
}

impl RequirementSet {
    /// Builds an (empty) requirement set for a strategy that understands
    /// `supported`.
    pub fn new(supported: impl IntoIterator<Item = RequirementType>) -> Self {
        Self {
            limits: BTreeMap::new(),
            supported: supported.into_iter().collect(),
            initialized: BTreeSet::new(),
        }
    }

    /// A requirement set understanding all four attribute types — the
    /// default used by `LowestCostStrategy` and `MadmStrategy`.
    pub fn all_supported() -> Self {
        Self::new([
            RequirementType::Bandwidth,
            RequirementType::Cost,
            RequirementType::Delay,
            RequirementType::Loss,
        ])
    }

    /// Parses a comma-separated `key=value` or `key=lower-upper` parameter
    /// string. Unrecognized keys and malformed pairs are skipped silently;
    /// duplicate keys let the last occurrence win. Returns `true` iff at
    /// least one supported key was parsed.
    pub fn parse_parameters(&mut self, s: &str) -> bool {
        let mut parsed_any = false;
        for pair in s.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                log::debug!("malformed parameter pair, skipping: {pair}");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            let req_type = match key {
                "maxloss" => RequirementType::Loss,
                "maxdelay" => RequirementType::Delay,
                "minbw" => RequirementType::Bandwidth,
                "maxcost" | "mincost" => RequirementType::Cost,
                "nonce" => continue, // consumed by the broadcast strategy only
                _ => {
                    log::trace!("unrecognized parameter key, ignoring: {key}");
                    continue;
                }
            };

            let Some((lower, upper)) = parse_bounds(value) else {
                log::debug!("malformed parameter value for {key}, skipping: {value}");
                continue;
            };

            if self.supported.contains(&req_type) {
                self.limits.insert(req_type, (lower, upper));
                self.initialized.insert(req_type);
                parsed_any = true;
            }
        }
        parsed_any
    }

    /// Re-serializes the currently initialized requirements back into the
    /// parameter-string grammar, in a stable key order.
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        for ty in [
            RequirementType::Loss,
            RequirementType::Delay,
            RequirementType::Bandwidth,
            RequirementType::Cost,
        ] {
            if let Some(&(lo, hi)) = self.limits.get(&ty) {
                let key = match ty {
                    RequirementType::Loss => "maxloss",
                    RequirementType::Delay => "maxdelay",
                    RequirementType::Bandwidth => "minbw",
                    RequirementType::Cost => "maxcost",
                };
                if lo == hi {
                    parts.push(format!("{key}={lo}"));
                } else {
                    parts.push(format!("{key}={lo}-{hi}"));
                }
            }
        }
        parts.join(",")
    }

    /// Returns `(lower, upper)` for `ty`, or `(-1.0, -1.0)` if unset.
    pub fn get_limits(&self, ty: RequirementType) -> (f64, f64) {
        self.limits.get(&ty).copied().unwrap_or((-1.0, -1.0))
    }

    /// Returns the lower limit for `ty`, logging a warning if the lower and
    /// upper bounds differ (callers that want a single threshold should use
    /// [`Self::get_limits`] when a genuine range is expected).
    pub fn get_limit(&self, ty: RequirementType) -> f64 {
        let (lo, hi) = self.get_limits(ty);
        if lo != hi {
            log::warn!("requirement {ty:?} has a range [{lo}, {hi}]; using lower bound {lo}");
        }
        lo
    }

    /// `true` iff `ty` is supported and has an assigned value.
    pub fn contains(&self, ty: RequirementType) -> bool {
        self.initialized.contains(&ty)
    }

    /// The supported and initialized attribute types.
    pub fn own_types(&self) -> BTreeSet<RequirementType> {
        self.supported.intersection(&self.initialized).copied().collect()
    }

    pub fn is_upward_attribute(ty: RequirementType) -> bool {
        ty.is_upward()
    }
}

/// Parses `"v"` or `"vl-vu"` into `(lower, upper)`, both equal to `v` for
/// the single-value form.
fn parse_bounds(value: &str) -> Option<(f64, f64)> {
    if let Some((lo, hi)) = value.split_once('-') {
        // A leading '-' (negative number) would also split here; negative
        // bounds are not meaningful for any supported attribute, so treat
        // that as malformed rather than silently accepting it.
        if lo.is_empty() {
            return None;
        }
        let lo: f64 = lo.trim().parse().ok()?;
        let hi: f64 = hi.trim().parse().ok()?;
        Some((lo, hi))
    } else {
        let v: f64 = value.parse().ok()?;
        Some((v, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_value_as_equal_bounds() {
        let mut req = RequirementSet::all_supported();
        assert!(req.parse_parameters("maxloss=0.05"));
        assert_eq!(req.get_limits(RequirementType::Loss), (0.05, 0.05));
        assert_eq!(req.get_limit(RequirementType::Loss), 0.05);
    }

    #[test]
    fn parses_range() {
        let mut req = RequirementSet::all_supported();
        req.parse_parameters("maxdelay=30-100");
        assert_eq!(req.get_limits(RequirementType::Delay), (30.0, 100.0));
    }

    #[test]
    fn unset_attribute_returns_sentinel() {
        let req = RequirementSet::all_supported();
        assert_eq!(req.get_limits(RequirementType::Bandwidth), (-1.0, -1.0));
        assert!(!req.contains(RequirementType::Bandwidth));
    }

    #[test]
    fn unrecognized_keys_are_ignored_but_others_still_parse() {
        let mut req = RequirementSet::all_supported();
        let any = req.parse_parameters("bogus=1,maxloss=0.1");
        assert!(any);
        assert!(req.contains(RequirementType::Loss));
        assert!(!req.contains(RequirementType::Bandwidth));
    }

    #[test]
    fn malformed_pairs_are_skipped_silently() {
        let mut req = RequirementSet::all_supported();
        let any = req.parse_parameters("maxloss,maxdelay=,nonsense=abc");
        assert!(!any);
    }

    #[test]
    fn duplicate_keys_last_value_wins() {
        let mut req = RequirementSet::all_supported();
        req.parse_parameters("maxloss=0.1,maxloss=0.2");
        assert_eq!(req.get_limits(RequirementType::Loss), (0.2, 0.2));
    }

    #[test]
    fn mincost_is_an_alias_for_cost() {
        let mut req = RequirementSet::all_supported();
        req.parse_parameters("mincost=50");
        assert!(req.contains(RequirementType::Cost));
        assert_eq!(req.get_limits(RequirementType::Cost), (50.0, 50.0));
    }

    #[test]
    fn nonce_key_is_not_a_requirement() {
        let mut req = RequirementSet::all_supported();
        let any = req.parse_parameters("nonce=false");
        assert!(!any);
        assert!(req.own_types().is_empty());
    }

    #[test]
    fn round_trip_through_format() {
        let mut req = RequirementSet::all_supported();
        req.parse_parameters("maxloss=0.05,maxdelay=100,minbw=500-2000");
        let formatted = req.format();

        let mut reparsed = RequirementSet::all_supported();
        reparsed.parse_parameters(&formatted);

        assert_eq!(
            req.get_limits(RequirementType::Loss),
            reparsed.get_limits(RequirementType::Loss)
        );
        assert_eq!(
            req.get_limits(RequirementType::Delay),
            reparsed.get_limits(RequirementType::Delay)
        );
        assert_eq!(
            req.get_limits(RequirementType::Bandwidth),
            reparsed.get_limits(RequirementType::Bandwidth)
        );
    }

    #[test]
    fn bandwidth_is_the_only_upward_attribute() {
        assert!(RequirementSet::is_upward_attribute(RequirementType::Bandwidth));
        assert!(!RequirementSet::is_upward_attribute(RequirementType::Cost));
        assert!(!RequirementSet::is_upward_attribute(RequirementType::Delay));
        assert!(!RequirementSet::is_upward_attribute(RequirementType::Loss));
    }
}
