//! Contracts for the external collaborators named in §6: FIB, PIT, Face I/O,
//! the Strategy-Choice table, and the measurement accessor. This crate
//! depends on these traits only — concrete FIB/PIT/Face implementations live
//! outside it.

use std::time::Instant;

use rust_udcn_common::types::FaceId;

use crate::measurement::PrefixMeasurement;

/// The 32-bit type-id the core uses when tagging its per-prefix measurement
/// record in the measurement accessor's heterogeneous store.
pub const MEASUREMENT_TYPE_ID: u32 = 1012;

/// A logical outbound link, identified and capable of emitting an Interest.
pub trait Face {
    fn id(&self) -> FaceId;

    /// Sends `interest_name` out this face. `fresh_nonce` requests that the
    /// implementation substitute a nonce distinct from the Interest's
    /// current one (used by probing and the broadcast strategy) rather than
    /// forwarding it unchanged.
    fn send_interest(&self, interest_name: &str, fresh_nonce: bool);
}

/// One ranked FIB next-hop: a face handle plus its configured cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHop {
    pub face: FaceId,
    pub cost: u32,
}

/// The subset of PIT-entry behavior the strategies need. A `PitEntry` is
/// borrowed for the duration of a single callback and must not be retained
/// across callbacks (§5).
pub trait PitEntry {
    /// `true` iff `face` may still be used to forward this Interest (not
    /// already an unexpired out-record, among other forwarder-side checks).
    fn can_forward_to(&self, face: FaceId) -> bool;

    /// `true` iff any out-record on this entry has not yet expired — used to
    /// detect consumer retransmissions.
    fn has_unexpired_out_records(&self) -> bool;

    /// `true` iff this entry has at least one in-record (an incoming Interest
    /// still making it eligible for natural-RTT measurement on satisfy).
    fn has_in_records(&self) -> bool;

    /// The `lastRenewed` timestamp of the out-record on `face`, if one
    /// exists — used to compute RTT on Data arrival.
    fn out_record_last_renewed(&self, face: FaceId) -> Option<Instant>;
}

/// The Strategy-Choice table: binds name prefixes to a strategy and its
/// parameter string.
pub trait StrategyChoiceSource {
    /// Returns the parameter string bound to the longest prefix match for
    /// `name`, or an empty string if none is configured.
    fn find_effective_parameters(&self, name: &str) -> String;
}

/// The measurement accessor: a keyed scratch store, pinned along the name
/// tree, the core uses to hold one record per prefix, discriminated by
/// [`MEASUREMENT_TYPE_ID`]. Per §6, lookup is by longest-prefix match along
/// `name` — a record inserted at `/a/b` is found by a query for `/a/b/c/d`
/// — so many Interest names under one FIB prefix share the same record.
/// Implementations own that tree walk; this crate only reads and writes
/// through the trait.
pub trait MeasurementAccessor<M> {
    /// Returns the record bound to the longest prefix of `name` that has
    /// one, or `None` if no ancestor of `name` (including `name` itself)
    /// has been tagged with `type_id`.
    fn find_prefix_measurement(&self, name: &str, type_id: u32) -> Option<M>;

    /// Inserts or overwrites the record tagged `type_id` at exactly `name`.
    fn add_prefix_measurement(&mut self, name: &str, type_id: u32, measurement: M);
}

/// The forwarder: the strategy's non-owning back-reference for
/// configuration and collaborator lookups (§9 — construction order is
/// forwarder before strategy).
pub trait Forwarder {
    type StrategyChoice: StrategyChoiceSource;
    type Measurements: MeasurementAccessor<PrefixMeasurement>;

    fn strategy_choice(&self) -> &Self::StrategyChoice;

    /// The measurement accessor (§6's `getMeasurements()`), read-only.
    fn measurements(&self) -> &Self::Measurements;

    /// The measurement accessor, for inserting or updating a prefix's
    /// record.
    fn measurements_mut(&mut self) -> &mut Self::Measurements;

    /// Looks up a live face by id, if it still exists.
    fn face(&self, id: FaceId) -> Option<&dyn Face>;

    /// Rejects (drops) a pending Interest that accumulated no usable
    /// out-records, e.g. after a broadcast fan-out finds nothing forwardable.
    fn reject_pending_interest(&mut self, pit_entry: &dyn PitEntry);
}

/// A minimal, in-memory [`MeasurementAccessor`] usable by tests (and by a
/// simple embedding daemon that has no real name-tree scratch store of its
/// own): records are inserted at an exact name and found by walking from
/// the query name up through its ancestor prefixes to `/`, returning the
/// first (longest) match — the same longest-prefix-match semantics §6
/// describes for the real accessor.
#[derive(Debug, Default)]
pub struct InMemoryMeasurements<M> {
    by_name: std::collections::HashMap<(String, u32), M>,
}

impl<M> InMemoryMeasurements<M> {
    pub fn new() -> Self {
        Self {
            by_name: std::collections::HashMap::new(),
        }
    }
}

impl<M: Clone> MeasurementAccessor<M> for InMemoryMeasurements<M> {
    fn find_prefix_measurement(&self, name: &str, type_id: u32) -> Option<M> {
        for prefix in ancestor_prefixes(name) {
            if let Some(m) = self.by_name.get(&(prefix, type_id)) {
                return Some(m.clone());
            }
        }
        None
    }

    fn add_prefix_measurement(&mut self, name: &str, type_id: u32, measurement: M) {
        self.by_name.insert((name.to_string(), type_id), measurement);
    }
}

/// `name`, then each ancestor prefix down to `/`, longest first.
fn ancestor_prefixes(name: &str) -> Vec<String> {
    let components: Vec<&str> = name.split('/').filter(|c| !c.is_empty()).collect();
    let mut prefixes = Vec::with_capacity(components.len() + 1);
    for i in (0..=components.len()).rev() {
        if i == 0 {
            prefixes.push("/".to_string());
        } else {
            prefixes.push(format!("/{}", components[..i].join("/")));
        }
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_match() {
        let mut m = InMemoryMeasurements::new();
        m.add_prefix_measurement("/a/b", 1, 42u32);
        assert_eq!(m.find_prefix_measurement("/a/b", 1), Some(42));
    }

    #[test]
    fn finds_longest_ancestor_prefix() {
        let mut m = InMemoryMeasurements::new();
        m.add_prefix_measurement("/a", 1, 1u32);
        m.add_prefix_measurement("/a/b", 1, 2u32);
        // /a/b/c/d has no record of its own; longest registered ancestor is /a/b.
        assert_eq!(m.find_prefix_measurement("/a/b/c/d", 1), Some(2));
        // /a/x has no /a/x record; its only registered ancestor is /a.
        assert_eq!(m.find_prefix_measurement("/a/x", 1), Some(1));
    }

    #[test]
    fn distinct_names_under_one_prefix_share_the_prefix_record() {
        let mut m = InMemoryMeasurements::new();
        m.add_prefix_measurement("/news", 1, "shared".to_string());
        assert_eq!(
            m.find_prefix_measurement("/news/politics/2026", 1),
            Some("shared".to_string())
        );
        assert_eq!(
            m.find_prefix_measurement("/news/sports/2026", 1),
            Some("shared".to_string())
        );
    }

    #[test]
    fn no_match_returns_none() {
        let m: InMemoryMeasurements<u32> = InMemoryMeasurements::new();
        assert_eq!(m.find_prefix_measurement("/unregistered", 1), None);
    }

    #[test]
    fn type_id_discriminates_otherwise_identical_names() {
        let mut m = InMemoryMeasurements::new();
        m.add_prefix_measurement("/a", 1, "one".to_string());
        m.add_prefix_measurement("/a", 2, "two".to_string());
        assert_eq!(m.find_prefix_measurement("/a", 1), Some("one".to_string()));
        assert_eq!(m.find_prefix_measurement("/a", 2), Some("two".to_string()));
    }
}
