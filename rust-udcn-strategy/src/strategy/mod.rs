//! The `Strategy` capability set (§9) and its three implementations (C8-C10).

pub mod broadcast;
pub mod lowest_cost;
pub mod madm;

use rust_udcn_common::types::FaceId;

use crate::collaborators::{Forwarder, NextHop, PitEntry};

/// One incoming Interest, as seen by a strategy callback.
#[derive(Debug, Clone)]
pub struct IncomingInterest {
    pub name: String,
    pub nonce: u32,
}

/// One returning Data, as seen by a strategy callback.
#[derive(Debug, Clone)]
pub struct IncomingData {
    pub name: String,
    pub content_size: u64,
}

/// Dispatch surface every forwarding strategy implements: react to an
/// incoming Interest by choosing (and probing) next-hops, and react to a
/// satisfying Data by updating estimators. Concrete strategies are plain
/// values holding their own state (`faceInfoTable`, and for MADM also
/// `costMap`); polymorphism is via this trait rather than an enum, matching
/// the capability-set framing in §9.
pub trait Strategy<F: Forwarder> {
    /// `fib_prefix` is the name of the FIB entry that produced `nexthops` —
    /// the key the measurement accessor pins a per-prefix record under
    /// (§3, §6), distinct from `interest.name` (which can be longer, e.g.
    /// carrying a segment number the FIB entry's prefix does not). Many
    /// differently-named Interests matching the same FIB entry share one
    /// `fib_prefix` and therefore one measurement record.
    fn after_receive_interest(
        &mut self,
        forwarder: &mut F,
        in_face: FaceId,
        interest: &IncomingInterest,
        fib_prefix: &str,
        nexthops: &[NextHop],
        pit_entry: &dyn PitEntry,
    );

    fn before_satisfy_interest(
        &mut self,
        pit_entry: &dyn PitEntry,
        in_face: FaceId,
        data: &IncomingData,
    );
}
