//! Forward on every eligible next-hop, freshening the nonce (C10).

use rand::Rng;
use rust_udcn_common::types::FaceId;

use crate::collaborators::{Forwarder, NextHop, PitEntry};
use crate::strategy::{IncomingData, IncomingInterest, Strategy};

const STRATEGY_NAME: &str = "ndn:/localhost/nfd/strategy/broadcast-newnonce/%FD%01";

/// Broadcasts an Interest to every forwardable next-hop, by default
/// freshening the nonce on each outbound copy so the variant can be used
/// for multicast without nonce-collision loop-detection false positives.
#[derive(Debug, Default)]
pub struct BroadcastNewNonceStrategy;

impl BroadcastNewNonceStrategy {
    pub fn new() -> Self {
        Self
    }

    pub fn strategy_name() -> &'static str {
        STRATEGY_NAME
    }

    /// Parses just the `nonce` key out of a parameter string — it is not a
    /// [`crate::requirements::RequirementType`], so `RequirementSet` never
    /// sees it.
    fn use_fresh_nonce(parameter_string: &str) -> bool {
        for pair in parameter_string.split(',') {
            let pair = pair.trim();
            if let Some((key, value)) = pair.split_once('=') {
                if key.trim() == "nonce" {
                    return value.trim() != "false";
                }
            }
        }
        true
    }
}

impl<F: Forwarder> Strategy<F> for BroadcastNewNonceStrategy {
    fn after_receive_interest(
        &mut self,
        forwarder: &mut F,
        _in_face: FaceId,
        interest: &IncomingInterest,
        _fib_prefix: &str,
        nexthops: &[NextHop],
        pit_entry: &dyn PitEntry,
    ) {
        let params = forwarder
            .strategy_choice()
            .find_effective_parameters(&interest.name);
        let use_nonce = Self::use_fresh_nonce(&params);

        for hop in nexthops {
            if !pit_entry.can_forward_to(hop.face) {
                continue;
            }
            log::trace!("new nonce? {use_nonce}");
            if let Some(face) = forwarder.face(hop.face) {
                face.send_interest(&interest.name, use_nonce);
            }
        }

        if !pit_entry.has_unexpired_out_records() {
            forwarder.reject_pending_interest(pit_entry);
        }
    }

    fn before_satisfy_interest(
        &mut self,
        _pit_entry: &dyn PitEntry,
        _in_face: FaceId,
        _data: &IncomingData,
    ) {
        // Broadcast/NewNonce has no per-face estimators of its own (§4.10);
        // nothing to update on Data arrival.
    }
}

/// Generates a nonce guaranteed distinct from `exclude`, for callers that
/// need to produce a fresh value rather than delegate to the Face layer.
pub fn fresh_nonce(exclude: u32) -> u32 {
    let mut rng = rand::rng();
    loop {
        let candidate: u32 = rng.random();
        if candidate != exclude {
            return candidate;
        }
    }
}
