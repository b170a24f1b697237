//! Multi-attribute forwarding strategy core for μDCN.
//!
//! Implements the path-selection engine an NDN forwarder delegates to once
//! it has a FIB next-hop list and a PIT entry in hand: per-face estimators
//! (RTT, loss, bandwidth, traffic-driven cost), a per-prefix requirement
//! store, and three strategy algorithms (lowest-cost with hysteresis, MADM
//! weighted-sum, broadcast with nonce freshening). The packet codec, Face
//! I/O, FIB/PIT storage, the Strategy-Choice table, and the measurement
//! accessor are external collaborators, named as traits in [`collaborators`].

pub mod collaborators;
pub mod config;
pub mod error;
pub mod estimators;
pub mod measurement;
pub mod probing;
pub mod requirements;
pub mod strategy;

pub use config::StrategyConfig;
pub use error::{Error, Result};
