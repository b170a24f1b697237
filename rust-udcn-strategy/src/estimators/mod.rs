//! Per-face attribute estimators (C1-C5).

pub mod bandwidth;
pub mod cost;
pub mod interface;
pub mod loss;
pub mod rtt;

pub use bandwidth::BandwidthEstimator;
pub use cost::CostEstimator;
pub use interface::InterfaceEstimation;
pub use loss::LossEstimator;
pub use rtt::RttEstimator;
