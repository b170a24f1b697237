//! Error types for the forwarding strategy core.

use thiserror::Error;

/// Fatal errors raised by the strategy core.
///
/// Most anomalies the core encounters (a malformed parameter string, no
/// eligible face, Data with no matching PIT out-record) are *not* modeled as
/// errors — they are logged and handled in place, per the error handling
/// policy: estimator invariant violations are fatal, parsing and selection
/// anomalies are not.
#[derive(Error, Debug)]
pub enum Error {
    /// The loss estimator's window size was not strictly greater than its
    /// interest lifetime at construction time.
    #[error("invalid loss estimator window: window {window_ms}ms must be greater than interest lifetime {lifetime_ms}ms")]
    InvalidWindow { window_ms: u64, lifetime_ms: u64 },

    /// `addSent` was called twice for the same name without an intervening
    /// `addSatisfied` or timeout. Duplicate names are a programming error in
    /// the caller, which owns name uniqueness.
    #[error("duplicate sent interest for name: {0}")]
    DuplicateSend(String),

    /// Other errors, e.g. surfaced from a collaborator.
    #[error("other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
