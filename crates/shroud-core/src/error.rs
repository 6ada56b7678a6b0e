//! Dispatch error types.

use thiserror::Error;

use crate::RoutingPolicy;

/// Errors rejecting a configuration or a submission.
///
/// Sink failures are deliberately absent: delivery is fire-and-forget and
/// never reported back to the submitting client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A threshold of zero can never be reached by appending.
    #[error("batch threshold must be at least 1 (policy: {policy:?})")]
    ZeroThreshold {
        /// Policy with the bad override, `None` for the default threshold
        policy: Option<RoutingPolicy>,
    },

    /// Maximum ciphertext length configured as zero.
    #[error("maximum ciphertext length must be at least 1")]
    ZeroLengthLimit,

    /// Ciphertext exceeds the configured bound.
    #[error("ciphertext of {len} bytes exceeds limit of {max}")]
    CiphertextTooLarge {
        /// Submitted length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Zero-length ciphertext.
    #[error("empty ciphertext")]
    EmptyCiphertext,

    /// Routing policy text could not be parsed.
    #[error("invalid routing policy {0:?}, expected METRIC:DAY")]
    InvalidPolicy(String),
}
