//! Curve error types.

use thiserror::Error;

/// Result alias for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;

/// Errors from point decoding, encoding and key derivation.
///
/// Decoding failures come in several flavours for diagnostics, but callers
/// must treat all of them the same way: reject the message. Use
/// [`CurveError::is_rejection`] rather than matching on individual variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// Encoded point has the wrong number of bytes.
    #[error("invalid point encoding length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Length required by the encoding
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// Leading tag byte is not a recognized point format.
    #[error("unrecognized point encoding tag: {0:#04x}")]
    UnknownTag(u8),

    /// A coordinate is not reduced modulo the field prime.
    #[error("coordinate is not a field element")]
    CoordinateOutOfRange,

    /// Coordinates do not satisfy the curve equation, or no square root
    /// exists for the recovered `y^2`.
    #[error("point is not on the curve")]
    NotOnCurve,

    /// A field element does not fit in the curve's field width.
    ///
    /// Only reachable with corrupted parameters; never caused by peer input.
    #[error("field element needs {actual} bytes but the field is {max} bytes wide")]
    FieldElementOverflow {
        /// Minimal big-endian length of the element
        actual: usize,
        /// Field element size of the curve
        max: usize,
    },

    /// Result of a scalar multiplication is the point at infinity.
    #[error("scalar multiplication produced the point at infinity")]
    PointAtInfinity,

    /// Private scalar is zero or a multiple of the group order.
    #[error("private scalar is not in [1, n-1]")]
    InvalidScalar,

    /// Curve parameters failed validation.
    #[error("invalid curve parameters: {0}")]
    InvalidParameters(&'static str),
}

impl CurveError {
    /// True for errors caused by untrusted input that must be rejected.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidLength { .. }
                | Self::UnknownTag(_)
                | Self::CoordinateOutOfRange
                | Self::NotOnCurve
        )
    }
}
