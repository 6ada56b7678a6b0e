//! X9.62 point encodings.
//!
//! # Wire Format
//!
//! ```text
//! compressed:    [2 | (y & 1)] [x: field_size bytes, big-endian]
//! uncompressed:  [4]           [x: field_size bytes] [y: field_size bytes]
//! ```
//!
//! Clients emit the compressed form. The uncompressed form is still accepted
//! on decode for older peers.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::{
    error::{CurveError, Result},
    params::CurveParams,
    point::CurvePoint,
};

/// Tag of a compressed encoding with even `y`; odd `y` sets the low bit.
pub const TAG_COMPRESSED: u8 = 0x02;

/// Tag of an uncompressed encoding.
pub const TAG_UNCOMPRESSED: u8 = 0x04;

/// Compressed point encoding, exactly `field_size + 1` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompressedPoint(Vec<u8>);

impl CompressedPoint {
    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CompressedPoint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encoder/decoder for points on one fixed curve.
#[derive(Debug, Clone)]
pub struct CurveCodec {
    params: Arc<CurveParams>,
}

impl CurveCodec {
    /// Create a codec for the given curve.
    pub fn new(params: Arc<CurveParams>) -> Self {
        Self { params }
    }

    /// Curve this codec encodes for.
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Compressed encoding of `point`.
    ///
    /// # Errors
    ///
    /// Returns `FieldElementOverflow` if x is wider than the field. Points
    /// produced by this crate always fit, so this signals mismatched
    /// parameters rather than bad input.
    pub fn encode(&self, point: &CurvePoint) -> Result<CompressedPoint> {
        let mut out = Vec::with_capacity(self.params.compressed_len());
        out.push(TAG_COMPRESSED | u8::from(point.y().bit(0)));
        out.extend_from_slice(&self.params.pad_field_element(point.x())?);
        Ok(CompressedPoint(out))
    }

    /// Uncompressed encoding `04 || x || y`.
    ///
    /// # Errors
    ///
    /// Returns `FieldElementOverflow` under the same conditions as
    /// [`Self::encode`].
    pub fn encode_uncompressed(&self, point: &CurvePoint) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.params.uncompressed_len());
        out.push(TAG_UNCOMPRESSED);
        out.extend_from_slice(&self.params.pad_field_element(point.x())?);
        out.extend_from_slice(&self.params.pad_field_element(point.y())?);
        Ok(out)
    }

    /// Decode a compressed or uncompressed encoding into a validated point.
    ///
    /// The uncompressed layout is tried first; anything it does not recognize
    /// is parsed as a compressed point. A compressed x whose `x^3 - 3x + b`
    /// has no square root mod p is rejected: such bytes do not describe a
    /// curve point.
    ///
    /// # Errors
    ///
    /// Every error returned here satisfies [`CurveError::is_rejection`].
    pub fn decode(&self, bytes: &[u8]) -> Result<CurvePoint> {
        if let Some(point) = self.decode_uncompressed(bytes)? {
            return Ok(point);
        }
        self.decode_compressed(bytes)
    }

    /// `Ok(None)` when the input is not in uncompressed layout at all.
    fn decode_uncompressed(&self, bytes: &[u8]) -> Result<Option<CurvePoint>> {
        let size = self.params.field_size();
        if bytes.len() != self.params.uncompressed_len() || bytes[0] != TAG_UNCOMPRESSED {
            return Ok(None);
        }

        let x = BigUint::from_bytes_be(&bytes[1..=size]);
        let y = BigUint::from_bytes_be(&bytes[1 + size..]);
        CurvePoint::new(&self.params, x, y).map(Some)
    }

    fn decode_compressed(&self, bytes: &[u8]) -> Result<CurvePoint> {
        let expected = self.params.compressed_len();
        if bytes.len() != expected {
            return Err(CurveError::InvalidLength { expected, actual: bytes.len() });
        }

        let tag = bytes[0];
        if tag & !1 != TAG_COMPRESSED {
            return Err(CurveError::UnknownTag(tag));
        }

        let x = BigUint::from_bytes_be(&bytes[1..]);
        if &x >= self.params.modulus() {
            return Err(CurveError::CoordinateOutOfRange);
        }

        let field = self.params.field();
        let y_squared = field.curve_rhs(&x, self.params.b());
        let root = field.sqrt(&y_squared).ok_or(CurveError::NotOnCurve)?;

        let want_odd = tag & 1 == 1;
        // y = 0 is its own negation, so only the even tag can encode it
        if root.is_zero() && want_odd {
            return Err(CurveError::NotOnCurve);
        }
        let y = if root.bit(0) == want_odd { root } else { field.neg(&root) };

        Ok(CurvePoint::from_trusted(x, y))
    }
}
