//! Curve parameters.
//!
//! Every curve here has the form `y^2 = x^3 - 3x + b (mod p)`. Parameters are
//! built once at startup and shared (usually behind an `Arc`) by the codec and
//! the key exchange, so alternate curves can be swapped in for tests.

use hex_literal::hex;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{
    error::{CurveError, Result},
    field::Field,
    point::CurvePoint,
};

/// Immutable description of a prime-order curve with `a = -3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveParams {
    name: &'static str,
    p: BigUint,
    b: BigUint,
    n: BigUint,
    gx: BigUint,
    gy: BigUint,
    field_size: usize,
}

impl CurveParams {
    /// NIST P-256 (secp256r1). This is the curve deployed clients use.
    pub fn p256() -> Self {
        Self::from_trusted(
            "P-256",
            &hex!("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"),
            &hex!("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"),
            &hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"),
            &hex!("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
            &hex!("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
        )
    }

    /// NIST P-384 (secp384r1).
    pub fn p384() -> Self {
        Self::from_trusted(
            "P-384",
            &hex!(
                "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe"
                "ffffffff0000000000000000ffffffff"
            ),
            &hex!(
                "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875a"
                "c656398d8a2ed19d2a85c8edd3ec2aef"
            ),
            &hex!(
                "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf"
                "581a0db248b0a77aecec196accc52973"
            ),
            &hex!(
                "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a38"
                "5502f25dbf55296c3a545e3872760ab7"
            ),
            &hex!(
                "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c0"
                "0a60b1ce1d7e819d7a431d7c90ea0e5f"
            ),
        )
    }

    /// Build parameters for a custom curve.
    ///
    /// The prime and order are taken on trust (primality is not tested), but
    /// the generator must satisfy the curve equation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if `p` is not an odd number above 3, if `b`
    /// or the generator coordinates are not field elements, or if the
    /// generator is off the curve.
    pub fn new(
        name: &'static str,
        p: BigUint,
        b: BigUint,
        n: BigUint,
        gx: BigUint,
        gy: BigUint,
    ) -> Result<Self> {
        if p <= BigUint::from(3u32) || !p.bit(0) {
            return Err(CurveError::InvalidParameters("modulus must be an odd prime above 3"));
        }
        if b >= p || gx >= p || gy >= p {
            return Err(CurveError::InvalidParameters("coefficients must be reduced mod p"));
        }
        if n <= BigUint::one() {
            return Err(CurveError::InvalidParameters("group order must exceed 1"));
        }

        let field_size = Self::byte_len(&p);
        let params = Self { name, p, b, n, gx, gy, field_size };
        if !params.contains(&params.gx, &params.gy) {
            return Err(CurveError::InvalidParameters("generator is not on the curve"));
        }
        Ok(params)
    }

    fn from_trusted(
        name: &'static str,
        p: &[u8],
        b: &[u8],
        n: &[u8],
        gx: &[u8],
        gy: &[u8],
    ) -> Self {
        let p = BigUint::from_bytes_be(p);
        Self {
            name,
            field_size: Self::byte_len(&p),
            p,
            b: BigUint::from_bytes_be(b),
            n: BigUint::from_bytes_be(n),
            gx: BigUint::from_bytes_be(gx),
            gy: BigUint::from_bytes_be(gy),
        }
    }

    fn byte_len(value: &BigUint) -> usize {
        value.bits().div_ceil(8) as usize
    }

    /// Human-readable curve name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field prime `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Curve coefficient `b`.
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Order `n` of the generator.
    pub fn order(&self) -> &BigUint {
        &self.n
    }

    /// Bytes needed for one field element (32 for P-256).
    pub fn field_size(&self) -> usize {
        self.field_size
    }

    /// Length of a compressed encoding: `field_size + 1`.
    pub fn compressed_len(&self) -> usize {
        self.field_size + 1
    }

    /// Length of an uncompressed encoding: `2 * field_size + 1`.
    pub fn uncompressed_len(&self) -> usize {
        2 * self.field_size + 1
    }

    /// Base point `G`.
    pub fn generator(&self) -> CurvePoint {
        CurvePoint::from_trusted(self.gx.clone(), self.gy.clone())
    }

    /// Whether `(x, y)` are reduced field elements satisfying the curve
    /// equation.
    pub fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        if x >= &self.p || y >= &self.p {
            return false;
        }
        let field = self.field();
        field.square(y) == field.curve_rhs(x, &self.b)
    }

    pub(crate) fn field(&self) -> Field<'_> {
        Field::new(&self.p)
    }

    /// Left-pad a big-endian field element to exactly `field_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `FieldElementOverflow` if the value is wider than the field.
    pub fn pad_field_element(&self, value: &BigUint) -> Result<Vec<u8>> {
        let raw = if value.is_zero() { Vec::new() } else { value.to_bytes_be() };
        if raw.len() > self.field_size {
            return Err(CurveError::FieldElementOverflow {
                actual: raw.len(),
                max: self.field_size,
            });
        }

        let mut padded = vec![0u8; self.field_size - raw.len()];
        padded.extend_from_slice(&raw);
        Ok(padded)
    }
}

impl Default for CurveParams {
    fn default() -> Self {
        Self::p256()
    }
}
