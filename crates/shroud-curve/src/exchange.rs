//! ECDH shared-secret derivation.
//!
//! If a peer publishes `A = a*G` and we hold `b`, the shared point is
//! `b*A = a*b*G`. The secret is its affine x-coordinate, big-endian and
//! left-padded to the field width so both sides produce identical bytes.
//! The secret is handed straight to the symmetric cipher layer and never kept
//! here.

use std::{fmt, sync::Arc};

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    error::{CurveError, Result},
    params::CurveParams,
    point::CurvePoint,
};

/// Private scalar held as big-endian bytes. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateScalar {
    bytes: Vec<u8>,
}

impl PrivateScalar {
    /// Wrap big-endian scalar bytes. Any width is accepted; the scalar acts
    /// modulo the group order.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self { bytes: bytes.to_vec() }
    }

    /// Draw a scalar uniformly from `[1, n-1]`.
    pub fn generate<R: RngCore + CryptoRng>(params: &CurveParams, rng: &mut R) -> Self {
        let scalar = rng.gen_biguint_range(&BigUint::one(), params.order());
        let bytes = Zeroizing::new(scalar.to_bytes_be());
        let mut padded = vec![0u8; params.field_size().saturating_sub(bytes.len())];
        padded.extend_from_slice(&bytes);
        Self { bytes: padded }
    }

    /// Big-endian scalar bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.bytes)
    }
}

impl fmt::Debug for PrivateScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateScalar([REDACTED])")
    }
}

/// Symmetric key material: exactly `field_size` bytes. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl SharedSecret {
    /// Secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes (equals the curve's field size).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a derived secret.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret({} bytes)", self.bytes.len())
    }
}

/// Private scalar together with its public point.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: PrivateScalar,
    public: CurvePoint,
}

impl KeyPair {
    /// Generate a fresh key pair on the given curve.
    pub fn generate<R: RngCore + CryptoRng>(params: &CurveParams, rng: &mut R) -> Result<Self> {
        let private = PrivateScalar::generate(params, rng);
        let public = public_point(params, &private)?;
        Ok(Self { private, public })
    }

    /// Private half.
    pub fn private(&self) -> &PrivateScalar {
        &self.private
    }

    /// Public half `d*G`.
    pub fn public(&self) -> &CurvePoint {
        &self.public
    }
}

/// ECDH over one fixed curve.
#[derive(Debug, Clone)]
pub struct KeyExchange {
    params: Arc<CurveParams>,
}

impl KeyExchange {
    /// Create a key exchange for the given curve.
    pub fn new(params: Arc<CurveParams>) -> Self {
        Self { params }
    }

    /// Curve this exchange operates on.
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Generate a fresh key pair.
    pub fn generate_key_pair<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyPair> {
        KeyPair::generate(&self.params, rng)
    }

    /// Public point `d*G` for a private scalar `d`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScalar` if `d` is zero modulo the group order.
    pub fn public_key(&self, private: &PrivateScalar) -> Result<CurvePoint> {
        public_point(&self.params, private)
    }

    /// Derive the shared secret between a peer's public point and our scalar.
    ///
    /// `public` must come from [`crate::CurveCodec::decode`] (or another
    /// validating constructor); it is not checked again here.
    ///
    /// # Errors
    ///
    /// - `PointAtInfinity` if the product is the identity (zero scalar or a
    ///   multiple of the order). No all-zero key is ever returned.
    /// - `FieldElementOverflow` if the x-coordinate is wider than the field.
    ///   This means the parameters are corrupt; the key is not truncated.
    pub fn derive_shared_secret(
        &self,
        public: &CurvePoint,
        private: &PrivateScalar,
    ) -> Result<SharedSecret> {
        let scalar = private.to_biguint();
        let shared = public.multiply(&self.params, &scalar).ok_or(CurveError::PointAtInfinity)?;
        let bytes = self.params.pad_field_element(shared.x())?;
        Ok(SharedSecret { bytes })
    }
}

fn public_point(params: &CurveParams, private: &PrivateScalar) -> Result<CurvePoint> {
    let scalar = private.to_biguint();
    if (&scalar % params.order()).is_zero() {
        return Err(CurveError::InvalidScalar);
    }
    params.generator().multiply(params, &scalar).ok_or(CurveError::InvalidScalar)
}
