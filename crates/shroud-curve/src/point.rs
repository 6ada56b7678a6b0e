//! Affine curve points and scalar multiplication.
//!
//! A [`CurvePoint`] is always a finite point on its curve: constructors
//! validate the curve equation, and operations that can land on the point at
//! infinity return `None`/`PointAtInfinity` instead of a sentinel value.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{
    error::{CurveError, Result},
    field::Field,
    params::CurveParams,
};

/// Finite point `(x, y)` satisfying the curve equation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurvePoint {
    x: BigUint,
    y: BigUint,
}

impl CurvePoint {
    /// Create a point from affine coordinates.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateOutOfRange` if either coordinate is not reduced
    /// modulo `p`, and `NotOnCurve` if the curve equation does not hold.
    pub fn new(params: &CurveParams, x: BigUint, y: BigUint) -> Result<Self> {
        if &x >= params.modulus() || &y >= params.modulus() {
            return Err(CurveError::CoordinateOutOfRange);
        }
        if !params.contains(&x, &y) {
            return Err(CurveError::NotOnCurve);
        }
        Ok(Self { x, y })
    }

    /// Caller guarantees the coordinates are on the curve.
    pub(crate) fn from_trusted(x: BigUint, y: BigUint) -> Self {
        Self { x, y }
    }

    /// Affine x-coordinate.
    pub fn x(&self) -> &BigUint {
        &self.x
    }

    /// Affine y-coordinate.
    pub fn y(&self) -> &BigUint {
        &self.y
    }

    /// Compute `scalar * self`.
    ///
    /// Returns `None` when the result is the point at infinity, which happens
    /// exactly when `scalar` is a multiple of the point's order.
    pub fn multiply(&self, params: &CurveParams, scalar: &BigUint) -> Option<Self> {
        let field = params.field();
        let mut acc = Jacobian::infinity();

        for bit in (0..scalar.bits()).rev() {
            acc = acc.double(&field);
            if scalar.bit(bit) {
                acc = acc.add_affine(&field, self);
            }
        }

        acc.to_affine(&field)
    }
}

/// Jacobian coordinates `(X, Y, Z)` for `(X/Z^2, Y/Z^3)`; `Z = 0` is infinity.
///
/// Keeps the double-and-add loop free of field inversions.
#[derive(Debug, Clone)]
struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl Jacobian {
    fn infinity() -> Self {
        Self { x: BigUint::one(), y: BigUint::one(), z: BigUint::zero() }
    }

    fn from_affine(point: &CurvePoint) -> Self {
        Self { x: point.x.clone(), y: point.y.clone(), z: BigUint::one() }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// dbl-2001-b, specialised for `a = -3`.
    fn double(&self, f: &Field<'_>) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Self::infinity();
        }

        let delta = f.square(&self.z);
        let gamma = f.square(&self.y);
        let beta = f.mul(&self.x, &gamma);
        let alpha = f.scale(&f.mul(&f.sub(&self.x, &delta), &f.add(&self.x, &delta)), 3);

        let x3 = f.sub(&f.square(&alpha), &f.scale(&beta, 8));
        let z3 = f.sub(&f.sub(&f.square(&f.add(&self.y, &self.z)), &gamma), &delta);
        let y3 = f.sub(
            &f.mul(&alpha, &f.sub(&f.scale(&beta, 4), &x3)),
            &f.scale(&f.square(&gamma), 8),
        );

        Self { x: x3, y: y3, z: z3 }
    }

    /// madd-2007-bl: add an affine point (`Z2 = 1`).
    fn add_affine(&self, f: &Field<'_>, other: &CurvePoint) -> Self {
        if self.is_infinity() {
            return Self::from_affine(other);
        }

        let z1z1 = f.square(&self.z);
        let u2 = f.mul(&other.x, &z1z1);
        let s2 = f.mul(&f.mul(&other.y, &self.z), &z1z1);
        let h = f.sub(&u2, &self.x);
        let r = f.scale(&f.sub(&s2, &self.y), 2);

        if h.is_zero() {
            // Same x: either the same point or its negation
            return if r.is_zero() { self.double(f) } else { Self::infinity() };
        }

        let hh = f.square(&h);
        let i = f.scale(&hh, 4);
        let j = f.mul(&h, &i);
        let v = f.mul(&self.x, &i);

        let x3 = f.sub(&f.sub(&f.square(&r), &j), &f.scale(&v, 2));
        let y3 = f.sub(&f.mul(&r, &f.sub(&v, &x3)), &f.scale(&f.mul(&self.y, &j), 2));
        let z3 = f.sub(&f.sub(&f.square(&f.add(&self.z, &h)), &z1z1), &hh);

        Self { x: x3, y: y3, z: z3 }
    }

    fn to_affine(&self, f: &Field<'_>) -> Option<CurvePoint> {
        let z_inv = f.invert(&self.z)?;
        let z_inv2 = f.square(&z_inv);
        let x = f.mul(&self.x, &z_inv2);
        let y = f.mul(&f.mul(&self.y, &z_inv2), &z_inv);
        Some(CurvePoint { x, y })
    }
}
