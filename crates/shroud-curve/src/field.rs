//! Arithmetic in the prime field `GF(p)`.
//!
//! All operands are expected to be already reduced modulo `p`.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Borrowed view of a prime modulus with modular operations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field<'a> {
    p: &'a BigUint,
}

impl<'a> Field<'a> {
    pub(crate) fn new(p: &'a BigUint) -> Self {
        Self { p }
    }

    pub(crate) fn reduce(&self, a: &BigUint) -> BigUint {
        a % self.p
    }

    pub(crate) fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % self.p
    }

    pub(crate) fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a >= b { a - b } else { self.p - (b - a) }
    }

    pub(crate) fn neg(&self, a: &BigUint) -> BigUint {
        if a.is_zero() { BigUint::zero() } else { self.p - a }
    }

    pub(crate) fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % self.p
    }

    pub(crate) fn square(&self, a: &BigUint) -> BigUint {
        self.mul(a, a)
    }

    /// Small-constant multiple, used by the doubling formulas.
    pub(crate) fn scale(&self, a: &BigUint, k: u32) -> BigUint {
        (a * k) % self.p
    }

    /// Multiplicative inverse via Fermat's little theorem. `None` for zero.
    pub(crate) fn invert(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        let exponent = self.p - 2u32;
        Some(a.modpow(&exponent, self.p))
    }

    /// `x^3 - 3x + b`, the right-hand side of the curve equation.
    pub(crate) fn curve_rhs(&self, x: &BigUint, b: &BigUint) -> BigUint {
        let x3 = self.mul(&self.square(x), x);
        let three_x = self.scale(x, 3);
        self.add(&self.sub(&x3, &three_x), b)
    }

    /// Square root modulo `p`, or `None` when `a` is a quadratic non-residue.
    ///
    /// Uses the direct exponentiation `a^((p+1)/4)` when `p = 3 (mod 4)` and
    /// Tonelli-Shanks otherwise. The returned root is always checked by
    /// squaring it.
    pub(crate) fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return Some(BigUint::zero());
        }

        let root = if self.p.bit(0) && self.p.bit(1) {
            let exponent = (self.p + 1u32) >> 2u32;
            a.modpow(&exponent, self.p)
        } else {
            self.tonelli_shanks(&a)?
        };

        (self.square(&root) == a).then_some(root)
    }

    fn tonelli_shanks(&self, a: &BigUint) -> Option<BigUint> {
        let one = BigUint::one();
        let p_minus_one = self.p - 1u32;
        let half = &p_minus_one >> 1u32;

        // Euler's criterion
        if a.modpow(&half, self.p) != one {
            return None;
        }

        // p - 1 = q * 2^s with q odd
        let s = p_minus_one.trailing_zeros()?;
        let q = &p_minus_one >> s;

        let mut z = BigUint::from(2u32);
        while z.modpow(&half, self.p) != p_minus_one {
            z += 1u32;
        }

        let mut m = s;
        let mut c = z.modpow(&q, self.p);
        let mut t = a.modpow(&q, self.p);
        let mut r = a.modpow(&((&q + 1u32) >> 1u32), self.p);

        while t != one {
            let mut i = 0u64;
            let mut t_pow = t.clone();
            while t_pow != one {
                t_pow = self.square(&t_pow);
                i += 1;
                if i == m {
                    return None;
                }
            }

            let b = c.modpow(&(BigUint::one() << (m - i - 1)), self.p);
            m = i;
            c = self.square(&b);
            t = self.mul(&t, &c);
            r = self.mul(&r, &b);
        }

        Some(r)
    }
}
