//! Double-double arithmetic.
//!
//! A [`Dd`] is an unevaluated sum `hi + lo` with `|lo| <= ulp(hi) / 2`, giving
//! roughly 106 bits of precision from plain `f64` operations. Addition and
//! multiplication follow Joldes, Muller and Popescu, "Tight and rigorous error
//! bounds for basic building blocks of double-word arithmetic" (2017):
//! `AccurateDWPlusDW` (relative error below `3u^2`) and `DWTimesDW1` (below
//! `7u^2`), with `u = 2^-53`. Both are below `2^-100`, the unit roundoff the
//! triage error analysis assumes.
//!
//! The paper's Fast2Sum steps use [`two_sum`], which returns the same pair
//! whenever Fast2Sum's ordering precondition holds and stays exact after
//! cancellation or underflow.

use crate::expansion::{two_product, two_sum};
use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dd {
    pub hi: f64,
    pub lo: f64,
}

impl Dd {
    pub const ZERO: Dd = Dd { hi: 0.0, lo: 0.0 };

    #[inline(always)]
    pub const fn from_f64(value: f64) -> Self {
        Dd { hi: value, lo: 0.0 }
    }

    /// Nearest `f64` to the represented value.
    #[inline(always)]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    #[inline(always)]
    pub fn abs(self) -> Self {
        if self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0) {
            -self
        } else {
            self
        }
    }
}

impl From<f64> for Dd {
    fn from(value: f64) -> Self {
        Dd::from_f64(value)
    }
}

impl Neg for Dd {
    type Output = Dd;

    #[inline(always)]
    fn neg(self) -> Dd {
        Dd {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Add for Dd {
    type Output = Dd;

    #[inline(always)]
    fn add(self, rhs: Dd) -> Dd {
        let (sh, sl) = two_sum(self.hi, rhs.hi);
        let (th, tl) = two_sum(self.lo, rhs.lo);
        let c = sl + th;
        let (vh, vl) = two_sum(sh, c);
        let w = tl + vl;
        let (hi, lo) = two_sum(vh, w);
        Dd { hi, lo }
    }
}

impl Sub for Dd {
    type Output = Dd;

    #[inline(always)]
    fn sub(self, rhs: Dd) -> Dd {
        self + (-rhs)
    }
}

impl Mul for Dd {
    type Output = Dd;

    #[inline(always)]
    fn mul(self, rhs: Dd) -> Dd {
        let (ch, cl1) = two_product(self.hi, rhs.hi);
        let tl1 = self.hi * rhs.lo;
        let tl2 = self.lo * rhs.hi;
        let cl2 = tl1 + tl2;
        let cl3 = cl1 + cl2;
        let (hi, lo) = two_sum(ch, cl3);
        Dd { hi, lo }
    }
}

impl PartialOrd for Dd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi)? {
            Ordering::Equal => self.lo.partial_cmp(&other.lo),
            ordering => Some(ordering),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::BigRational;

    fn exact(value: Dd) -> BigRational {
        BigRational::from_float(value.hi).unwrap() + BigRational::from_float(value.lo).unwrap()
    }

    #[test]
    fn addition_keeps_the_low_word() {
        let sum = Dd::from(1.0) + Dd::from(1.0e-30);
        assert_eq!(sum.hi, 1.0);
        assert_eq!(sum.lo, 1.0e-30);
        let back = sum - Dd::from(1.0);
        assert_eq!(back.to_f64(), 1.0e-30);
    }

    #[test]
    fn products_of_doubles_are_exact() {
        let a = Dd::from(0.1);
        let b = Dd::from(0.7);
        let expected = BigRational::from_float(0.1).unwrap() * BigRational::from_float(0.7).unwrap();
        assert_eq!(exact(a * b), expected);
    }

    #[test]
    fn product_error_is_tiny() {
        let third = Dd::from(1.0) * Dd::from(1.0 / 3.0) + Dd::from(1.0e-17);
        let square = third * third;
        let truth = exact(third) * exact(third);
        let err = (exact(square) - &truth) / truth;
        let bound = BigRational::from_float(2.0_f64.powi(-100)).unwrap();
        assert!(err < bound && -err < bound);
    }

    #[test]
    fn ordering_uses_both_words() {
        let base = Dd::from(1.0);
        let above = base + Dd::from(1.0e-20);
        let below = base - Dd::from(1.0e-20);
        assert!(below < base && base < above);
        assert!(Dd::from(-0.0).abs().hi == 0.0);
        assert_eq!(Dd { hi: -2.0, lo: 1.0e-17 }.abs(), Dd { hi: 2.0, lo: -1.0e-17 });
    }
}
