//! Forward error tracking for triage.
//!
//! A [`Bounded`] value carries the computed result `v̂`, a magnitude bound `m̂`
//! and the depth `k` of the longest chain of rounded operations that produced
//! it, and maintains
//!
//! ```text
//! |v̂ - v| <= γ_k · m̂        γ_n = n·u / (1 - n·u)
//! ```
//!
//! where `v` is the exact value of the same expression and `u` the unit
//! roundoff of `T` (Higham, "Accuracy and Stability of Numerical Algorithms",
//! §3.1). Leaves are exact (`m̂ = |v̂|`, `k = 0`). Sums add magnitudes and take
//! `max(ka, kb) + 1`; products multiply magnitudes, take `ka + kb + 1` and add
//! an underflow margin `η` with `u·η` at least the absolute error of an
//! underflowing product.
//!
//! `m̂` is itself computed in `T`, which perturbs the bound by `O(k²u²)`. The
//! sign test therefore checks against `γ_{K+2}` for a declared depth `K`;
//! the two extra units cover that term and the rounding of `γ·m̂`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::dd::Dd;
use super::{ErrorBound, Real};
use crate::geometry::Sign;

/// A floating-point type that can run the triage stage.
pub trait TriageFloat:
    Copy
    + fmt::Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Relative error bound of one arithmetic operation.
    const UNIT_ROUNDOFF: f64;
    /// Added to every product magnitude to absorb underflow.
    const UNDERFLOW_MARGIN: Self;
    const ZERO: Self;

    fn from_f64(value: f64) -> Self;
    fn abs(self) -> Self;
}

impl TriageFloat for f64 {
    const UNIT_ROUNDOFF: f64 = 0.5 * f64::EPSILON;
    const UNDERFLOW_MARGIN: f64 = f64::MIN_POSITIVE;
    const ZERO: f64 = 0.0;

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn abs(self) -> Self {
        f64::abs(self)
    }
}

impl TriageFloat for Dd {
    // 2^-100
    const UNIT_ROUNDOFF: f64 = f64::from_bits((1023 - 100) << 52);
    // 2^-960: the low word loses accuracy once the high word drops below
    // 2^-969.
    const UNDERFLOW_MARGIN: Dd = Dd::from_f64(f64::from_bits((1023 - 960) << 52));
    const ZERO: Dd = Dd::ZERO;

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        Dd::from_f64(value)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Dd::abs(self)
    }
}

/// A triage value with its running error bound. See the module docs.
#[derive(Debug, Clone, Copy)]
pub struct Bounded<T> {
    value: T,
    magnitude: T,
    depth: u32,
}

impl<T: TriageFloat> Bounded<T> {
    /// An exact input.
    #[inline(always)]
    pub fn leaf(value: f64) -> Self {
        let value = T::from_f64(value);
        Self {
            value,
            magnitude: value.abs(),
            depth: 0,
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn magnitude(&self) -> T {
        self.magnitude
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl<T: TriageFloat> Add for Bounded<T> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            magnitude: self.magnitude + rhs.magnitude,
            depth: self.depth.max(rhs.depth) + 1,
        }
    }
}

impl<T: TriageFloat> Sub for Bounded<T> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
            magnitude: self.magnitude + rhs.magnitude,
            depth: self.depth.max(rhs.depth) + 1,
        }
    }
}

impl<T: TriageFloat> Mul for Bounded<T> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        // A zero magnitude means an exact zero, and so is the product.
        let magnitude = if self.magnitude == T::ZERO || rhs.magnitude == T::ZERO {
            T::ZERO
        } else {
            self.magnitude * rhs.magnitude + T::UNDERFLOW_MARGIN
        };
        Self {
            value: self.value * rhs.value,
            magnitude,
            depth: self.depth + rhs.depth + 1,
        }
    }
}

impl<T: TriageFloat> Neg for Bounded<T> {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            value: -self.value,
            ..self
        }
    }
}

impl<T: TriageFloat> Real for Bounded<T> {
    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        Self::leaf(value)
    }

    #[inline(always)]
    fn abs(&self) -> Self {
        Self {
            value: self.value.abs(),
            ..*self
        }
    }

    #[inline(always)]
    fn certain_sign(&self, bound: ErrorBound) -> Option<Sign> {
        debug_assert!(
            self.depth <= bound.depth(),
            "expression depth {} exceeds its declared error bound {}",
            self.depth,
            bound.depth()
        );
        if self.magnitude == T::ZERO {
            return Some(Sign::Zero);
        }
        let err = T::from_f64(bound.coefficient(T::UNIT_ROUNDOFF)) * self.magnitude;
        if self.value > err {
            Some(Sign::Positive)
        } else if self.value < -err {
            Some(Sign::Negative)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type B = Bounded<f64>;

    #[test]
    fn depth_follows_the_longest_chain() {
        let a = B::leaf(1.0);
        let b = B::leaf(2.0);
        let product = a * b;
        assert_eq!(product.depth(), 1);
        let sum = product + a;
        assert_eq!(sum.depth(), 2);
        assert_eq!((sum * product).depth(), 4);
        assert_eq!((-sum).depth(), 2);
        assert_eq!(sum.abs().depth(), 2);
    }

    #[test]
    fn magnitudes_ignore_cancellation() {
        let x = B::leaf(3.0) - B::leaf(3.0);
        assert_eq!(x.value(), 0.0);
        assert_eq!(x.magnitude(), 6.0);
        assert_eq!(x.certain_sign(ErrorBound::new(1)), None);
    }

    #[test]
    fn exact_zeros_are_certified() {
        let zero = B::leaf(0.0) * B::leaf(5.0) - B::leaf(0.0);
        assert_eq!(zero.certain_sign(ErrorBound::new(2)), Some(Sign::Zero));
    }

    #[test]
    fn clear_signs_are_certified() {
        let det = B::leaf(2.0) * B::leaf(3.0) - B::leaf(1.0) * B::leaf(1.0);
        assert_eq!(det.certain_sign(ErrorBound::new(2)), Some(Sign::Positive));
        assert_eq!((-det).certain_sign(ErrorBound::new(2)), Some(Sign::Negative));
    }

    #[test]
    fn rounding_noise_is_not_certified() {
        // 0.1 * 3 - 0.3 rounds to a tiny nonzero value.
        let noisy = B::leaf(0.1) * B::leaf(3.0) - B::leaf(0.3);
        assert_ne!(noisy.value(), 0.0);
        assert_eq!(noisy.certain_sign(ErrorBound::new(2)), None);

        let dd = Bounded::<Dd>::leaf(0.1) * Bounded::<Dd>::leaf(3.0) - Bounded::<Dd>::leaf(0.3);
        assert_eq!(dd.certain_sign(ErrorBound::new(2)), Some(Sign::Positive));
    }

    #[test]
    #[should_panic(expected = "exceeds its declared error bound")]
    #[cfg(debug_assertions)]
    fn undeclared_depth_is_caught() {
        let deep = (B::leaf(1.0) + B::leaf(2.0)) * B::leaf(3.0);
        let _ = deep.certain_sign(ErrorBound::new(1));
    }

    #[test]
    fn margins_match_their_powers_of_two() {
        assert_eq!(<Dd as TriageFloat>::UNIT_ROUNDOFF, 2.0_f64.powi(-100));
        assert_eq!(<Dd as TriageFloat>::UNDERFLOW_MARGIN.hi, 2.0_f64.powi(-960));
    }
}
