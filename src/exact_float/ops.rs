use num::BigUint;
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use super::{ExactFloat, Kind, MAX_EXP, MAX_PREC, MIN_EXP};

impl ExactFloat {
    /// Computes `(-1)^a_negative * |a| + (-1)^b_negative * |b|`.
    fn signed_sum(a_negative: bool, a: &Self, b_negative: bool, b: &Self) -> Self {
        if !a.is_normal() || !b.is_normal() {
            return Self::special_sum(a_negative, a, b_negative, b);
        }

        // Make `a` the operand with the larger bn_exp.
        let (a_negative, a, b_negative, b) = if a.bn_exp < b.bn_exp {
            (b_negative, b, a_negative, a)
        } else {
            (a_negative, a, b_negative, b)
        };

        // When `b` lies entirely below the last bit of `a`, the sum keeps
        // every bit of both and cannot fit.
        if i64::from(a.bn_exp) - i64::from(b.exp()) > i64::from(MAX_PREC) {
            return Self::nan();
        }

        let shift = (a.bn_exp - b.bn_exp) as usize;
        let aligned: BigUint = &a.mantissa << shift;
        let (negative, mantissa) = if a_negative == b_negative {
            (a_negative, aligned + &b.mantissa)
        } else {
            match aligned.cmp(&b.mantissa) {
                Ordering::Equal => return Self::zero(),
                Ordering::Greater => (a_negative, aligned - &b.mantissa),
                Ordering::Less => (b_negative, &b.mantissa - aligned),
            }
        };
        Self::from_parts(negative, mantissa, b.bn_exp)
    }

    fn special_sum(a_negative: bool, a: &Self, b_negative: bool, b: &Self) -> Self {
        if a.is_nan() {
            return a.clone();
        }
        if b.is_nan() {
            return b.clone();
        }
        if a.is_infinite() {
            if b.is_infinite() && a_negative != b_negative {
                return Self::nan();
            }
            return Self::infinity(a_negative);
        }
        if b.is_infinite() {
            return Self::infinity(b_negative);
        }
        if a.is_zero() {
            if !b.is_zero() {
                return b.copy_with_sign(b_negative);
            }
            // Zeros of equal sign keep it; opposite signs give +0.
            return Self::signed_zero(a_negative && b_negative);
        }
        debug_assert!(b.is_zero());
        a.copy_with_sign(a_negative)
    }

    fn product(a: &Self, b: &Self) -> Self {
        let negative = a.negative != b.negative;
        if !a.is_normal() || !b.is_normal() {
            return match (a.kind, b.kind) {
                (Kind::NaN, _) => a.clone(),
                (_, Kind::NaN) => b.clone(),
                (Kind::Zero, Kind::Infinity) | (Kind::Infinity, Kind::Zero) => Self::nan(),
                (Kind::Infinity, _) | (_, Kind::Infinity) => Self::infinity(negative),
                _ => Self::signed_zero(negative),
            };
        }
        // Odd times odd is odd, so the product keeps every bit.
        if a.prec() + b.prec() - 1 > MAX_PREC {
            return Self::nan();
        }
        Self::from_parts(negative, &a.mantissa * &b.mantissa, a.bn_exp + b.bn_exp)
    }

    pub fn abs(&self) -> Self {
        self.copy_with_sign(false)
    }

    /// Magnitude of `self` with the sign of `sign`.
    pub fn copysign(&self, sign: &Self) -> Self {
        self.copy_with_sign(sign.negative)
    }

    /// Larger argument; a NaN argument loses to a number and `+0` beats `-0`.
    pub fn fmax(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        }
        if other.is_nan() {
            return self.clone();
        }
        if self.negative != other.negative {
            return if self.negative { other.clone() } else { self.clone() };
        }
        if self < other { other.clone() } else { self.clone() }
    }

    /// Smaller argument; a NaN argument loses to a number and `-0` beats `+0`.
    pub fn fmin(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        }
        if other.is_nan() {
            return self.clone();
        }
        if self.negative != other.negative {
            return if self.negative { self.clone() } else { other.clone() };
        }
        if other < self { other.clone() } else { self.clone() }
    }

    /// Positive difference `max(self - other, 0)`; NaN if either is NaN.
    pub fn fdim(&self, other: &Self) -> Self {
        if self.is_nan() || other.is_nan() {
            return Self::nan();
        }
        if self <= other {
            Self::zero()
        } else {
            self - other
        }
    }

    /// `self * 2^exp`, saturating to zero or infinity.
    pub fn ldexp(&self, exp: i32) -> Self {
        if !self.is_normal() {
            return self.clone();
        }
        // Clamp so the new exponent lands in [MIN_EXP - 1, MAX_EXP + 1].
        let current = self.exp();
        let exp = exp.clamp(MIN_EXP - 1 - current, MAX_EXP + 1 - current);
        let mut result = self.clone();
        result.bn_exp += exp;
        result.canonicalize();
        result
    }

    /// Splits into a fraction in `[0.5, 1)` and a power of two. Non-normal
    /// values return themselves with exponent 0.
    pub fn frexp(&self) -> (Self, i32) {
        if !self.is_normal() {
            return (self.clone(), 0);
        }
        let exp = self.exp();
        (self.ldexp(-exp), exp)
    }

    /// Unbiased exponent of a value in `[1, 2) * 2^ilogb`. Zero and NaN give
    /// `i32::MIN`, infinities `i32::MAX`.
    pub fn ilogb(&self) -> i32 {
        match self.kind {
            Kind::Zero | Kind::NaN => i32::MIN,
            Kind::Infinity => i32::MAX,
            Kind::Normal => self.exp() - 1,
        }
    }

    /// [`ilogb`](Self::ilogb) as a value: `-inf` for zero, `+inf` for either
    /// infinity.
    pub fn logb(&self) -> Self {
        match self.kind {
            Kind::Zero => Self::infinity(true),
            Kind::Infinity => Self::infinity(false),
            Kind::NaN => self.clone(),
            Kind::Normal => Self::from(self.exp() - 1),
        }
    }
}

impl<'b> Add<&'b ExactFloat> for &ExactFloat {
    type Output = ExactFloat;

    fn add(self, rhs: &'b ExactFloat) -> ExactFloat {
        ExactFloat::signed_sum(self.negative, self, rhs.negative, rhs)
    }
}

impl<'b> Sub<&'b ExactFloat> for &ExactFloat {
    type Output = ExactFloat;

    fn sub(self, rhs: &'b ExactFloat) -> ExactFloat {
        ExactFloat::signed_sum(self.negative, self, !rhs.negative, rhs)
    }
}

impl<'b> Mul<&'b ExactFloat> for &ExactFloat {
    type Output = ExactFloat;

    fn mul(self, rhs: &'b ExactFloat) -> ExactFloat {
        ExactFloat::product(self, rhs)
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $trait for ExactFloat {
            type Output = ExactFloat;

            fn $method(self, rhs: ExactFloat) -> ExactFloat {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&ExactFloat> for ExactFloat {
            type Output = ExactFloat;

            fn $method(self, rhs: &ExactFloat) -> ExactFloat {
                (&self).$method(rhs)
            }
        }

        impl $trait<ExactFloat> for &ExactFloat {
            type Output = ExactFloat;

            fn $method(self, rhs: ExactFloat) -> ExactFloat {
                self.$method(&rhs)
            }
        }

        impl $assign_trait for ExactFloat {
            fn $assign_method(&mut self, rhs: ExactFloat) {
                *self = (&*self).$method(&rhs);
            }
        }

        impl $assign_trait<&ExactFloat> for ExactFloat {
            fn $assign_method(&mut self, rhs: &ExactFloat) {
                *self = (&*self).$method(rhs);
            }
        }
    };
}

forward_binop!(Add, add, AddAssign, add_assign);
forward_binop!(Sub, sub, SubAssign, sub_assign);
forward_binop!(Mul, mul, MulAssign, mul_assign);

impl Neg for ExactFloat {
    type Output = ExactFloat;

    fn neg(mut self) -> ExactFloat {
        self.negative = !self.negative;
        self
    }
}

impl Neg for &ExactFloat {
    type Output = ExactFloat;

    fn neg(self) -> ExactFloat {
        self.copy_with_sign(!self.negative)
    }
}
