//! Arbitrary-precision binary floating point with IEEE-754 special values.
//!
//! [`ExactFloat`] stores `(-1)^negative * mantissa * 2^bn_exp` with an
//! unbounded [`BigUint`] mantissa, so addition, subtraction and
//! multiplication are always exact. It exists to back the exact stage of the
//! predicate cascade and to test fixed-precision code against; it is not a
//! replacement for a bounded float. An operation whose result would need more
//! than [`MAX_PREC`] mantissa bits returns NaN.
//!
//! ```rust
//! use spherepred::ExactFloat;
//!
//! let third = ExactFloat::from(1.0 / 3.0);
//! let sum = &third + &third + &third;
//! assert_eq!(sum.to_f64(), 1.0);
//! assert!(sum != ExactFloat::from(1.0));
//! ```

mod format;
mod ops;
mod round;

pub use round::RoundingMode;

use crate::error::InvariantError;
use num::{BigUint, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Largest exponent before a value overflows to infinity.
pub const MAX_EXP: i32 = 200_000_000;

/// Smallest exponent before a value underflows to zero.
pub const MIN_EXP: i32 = -200_000_000;

/// Largest supported mantissa width in bits.
pub const MAX_PREC: i32 = 64 << 20;

/// Mantissa width of an IEEE double, counting the implicit bit.
pub const DOUBLE_MANTISSA_BITS: i32 = 53;

/// `bn_exp` of the smallest subnormal double.
const DOUBLE_MIN_BN_EXP: i32 = -1074;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Normal,
    Zero,
    Infinity,
    NaN,
}

/// An exact binary floating-point number. See the module docs.
#[derive(Clone)]
pub struct ExactFloat {
    negative: bool,
    kind: Kind,
    // Exponent of the least significant mantissa bit.
    bn_exp: i32,
    // Odd for normal values, zero otherwise.
    mantissa: BigUint,
}

impl ExactFloat {
    /// Returns positive zero.
    pub fn zero() -> Self {
        Self::signed_zero(false)
    }

    pub fn signed_zero(negative: bool) -> Self {
        Self::special(Kind::Zero, negative)
    }

    pub fn infinity(negative: bool) -> Self {
        Self::special(Kind::Infinity, negative)
    }

    pub fn nan() -> Self {
        Self::special(Kind::NaN, false)
    }

    fn special(kind: Kind, negative: bool) -> Self {
        Self {
            negative,
            kind,
            bn_exp: 0,
            mantissa: BigUint::zero(),
        }
    }

    /// Builds a normal value from its parts and canonicalizes it.
    fn from_parts(negative: bool, mantissa: BigUint, bn_exp: i32) -> Self {
        let mut value = Self {
            negative,
            kind: Kind::Normal,
            bn_exp,
            mantissa,
        };
        value.canonicalize();
        value
    }

    /// Converts an `f64` exactly, including signed zeros, infinities and NaN.
    pub fn from_f64(value: f64) -> Self {
        let negative = value.is_sign_negative();
        if value.is_nan() {
            return Self::special(Kind::NaN, negative);
        }
        if value.is_infinite() {
            return Self::infinity(negative);
        }
        if value == 0.0 {
            return Self::signed_zero(negative);
        }

        let bits = value.to_bits();
        let biased_exp = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, bn_exp) = if biased_exp == 0 {
            (fraction, DOUBLE_MIN_BN_EXP)
        } else {
            (fraction | (1u64 << 52), biased_exp - 1075)
        };
        Self::from_parts(negative, BigUint::from(mantissa), bn_exp)
    }

    fn from_integer(value: i64) -> Self {
        if value == 0 {
            return Self::zero();
        }
        Self::from_parts(value < 0, BigUint::from(value.unsigned_abs()), 0)
    }

    /// Rounds to the nearest `f64`, ties to even. Values beyond the double
    /// range become infinities or signed zeros.
    pub fn to_f64(&self) -> f64 {
        if !self.is_normal() {
            return self.special_to_f64();
        }
        if self.exp() <= DOUBLE_MIN_BN_EXP + DOUBLE_MANTISSA_BITS {
            // Subnormal range: quantize directly to multiples of 2^-1074 so
            // the value is rounded once.
            let rounded = self.round_to_power_of_2(DOUBLE_MIN_BN_EXP, RoundingMode::TiesToEven);
            return rounded.to_f64_unrounded();
        }
        if self.prec() <= DOUBLE_MANTISSA_BITS {
            return self.to_f64_unrounded();
        }
        self.round_to_max_prec(DOUBLE_MANTISSA_BITS, RoundingMode::TiesToEven)
            .to_f64_unrounded()
    }

    fn to_f64_unrounded(&self) -> f64 {
        if !self.is_normal() {
            return self.special_to_f64();
        }
        debug_assert!(self.prec() <= DOUBLE_MANTISSA_BITS);
        let mantissa = self.mantissa.to_u64().unwrap_or(u64::MAX) as f64;
        let magnitude = scalbn(mantissa, self.bn_exp);
        if self.negative { -magnitude } else { magnitude }
    }

    fn special_to_f64(&self) -> f64 {
        let magnitude = match self.kind {
            Kind::Zero => 0.0,
            Kind::Infinity => f64::INFINITY,
            Kind::NaN => f64::NAN,
            Kind::Normal => unreachable!("normal values take the scaled path"),
        };
        if self.negative { -magnitude } else { magnitude }
    }

    pub fn is_zero(&self) -> bool {
        self.kind == Kind::Zero
    }

    pub fn is_infinite(&self) -> bool {
        self.kind == Kind::Infinity
    }

    pub fn is_nan(&self) -> bool {
        self.kind == Kind::NaN
    }

    /// True for nonzero finite values.
    pub fn is_normal(&self) -> bool {
        self.kind == Kind::Normal
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.kind, Kind::Normal | Kind::Zero)
    }

    /// True when the sign bit is set, including for `-0` and `-inf`.
    pub fn is_sign_negative(&self) -> bool {
        self.negative
    }

    /// Returns -1, 0 or +1. Zeros and NaN report 0.
    pub fn sgn(&self) -> i32 {
        match self.kind {
            Kind::Zero | Kind::NaN => 0,
            _ if self.negative => -1,
            _ => 1,
        }
    }

    /// Number of mantissa bits; zero for non-normal values.
    pub fn prec(&self) -> i32 {
        i32::try_from(self.mantissa.bits()).unwrap_or(i32::MAX)
    }

    /// Exponent such that a normal value lies in `[0.5, 1) * 2^exp`.
    pub fn exp(&self) -> i32 {
        debug_assert!(self.is_normal(), "exp() of a non-normal ExactFloat");
        self.bn_exp + self.prec()
    }

    /// Number of decimal digits needed to show `prec` bits faithfully.
    pub fn significant_digits_for_prec(prec: i32) -> usize {
        1 + (f64::from(prec) * std::f64::consts::LOG10_2).ceil() as usize
    }

    /// Returns `self` with its sign replaced; applies to every kind.
    pub fn copy_with_sign(&self, negative: bool) -> Self {
        let mut result = self.clone();
        result.negative = negative;
        result
    }

    fn canonicalize(&mut self) {
        if self.kind != Kind::Normal {
            return;
        }
        if self.mantissa.is_zero() {
            *self = Self::signed_zero(self.negative);
            return;
        }
        let exp = i64::from(self.bn_exp) + i64::from(self.prec());
        if exp < i64::from(MIN_EXP) {
            *self = Self::signed_zero(self.negative);
            return;
        }
        if exp > i64::from(MAX_EXP) {
            *self = Self::infinity(self.negative);
            return;
        }
        if let Some(shift) = self.mantissa.trailing_zeros().filter(|&shift| shift > 0) {
            self.mantissa >>= shift;
            self.bn_exp += shift as i32;
        }
        if self.prec() > MAX_PREC {
            *self = Self::nan();
        }
    }

    /// Verifies the canonical representation.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match self.kind {
            Kind::Normal => {
                if self.mantissa.is_zero() || !self.mantissa.bit(0) {
                    return Err(InvariantError::NonCanonicalMantissa);
                }
                let exp = i64::from(self.bn_exp) + i64::from(self.prec());
                if exp < i64::from(MIN_EXP) || exp > i64::from(MAX_EXP) {
                    return Err(InvariantError::ExponentOutOfRange {
                        exp,
                        min: MIN_EXP,
                        max: MAX_EXP,
                    });
                }
                if self.prec() > MAX_PREC {
                    return Err(InvariantError::PrecisionExceeded {
                        prec: self.mantissa.bits(),
                        max: MAX_PREC,
                    });
                }
                Ok(())
            }
            kind => {
                if self.mantissa.is_zero() && self.bn_exp == 0 {
                    Ok(())
                } else {
                    Err(InvariantError::NonZeroSpecialMantissa {
                        kind: kind.name(),
                    })
                }
            }
        }
    }

    /// Compares magnitudes of two non-NaN values.
    fn unsigned_cmp(&self, other: &Self) -> Ordering {
        match (self.kind, other.kind) {
            (Kind::Infinity, Kind::Infinity) | (Kind::Zero, Kind::Zero) => Ordering::Equal,
            (Kind::Infinity, _) | (_, Kind::Zero) => Ordering::Greater,
            (_, Kind::Infinity) | (Kind::Zero, _) => Ordering::Less,
            _ => self
                .exp()
                .cmp(&other.exp())
                .then_with(|| self.scaled_mantissa_cmp(other)),
        }
    }

    /// Aligns both mantissas to the smaller `bn_exp` and compares them.
    fn scaled_mantissa_cmp(&self, other: &Self) -> Ordering {
        match self.bn_exp.cmp(&other.bn_exp) {
            Ordering::Equal => self.mantissa.cmp(&other.mantissa),
            Ordering::Greater => {
                let shift = (self.bn_exp - other.bn_exp) as usize;
                (&self.mantissa << shift).cmp(&other.mantissa)
            }
            Ordering::Less => other.scaled_mantissa_cmp(self).reverse(),
        }
    }
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Normal => "normal",
            Kind::Zero => "zero",
            Kind::Infinity => "infinite",
            Kind::NaN => "NaN",
        }
    }
}

/// `x * 2^n` with a single rounding, including into the subnormal range.
fn scalbn(x: f64, mut n: i32) -> f64 {
    let two_pow_1023 = f64::from_bits(0x7fe0_0000_0000_0000);
    let two_pow_53 = f64::from_bits(0x4340_0000_0000_0000);
    let two_pow_minus_1022 = f64::from_bits(0x0010_0000_0000_0000);

    let mut y = x;
    if n > 1023 {
        y *= two_pow_1023;
        n -= 1023;
        if n > 1023 {
            y *= two_pow_1023;
            n -= 1023;
            n = n.min(1023);
        }
    } else if n < -1022 {
        // Keep the final n below -53 so subnormal results round only once.
        y *= two_pow_minus_1022 * two_pow_53;
        n += 1022 - 53;
        if n < -1022 {
            y *= two_pow_minus_1022 * two_pow_53;
            n += 1022 - 53;
            n = n.max(-1022);
        }
    }
    y * f64::from_bits(((0x3ff + n) as u64) << 52)
}

impl Default for ExactFloat {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<f64> for ExactFloat {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<i32> for ExactFloat {
    fn from(value: i32) -> Self {
        Self::from_integer(i64::from(value))
    }
}

impl From<i64> for ExactFloat {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl PartialEq for ExactFloat {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (Kind::NaN, _) | (_, Kind::NaN) => false,
            (Kind::Zero, Kind::Zero) => true,
            (lhs, rhs) => {
                lhs == rhs
                    && self.negative == other.negative
                    && self.bn_exp == other.bn_exp
                    && self.mantissa == other.mantissa
            }
        }
    }
}

impl PartialOrd for ExactFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        if self.is_zero() && other.is_zero() {
            return Some(Ordering::Equal);
        }
        Some(match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.unsigned_cmp(other),
            (true, true) => other.unsigned_cmp(self),
        })
    }
}

impl fmt::Debug for ExactFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Normal => write!(
                f,
                "ExactFloat({}{} * 2^{})",
                if self.negative { "-" } else { "" },
                self.mantissa,
                self.bn_exp
            ),
            _ => write!(f, "ExactFloat({})", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_decompose_exactly() {
        let value = ExactFloat::from(0.75);
        assert_eq!(value.prec(), 2);
        assert_eq!(value.bn_exp, -2);
        assert_eq!(value.exp(), 0);
        value.check_invariants().unwrap();

        let tiny = ExactFloat::from(f64::from_bits(1));
        assert_eq!(tiny.prec(), 1);
        assert_eq!(tiny.bn_exp, -1074);
        assert_eq!(tiny.to_f64(), f64::from_bits(1));
    }

    #[test]
    fn special_values_keep_their_sign() {
        assert!(ExactFloat::from(-0.0).is_sign_negative());
        assert!(ExactFloat::from(-0.0).is_zero());
        assert_eq!(ExactFloat::from(f64::NEG_INFINITY).to_f64(), f64::NEG_INFINITY);
        assert!(ExactFloat::from(f64::NAN).to_f64().is_nan());
        assert!(ExactFloat::signed_zero(true).to_f64().is_sign_negative());
    }

    #[test]
    fn integers_convert_exactly() {
        let value = ExactFloat::from(i64::MIN);
        assert_eq!(value.prec(), 1);
        assert_eq!(value.exp(), 64);
        assert_eq!(value.to_f64(), -9_223_372_036_854_775_808.0);
        assert_eq!(ExactFloat::from(-12_i32).to_f64(), -12.0);
        assert_eq!(ExactFloat::from(0_i32), ExactFloat::zero());
    }

    #[test]
    fn wide_values_round_to_nearest_double() {
        let one = ExactFloat::from(1.0);
        let half_ulp = ExactFloat::from(f64::EPSILON / 2.0);
        let tiny = ExactFloat::from(1.0e-300);

        // Exactly halfway rounds to even; anything above rounds up.
        assert_eq!((&one + &half_ulp).to_f64(), 1.0);
        assert_eq!((&(&one + &half_ulp) + &tiny).to_f64(), 1.0 + f64::EPSILON);
        assert_eq!((&(&one + &half_ulp) - &tiny).to_f64(), 1.0);
    }

    #[test]
    fn subnormal_results_round_once() {
        // 2^-1075 + 2^-1130 lies just above the halfway point between 0 and
        // the smallest subnormal.
        let half_min = ExactFloat::from(f64::from_bits(1)) * ExactFloat::from(0.5);
        let nudge = ExactFloat::from(2.0_f64.powi(-1000)) * ExactFloat::from(2.0_f64.powi(-130));
        assert_eq!(half_min.to_f64(), 0.0);
        assert_eq!((&half_min + &nudge).to_f64(), f64::from_bits(1));
    }

    #[test]
    fn out_of_range_exponents_saturate() {
        let big = ExactFloat::from(f64::MAX);
        assert_eq!(big.to_f64(), f64::MAX);
        let bigger = &big * &big;
        assert!(bigger.is_normal());
        assert_eq!(bigger.to_f64(), f64::INFINITY);
        let small = ExactFloat::from(f64::MIN_POSITIVE);
        assert_eq!((&small * &small).to_f64(), 0.0);
    }

    #[test]
    fn comparisons_follow_ieee() {
        let nan = ExactFloat::nan();
        assert!(nan != nan);
        assert_eq!(nan.partial_cmp(&ExactFloat::zero()), None);
        assert_eq!(ExactFloat::from(0.0), ExactFloat::from(-0.0));
        assert!(ExactFloat::from(-3.0) < ExactFloat::from(-0.0));
        assert!(ExactFloat::from(-3.0) < ExactFloat::from(-2.5));
        assert!(ExactFloat::from(1.5) < ExactFloat::from(1.75));
        assert!(ExactFloat::from(7.0) < ExactFloat::infinity(false));
        assert!(ExactFloat::infinity(true) < ExactFloat::from(-1.0e300));
        assert!(ExactFloat::from(3.0) > ExactFloat::from(2.0));
    }

    #[test]
    fn scaled_mantissas_compare_within_one_exponent() {
        // Same exp(), different bn_exp: 0.75 = 3 * 2^-2 and 0.625 = 5 * 2^-3.
        let a = ExactFloat::from(0.75);
        let b = ExactFloat::from(0.625);
        assert_eq!(a.exp(), b.exp());
        assert!(b < a);
        assert!(a > b);
    }

    #[test]
    fn check_invariants_reports_broken_values() {
        let even = ExactFloat {
            negative: false,
            kind: Kind::Normal,
            bn_exp: 0,
            mantissa: BigUint::from(4u32),
        };
        assert_eq!(
            even.check_invariants(),
            Err(InvariantError::NonCanonicalMantissa)
        );
        let dirty_zero = ExactFloat {
            negative: false,
            kind: Kind::Zero,
            bn_exp: 3,
            mantissa: BigUint::zero(),
        };
        assert!(matches!(
            dirty_zero.check_invariants(),
            Err(InvariantError::NonZeroSpecialMantissa { kind: "zero" })
        ));
    }
}
