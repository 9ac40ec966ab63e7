use num::{BigUint, One, ToPrimitive};

use super::{ExactFloat, MAX_EXP, MAX_PREC, MIN_EXP};

/// How to pick between the two representable neighbours of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    TowardZero,
    AwayFromZero,
    TowardPositive,
    TowardNegative,
    TiesAwayFromZero,
    TiesToEven,
}

impl ExactFloat {
    /// Rounds to at most `max_prec` mantissa bits.
    ///
    /// Rounding can carry into a new high bit, but the carry leaves a trailing
    /// zero behind, so the result still fits in `max_prec` bits.
    pub fn round_to_max_prec(&self, max_prec: i32, mode: RoundingMode) -> Self {
        // Ties-to-even needs two bits, otherwise both neighbours may be odd.
        debug_assert!(max_prec >= 2, "max_prec must be at least 2");
        debug_assert!(max_prec <= MAX_PREC);

        // Zero, infinity and NaN have prec() == 0 and fall out here too.
        let shift = self.prec() - max_prec;
        if shift <= 0 {
            return self.clone();
        }
        self.round_to_power_of_2(self.bn_exp + shift, mode)
    }

    /// Rounds to a multiple of `2^bit_exp`.
    pub fn round_to_power_of_2(&self, bit_exp: i32, mode: RoundingMode) -> Self {
        debug_assert!(bit_exp >= MIN_EXP - MAX_PREC);
        debug_assert!(bit_exp <= MAX_EXP);

        let shift = i64::from(bit_exp) - i64::from(self.bn_exp);
        if !self.is_normal() || shift <= 0 {
            return self.clone();
        }

        let mode = match mode {
            RoundingMode::TowardPositive if self.negative => RoundingMode::TowardZero,
            RoundingMode::TowardPositive => RoundingMode::AwayFromZero,
            RoundingMode::TowardNegative if self.negative => RoundingMode::AwayFromZero,
            RoundingMode::TowardNegative => RoundingMode::TowardZero,
            other => other,
        };

        let shift = shift as u64;
        let mantissa = &self.mantissa;
        let guard = mantissa.bit(shift - 1);
        let low_zeros = mantissa.trailing_zeros().unwrap_or(u64::MAX);
        let increment = match mode {
            RoundingMode::TowardZero => false,
            RoundingMode::TiesAwayFromZero => guard,
            RoundingMode::AwayFromZero => low_zeros < shift,
            // Let "w/xyz" be the lowest kept bit and the discarded bits:
            //   ./0.*     fraction < 1/2, keep
            //   0/10*     tie with an even kept part, keep
            //   1/10*     tie with an odd kept part, increment
            //   ./1.*1.*  fraction > 1/2, increment
            RoundingMode::TiesToEven => guard && (mantissa.bit(shift) || low_zeros < shift - 1),
            RoundingMode::TowardPositive | RoundingMode::TowardNegative => {
                unreachable!("directed modes were mapped above")
            }
        };

        let mut truncated: BigUint = mantissa >> shift;
        if increment {
            truncated += BigUint::one();
        }
        // shift <= bit_exp - bn_exp, so the new exponent is bit_exp itself.
        ExactFloat::from_parts(self.negative, truncated, bit_exp)
    }

    /// Smallest integer not less than `self`.
    pub fn ceil(&self) -> Self {
        self.round_to_power_of_2(0, RoundingMode::TowardPositive)
    }

    /// Largest integer not greater than `self`.
    pub fn floor(&self) -> Self {
        self.round_to_power_of_2(0, RoundingMode::TowardNegative)
    }

    pub fn trunc(&self) -> Self {
        self.round_to_power_of_2(0, RoundingMode::TowardZero)
    }

    /// Nearest integer, halfway cases away from zero.
    pub fn round(&self) -> Self {
        self.round_to_power_of_2(0, RoundingMode::TiesAwayFromZero)
    }

    /// Nearest integer, halfway cases to even.
    pub fn rint(&self) -> Self {
        self.round_to_power_of_2(0, RoundingMode::TiesToEven)
    }

    /// Rounds to an integer and clamps it to the `i64` range. NaN maps to
    /// `i64::MAX`.
    pub fn to_i64(&self, mode: RoundingMode) -> i64 {
        let rounded = self.round_to_power_of_2(0, mode);
        if rounded.is_nan() {
            return i64::MAX;
        }
        if rounded.is_zero() {
            return 0;
        }
        if rounded.is_normal() && rounded.exp() < 64 {
            // exp() < 64 keeps the magnitude below 2^63.
            let magnitude = rounded.mantissa.to_u64().unwrap_or(u64::MAX) << rounded.bn_exp;
            let value = magnitude as i64;
            return if rounded.negative { -value } else { value };
        }
        if rounded.negative { i64::MIN } else { i64::MAX }
    }

    /// As [`to_i64`](Self::to_i64), clamped to the `i32` range.
    pub fn to_i32(&self, mode: RoundingMode) -> i32 {
        let value = self.to_i64(mode);
        if self.is_nan() {
            return i32::MAX;
        }
        value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}
