use num::BigUint;
use std::fmt;

use super::ExactFloat;

/// Never print fewer digits than this, so small integers stay in fixed
/// notation and short binary fractions are shown in full.
const MIN_SIGNIFICANT_DIGITS: usize = 10;

impl ExactFloat {
    /// Formats with at most `max_digits` significant digits using the `%g`
    /// conventions, rounding half to even on the dropped digits.
    pub fn to_string_with_max_digits(&self, max_digits: usize) -> String {
        assert!(max_digits > 0, "max_digits must be positive");
        if !self.is_normal() {
            return match (self.is_nan(), self.is_zero(), self.negative) {
                (true, _, _) => "nan".to_owned(),
                (_, true, true) => "-0".to_owned(),
                (_, true, false) => "0".to_owned(),
                (_, _, true) => "-inf".to_owned(),
                (_, _, false) => "inf".to_owned(),
            };
        }

        let (digits, exp10) = self.decimal_digits(max_digits);
        let mut out = String::with_capacity(digits.len() + 8);
        if self.negative {
            out.push('-');
        }

        // exp10 places the mantissa in [0.1, 1) whereas %g assumes [1, 10),
        // hence the off-by-one thresholds.
        let len = digits.len() as i64;
        if exp10 <= -4 || exp10 > max_digits as i64 {
            out.push_str(&digits[..1]);
            if digits.len() > 1 {
                out.push('.');
                out.push_str(&digits[1..]);
            }
            out.push_str(&format!("e{:+03}", exp10 - 1));
        } else if exp10 > 0 {
            if exp10 >= len {
                out.push_str(&digits);
                out.extend(std::iter::repeat_n('0', (exp10 - len) as usize));
            } else {
                let split = exp10 as usize;
                out.push_str(&digits[..split]);
                out.push('.');
                out.push_str(&digits[split..]);
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', (-exp10) as usize));
            out.push_str(&digits);
        }
        out
    }

    /// Like `Display`, followed by the mantissa precision, e.g. `0.5<1>`.
    /// Distinct values never share a unique string.
    pub fn to_unique_string(&self) -> String {
        format!("{}<{}>", self, self.prec())
    }

    /// Returns the significant decimal digits (no trailing zeros) and the
    /// exponent `e` such that the value is `0.digits * 10^e`.
    fn decimal_digits(&self, max_digits: usize) -> (String, i64) {
        debug_assert!(self.is_normal());

        // Rewrite the value as an integer times a power of ten.
        let (integer, mut exp10) = if self.bn_exp >= 0 {
            (&self.mantissa << self.bn_exp as usize, 0_i64)
        } else {
            let five_pow = BigUint::from(5u32).pow(self.bn_exp.unsigned_abs());
            (&self.mantissa * five_pow, i64::from(self.bn_exp))
        };

        let all_digits = integer.to_str_radix(10);
        let mut digits = if all_digits.len() <= max_digits {
            all_digits.into_bytes()
        } else {
            let (kept, dropped) = all_digits.as_bytes().split_at(max_digits);
            let mut kept = kept.to_vec();
            let first_dropped = dropped[0];
            let round_up = first_dropped > b'5'
                || (first_dropped == b'5'
                    && (kept[max_digits - 1] % 2 == 1
                        || dropped[1..].iter().any(|&digit| digit != b'0')));
            if round_up {
                increment_decimal(&mut kept);
            }
            exp10 += (all_digits.len() - max_digits) as i64;
            kept
        };

        // A carry can add a digit, but then at least one trailing zero goes.
        let trailing = digits.iter().rev().take_while(|&&digit| digit == b'0').count();
        digits.truncate(digits.len() - trailing);
        exp10 += trailing as i64;
        debug_assert!(!digits.is_empty() && digits.len() <= max_digits);

        let len = digits.len() as i64;
        let digits = String::from_utf8(digits).unwrap_or_default();
        (digits, exp10 + len)
    }
}

fn increment_decimal(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit < b'9' {
            *digit += 1;
            return;
        }
        *digit = b'0';
    }
    digits.insert(0, b'1');
}

impl fmt::Display for ExactFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_digits =
            MIN_SIGNIFICANT_DIGITS.max(ExactFloat::significant_digits_for_prec(self.prec()));
        f.write_str(&self.to_string_with_max_digits(max_digits))
    }
}
