use thiserror::Error;

/// A violation of the canonical [`ExactFloat`](crate::ExactFloat) representation.
///
/// Returned by [`ExactFloat::check_invariants`](crate::ExactFloat::check_invariants);
/// every value produced by the public API is expected to pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("normal value has an even or zero mantissa")]
    NonCanonicalMantissa,
    #[error("{kind} value carries a nonzero mantissa or exponent")]
    NonZeroSpecialMantissa { kind: &'static str },
    #[error("exponent {exp} lies outside [{min}, {max}]")]
    ExponentOutOfRange { exp: i64, min: i32, max: i32 },
    #[error("mantissa precision {prec} exceeds the {max}-bit limit")]
    PrecisionExceeded { prec: u64, max: i32 },
}
