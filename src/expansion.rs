//! Error-free transformations of `f64` arithmetic.
//!
//! Each function returns a pair `(result, err)` such that `result + err` is the
//! exact value of the operation, with `result` the rounded `f64` answer. They
//! are the building blocks of the double-double scalar used in triage.

/// Veltkamp splitting constant, `2^27 + 1`.
const SPLITTER: f64 = 134_217_729.0;

/// Sum of two values of any magnitude (Knuth).
pub(crate) fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    let b_virtual = sum - a;
    let a_virtual = sum - b_virtual;
    let b_roundoff = b - b_virtual;
    let a_roundoff = a - a_virtual;
    (sum, a_roundoff + b_roundoff)
}

/// Splits `a` into two non-overlapping halves of at most 26 significant bits.
fn split(a: f64) -> (f64, f64) {
    let c = SPLITTER * a;
    let a_big = c - a;
    let hi = c - a_big;
    (hi, a - hi)
}

/// Product of two values (Dekker). Exact unless the product underflows or
/// `SPLITTER * a` overflows.
pub(crate) fn two_product(a: f64, b: f64) -> (f64, f64) {
    let product = a * b;
    let (a_hi, a_lo) = split(a);
    let (b_hi, b_lo) = split(b);
    let err1 = product - a_hi * b_hi;
    let err2 = err1 - a_lo * b_hi;
    let err3 = err2 - a_hi * b_lo;
    (product, a_lo * b_lo - err3)
}
