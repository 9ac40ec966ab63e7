//! The three-stage predicate cascade.
//!
//! A predicate's defining formula is written once, generically over [`Real`],
//! and evaluated with progressively more expensive scalars:
//!
//! 1. [`Bounded<f64>`]: plain doubles with a running forward error bound;
//! 2. [`Bounded<Dd>`]: the same in double-double (feature `extended-precision`);
//! 3. [`ExactFloat`]: no rounding at all, so the sign is always certain.
//!
//! If the exact value is zero the predicate reports [`Verdict::Degenerate`]
//! and its symbolic perturbation rule picks the answer.

mod bounded;
pub mod dd;

pub use bounded::{Bounded, TriageFloat};
pub use dd::Dd;

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use tracing::{debug, trace};

use crate::exact_float::ExactFloat;
use crate::geometry::Sign;

/// Arithmetic shared by every stage of the cascade.
pub trait Scalar:
    Clone + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
{
}

impl<T> Scalar for T where
    T: Clone + Add<Output = T> + Sub<Output = T> + Mul<Output = T> + Neg<Output = T>
{
}

/// A scalar that a predicate formula can be evaluated in.
pub trait Real: Scalar + fmt::Debug {
    /// Exact conversion of an input coordinate or small constant.
    fn from_f64(value: f64) -> Self;

    fn abs(&self) -> Self;

    /// Sign of the exact value this scalar approximates, or `None` if the
    /// accumulated rounding error could hide it. `bound` must cover every
    /// operation that produced `self`.
    fn certain_sign(&self, bound: ErrorBound) -> Option<Sign>;
}

/// `γ_n = n·u / (1 - n·u)`
pub const fn gamma(n: u32, unit_roundoff: f64) -> f64 {
    let nu = n as f64 * unit_roundoff;
    nu / (1.0 - nu)
}

/// Compile-time error budget of a triage formula, expressed as the longest
/// chain of rounded operations it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorBound {
    depth: u32,
}

impl ErrorBound {
    pub const fn new(depth: u32) -> Self {
        Self { depth }
    }

    pub const fn depth(self) -> u32 {
        self.depth
    }

    /// Relative error coefficient for a unit roundoff `u`, with two spare
    /// units for rounding in the magnitude and in the bound itself.
    pub const fn coefficient(self, unit_roundoff: f64) -> f64 {
        gamma(self.depth + 2, unit_roundoff)
    }
}

impl Real for ExactFloat {
    #[inline]
    fn from_f64(value: f64) -> Self {
        ExactFloat::from_f64(value)
    }

    #[inline]
    fn abs(&self) -> Self {
        ExactFloat::abs(self)
    }

    fn certain_sign(&self, _bound: ErrorBound) -> Option<Sign> {
        debug_assert!(
            !self.is_nan(),
            "exact evaluation produced NaN (non-finite input or precision exhausted)"
        );
        Some(Sign::from_i32(self.sgn()))
    }
}

/// The stage that settled a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Triage,
    Extended,
    Exact,
    Symbolic,
}

/// A predicate result together with the stage that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation<O> {
    pub outcome: O,
    pub stage: Stage,
}

/// A certain result of one evaluation of a predicate formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<O> {
    Decided(O),
    /// The exact formula is zero and the answer comes from symbolic
    /// perturbation.
    Degenerate,
}

impl Verdict<Sign> {
    /// A sign that must not be zero; zero is degenerate.
    pub fn nonzero(sign: Sign) -> Self {
        match sign {
            Sign::Zero => Verdict::Degenerate,
            sign => Verdict::Decided(sign),
        }
    }
}

/// A geometric test that can run through [`evaluate`].
pub trait Predicate {
    type Output: Copy + fmt::Debug;

    /// Name used in trace events.
    const NAME: &'static str;

    /// Whether the double-double pass is worth running before going exact.
    const EXTENDED: bool = true;

    /// Evaluates the formula in `T`. `None` means the sign of some quantity
    /// could not be certified at this precision; `ExactFloat` never does that.
    fn eval<T: Real>(&self) -> Option<Verdict<Self::Output>>;

    /// The answer for an exactly degenerate input.
    fn symbolic(&self) -> Self::Output {
        unreachable!("{} never reports a degenerate verdict", Self::NAME)
    }
}

/// Runs `predicate` through triage, exact evaluation and, for degenerate
/// input, symbolic perturbation.
pub fn evaluate<P: Predicate>(predicate: &P) -> Evaluation<P::Output> {
    if let Some(verdict) = predicate.eval::<Bounded<f64>>() {
        return settle(predicate, verdict, Stage::Triage);
    }
    trace!(predicate = P::NAME, "f64 triage inconclusive");

    if cfg!(feature = "extended-precision") && P::EXTENDED {
        if let Some(verdict) = predicate.eval::<Bounded<Dd>>() {
            return settle(predicate, verdict, Stage::Extended);
        }
        trace!(predicate = P::NAME, "double-double triage inconclusive");
    }

    match predicate.eval::<ExactFloat>() {
        Some(verdict) => settle(predicate, verdict, Stage::Exact),
        None => panic!("{}: exact evaluation was indeterminate", P::NAME),
    }
}

fn settle<P: Predicate>(
    predicate: &P,
    verdict: Verdict<P::Output>,
    stage: Stage,
) -> Evaluation<P::Output> {
    match verdict {
        Verdict::Decided(outcome) => Evaluation { outcome, stage },
        Verdict::Degenerate => {
            let outcome = predicate.symbolic();
            debug!(
                predicate = P::NAME,
                ?stage,
                ?outcome,
                "exactly degenerate input resolved symbolically"
            );
            Evaluation {
                outcome,
                stage: Stage::Symbolic,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sign of `a * b - c`, perturbed towards positive.
    struct ProductMinus {
        a: f64,
        b: f64,
        c: f64,
    }

    impl Predicate for ProductMinus {
        type Output = Sign;
        const NAME: &'static str = "product_minus";

        fn eval<T: Real>(&self) -> Option<Verdict<Sign>> {
            let value = T::from_f64(self.a) * T::from_f64(self.b) - T::from_f64(self.c);
            value.certain_sign(ErrorBound::new(2)).map(Verdict::nonzero)
        }

        fn symbolic(&self) -> Sign {
            Sign::Positive
        }
    }

    fn run(a: f64, b: f64, c: f64) -> Evaluation<Sign> {
        evaluate(&ProductMinus { a, b, c })
    }

    #[test]
    fn easy_inputs_stop_at_triage() {
        assert_eq!(
            run(2.0, 3.0, 5.0),
            Evaluation {
                outcome: Sign::Positive,
                stage: Stage::Triage
            }
        );
        assert_eq!(run(2.0, 3.0, 7.0).outcome, Sign::Negative);
    }

    #[test]
    fn double_double_settles_moderate_cancellation() {
        let eval = run(0.1, 3.0, 0.3);
        assert_eq!(eval.outcome, Sign::Positive);
        let expected = if cfg!(feature = "extended-precision") {
            Stage::Extended
        } else {
            Stage::Exact
        };
        assert_eq!(eval.stage, expected);
    }

    #[test]
    fn tiny_differences_go_exact() {
        // (1 + 2^-52)(1 - 2^-52) - 1 = -2^-104
        let e = f64::EPSILON;
        let eval = run(1.0 + e, 1.0 - e, 1.0);
        assert_eq!(eval.outcome, Sign::Negative);
        assert_eq!(eval.stage, Stage::Exact);
    }

    #[test]
    fn exact_zeros_are_perturbed() {
        let eval = run(2.0, 3.0, 6.0);
        assert_eq!(eval.outcome, Sign::Positive);
        assert_eq!(eval.stage, Stage::Symbolic);

        // Certified zero straight out of triage.
        let eval = run(0.0, 3.0, 0.0);
        assert_eq!(eval.stage, Stage::Symbolic);
    }

    #[test]
    fn gamma_grows_with_depth() {
        let u = f64::EPSILON / 2.0;
        assert!(gamma(3, u) > 3.0 * u);
        assert!(ErrorBound::new(7).coefficient(u) > ErrorBound::new(5).coefficient(u));
        assert_eq!(ErrorBound::new(5).coefficient(u), gamma(7, u));
    }
}
