//! Signs of expressions with square roots, decided without taking any.
//!
//! Each helper squares its way down to polynomial comparisons, tracking the
//! depth of every intermediate so triage can certify the result.

use crate::cascade::{ErrorBound, Real};

use super::Sign;

/// Depths of the inputs of [`sign_of_root_difference`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct RootDifferenceDepths {
    pub rational: u32,
    pub coefficient: u32,
    pub radicand: u32,
}

impl RootDifferenceDepths {
    /// Depth of `x² - w² z`.
    pub const fn squared_difference(self) -> u32 {
        let x2 = 2 * self.rational + 1;
        let w2z = 2 * self.coefficient + 1 + self.radicand + 1;
        if x2 > w2z { x2 + 1 } else { w2z + 1 }
    }
}

/// Depths of the inputs of [`sign_of_sqrt_sum`]: every radicand and every
/// coefficient shares one bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SqrtSumDepths {
    pub radicand: u32,
    pub coefficient: u32,
}

impl SqrtSumDepths {
    /// `p2 q2² - p3 q3²`
    const fn pair_difference(self) -> u32 {
        2 * self.coefficient + self.radicand + 3
    }

    /// Inputs of the final root difference: `X = p1 q1² - p2 q2² - p3 q3²`,
    /// `W = 2 q2 q3` and `Z = p2 p3`.
    const fn root_difference(self) -> RootDifferenceDepths {
        RootDifferenceDepths {
            rational: 2 * self.coefficient + self.radicand + 4,
            coefficient: 2 * self.coefficient + 2,
            radicand: 2 * self.radicand + 1,
        }
    }
}

/// Sign of `x - w √z` for `z >= 0`.
pub(crate) fn sign_of_root_difference<T: Real>(
    x: &T,
    w: &T,
    z: &T,
    depths: RootDifferenceDepths,
) -> Option<Sign> {
    let x_sign = x.certain_sign(ErrorBound::new(depths.rational))?;
    let root_term = match z.certain_sign(ErrorBound::new(depths.radicand))? {
        Sign::Zero => Sign::Zero,
        _ => w.certain_sign(ErrorBound::new(depths.coefficient))?,
    };
    if root_term == Sign::Zero {
        return Some(x_sign);
    }
    if x_sign == Sign::Zero {
        return Some(-root_term);
    }
    if x_sign == -root_term {
        return Some(x_sign);
    }
    // Same sign on both sides: compare the squares.
    let cmp = x.clone() * x.clone() - w.clone() * w.clone() * z.clone();
    let cmp_sign = cmp.certain_sign(ErrorBound::new(depths.squared_difference()))?;
    Some(x_sign * cmp_sign)
}

/// Sign of `q √p` for `p >= 0`.
fn radical_sign<T: Real>(p: &T, q: &T, depths: SqrtSumDepths) -> Option<Sign> {
    match p.certain_sign(ErrorBound::new(depths.radicand))? {
        Sign::Zero => Some(Sign::Zero),
        _ => q.certain_sign(ErrorBound::new(depths.coefficient)),
    }
}

/// Sign of `q1 √p1 + q2 √p2 + q3 √p3`, each given as `(p, q)` with `p >= 0`.
pub(crate) fn sign_of_sqrt_sum<T: Real>(terms: [(T, T); 3], depths: SqrtSumDepths) -> Option<Sign> {
    let [(p1, q1), (p2, q2), (p3, q3)] = terms;
    let lhs = radical_sign(&p1, &q1, depths)?;

    let s2 = radical_sign(&p2, &q2, depths)?;
    let s3 = radical_sign(&p3, &q3, depths)?;
    let pair = if s2 == Sign::Zero || s2 == s3 {
        s3
    } else if s3 == Sign::Zero {
        s2
    } else {
        let cmp = p2.clone() * (q2.clone() * q2.clone()) - p3.clone() * (q3.clone() * q3.clone());
        s2 * cmp.certain_sign(ErrorBound::new(depths.pair_difference()))?
    };

    // Sign of lhs - rhs with rhs = -(q2 √p2 + q3 √p3).
    let rhs = -pair;
    if lhs != rhs {
        return Some(if lhs > rhs {
            Sign::Positive
        } else {
            Sign::Negative
        });
    }
    if lhs == Sign::Zero {
        return Some(Sign::Zero);
    }

    // Both sides share a sign: compare |lhs|² = p1 q1² against
    // |rhs|² = p2 q2² + p3 q3² + 2 q2 q3 √(p2 p3).
    let rd = depths.root_difference();
    let x = p1 * (q1.clone() * q1)
        - p2.clone() * (q2.clone() * q2.clone())
        - p3.clone() * (q3.clone() * q3.clone());
    let w = T::from_f64(2.0) * q2 * q3;
    let z = p2 * p3;
    Some(lhs * sign_of_root_difference(&x, &w, &z, rd)?)
}
