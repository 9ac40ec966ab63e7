//! Voronoi site exclusion along an edge.
//!
//! Project both sites onto the great circle through the edge. Within radius
//! `r`, site `s` covers an interval of that circle centred on its projection,
//! with half-width `w` given by `cos r = cos d · cos w` where `d` is the
//! distance from `s` to the circle. A site whose interval lies inside the
//! other's can never be the closest site to a covered point of the edge, and
//! is excluded.
//!
//! With `N = x0 × x1`, `D = (a × b) · N` (proportional to the sine of the
//! angle between the projections) and
//!
//! ```text
//! P = |a|² (|N|² sin²r |b|² - (b·N)²)
//! Q = |b|² (|N|² sin²r |a|² - (a·N)²)
//! ```
//!
//! (proportional to the squares of `sin w · cos d` for `b` and `a`), the
//! interval of `a` lies inside that of `b` iff `|D| <= cos r (√P - √Q)`.
//! Squaring gives the sign of `cos²r (P + Q) - D² - 2 cos²r √(PQ)`.

use std::cmp::Ordering;

use crate::cascade::{ErrorBound, Predicate, Real, Verdict, evaluate};
use crate::exact_float::ExactFloat;

use super::distance::compare_distances_perturbed;
use super::radical::{RootDifferenceDepths, sign_of_root_difference};
use super::{Excluded, Point, Sign};

/// `(a·b) |N|² - (a·N)(b·N)`: the projections are less than 90 degrees
/// apart iff it is positive.
const PROJECTION_COS: ErrorBound = ErrorBound::new(12);

/// `|b|² (a·N)² - |a|² (b·N)²`: which site is farther from the circle.
const LINE_DISTANCE_CMP: ErrorBound = ErrorBound::new(16);

/// `(a × b) · N`
const PROJECTION_SIN: ErrorBound = ErrorBound::new(7);

/// `X = cos²r (P + Q) - D²` (28), `W = 2 cos²r` (6), `Z = P Q` (41).
const CONTAINMENT: RootDifferenceDepths = RootDifferenceDepths {
    rational: 28,
    coefficient: 6,
    radicand: 41,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Decided(Excluded),
    /// The intervals share an endpoint (or coincide); the given site would
    /// be excluded if its interval shrank.
    Tie(Excluded),
}

/// Exclusion test for sites `a`, `b` on edge `x0x1`, once `a` is known to be
/// closer to `x0` and `b` closer to `x1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiExclusion {
    pub a: Point,
    pub b: Point,
    pub x0: Point,
    pub x1: Point,
    pub r2: f64,
}

impl VoronoiExclusion {
    fn resolve<T: Real>(&self) -> Option<Resolution> {
        let (a, b) = (self.a.cast::<T>(), self.b.cast::<T>());
        let n = self.x0.cast::<T>().cross(&self.x1.cast());
        let an = a.dot(&n);
        let bn = b.dot(&n);
        let a2 = a.norm2();
        let b2 = b.norm2();
        let n2 = n.norm2();

        let projection_cos = a.dot(&b) * n2.clone() - an.clone() * bn.clone();
        if projection_cos.certain_sign(PROJECTION_COS)? != Sign::Positive {
            return Some(Resolution::Decided(Excluded::Neither));
        }

        // The site farther from the circle has the shorter interval.
        let line_cmp =
            b2.clone() * (an.clone() * an.clone()) - a2.clone() * (bn.clone() * bn.clone());
        let d = a.cross(&b).dot(&n);
        let candidate = match line_cmp.certain_sign(LINE_DISTANCE_CMP)? {
            Sign::Positive => Excluded::First,
            Sign::Negative => Excluded::Second,
            Sign::Zero => {
                // Equal widths: only identical intervals contain each other.
                return Some(match d.certain_sign(PROJECTION_SIN)? {
                    Sign::Zero => Resolution::Tie(match self.a.lex_cmp(&self.b) {
                        Ordering::Greater => Excluded::Second,
                        _ => Excluded::First,
                    }),
                    _ => Resolution::Decided(Excluded::Neither),
                });
            }
        };

        let r2 = T::from_f64(self.r2);
        let sin2_r = r2.clone() * (T::from_f64(1.0) - T::from_f64(0.25) * r2.clone());
        let cos_r = T::from_f64(1.0) - T::from_f64(0.5) * r2;
        let cos2_r = cos_r.clone() * cos_r;
        let p = a2.clone() * (n2.clone() * sin2_r.clone() * b2.clone() - bn.clone() * bn);
        let q = b2 * (n2 * sin2_r * a2 - an.clone() * an);
        let x = cos2_r.clone() * (p.clone() + q.clone()) - d.clone() * d;
        let w = T::from_f64(2.0) * cos2_r;
        let z = p * q;
        Some(match sign_of_root_difference(&x, &w, &z, CONTAINMENT)? {
            Sign::Positive => Resolution::Decided(candidate),
            Sign::Negative => Resolution::Decided(Excluded::Neither),
            Sign::Zero => Resolution::Tie(candidate),
        })
    }
}

impl Predicate for VoronoiExclusion {
    type Output = Excluded;
    const NAME: &'static str = "voronoi_site_exclusion";

    fn eval<T: Real>(&self) -> Option<Verdict<Excluded>> {
        Some(match self.resolve::<T>()? {
            Resolution::Decided(excluded) => Verdict::Decided(excluded),
            Resolution::Tie(_) => Verdict::Degenerate,
        })
    }

    /// The lexicographically smaller site is farther after perturbation, so
    /// its interval shrinks: a tied candidate is excluded iff it sorts
    /// first.
    fn symbolic(&self) -> Excluded {
        let candidate = match self.resolve::<ExactFloat>() {
            Some(Resolution::Tie(candidate)) => candidate,
            other => panic!("voronoi_site_exclusion: no tie to perturb, got {other:?}"),
        };
        let (site, other) = match candidate {
            Excluded::First => (&self.a, &self.b),
            Excluded::Second => (&self.b, &self.a),
            Excluded::Neither => return Excluded::Neither,
        };
        if site.lex_cmp(other) == Ordering::Less {
            candidate
        } else {
            Excluded::Neither
        }
    }
}

/// Given sites `a` and `b` within distance `r` of edge `x0x1`, with `a`
/// closer to `x0` than `b`, decides whether one of them can be dropped from
/// the edge's Voronoi diagram: `First` if `a` is never the closest site to
/// a point of the edge within `r`, `Second` likewise for `b`.
///
/// `r2` is the squared chord length of `r` and must be below 2 (90 degrees).
pub fn voronoi_site_exclusion(a: &Point, b: &Point, x0: &Point, x1: &Point, r2: f64) -> Excluded {
    debug_assert!(r2 < 2.0, "coverage radius must be below 90 degrees");
    debug_assert_eq!(compare_distances_perturbed(x0, a, b), Ordering::Less);

    // a is closer at both ends, so it is closer everywhere along the edge.
    if compare_distances_perturbed(x1, a, b) == Ordering::Less {
        return Excluded::Second;
    }
    evaluate(&VoronoiExclusion {
        a: *a,
        b: *b,
        x0: *x0,
        x1: *x1,
        r2,
    })
    .outcome
}
