use crate::cascade::{ErrorBound, Predicate, Real, Verdict, evaluate};
use crate::exact_float::ExactFloat;

use super::radical::{SqrtSumDepths, sign_of_sqrt_sum};
use super::sign::sign;
use super::{Point, Sign};

/// Components of `x0 × x1`.
const EDGE_NORMAL: ErrorBound = ErrorBound::new(2);

/// Squared norms (depth 3) weight the determinants `(x0 × x1) · (a × b)`
/// (depth 7).
const CIRCUMCENTER_TERMS: SqrtSumDepths = SqrtSumDepths {
    radicand: 3,
    coefficient: 7,
};

/// Side of the great circle through `x0x1` on which the circumcenter of
/// `abc` lies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCircumcenter {
    pub x0: Point,
    pub x1: Point,
    pub a: Point,
    pub b: Point,
    pub c: Point,
    /// Orientation of `abc`, which fixes which of the two antipodal
    /// circumcenters is meant.
    pub abc_sign: Sign,
}

impl EdgeCircumcenter {
    fn sorted_sites(&self) -> [Point; 3] {
        let mut sites = [self.a, self.b, self.c];
        sites.sort_by(Point::lex_cmp);
        sites
    }
}

impl Predicate for EdgeCircumcenter {
    type Output = Sign;
    const NAME: &'static str = "edge_circumcenter_sign";

    fn eval<T: Real>(&self) -> Option<Verdict<Sign>> {
        let (x0, x1) = (self.x0.cast::<T>(), self.x1.cast::<T>());
        let (a, b, c) = (self.a.cast::<T>(), self.b.cast::<T>(), self.c.cast::<T>());
        let nx = x0.cross(&x1);
        let normal_signs = [&nx.x, &nx.y, &nx.z].map(|v| v.certain_sign(EDGE_NORMAL));
        if normal_signs.iter().all(|s| *s == Some(Sign::Zero)) {
            // x0 and x1 are linearly dependent.
            return Some(Verdict::Decided(Sign::Zero));
        }

        // The circumcenter is |c| (a × b) + |a| (b × c) + |b| (c × a) when
        // abc is counter-clockwise.
        let dab = nx.dot(&a.cross(&b));
        let dbc = nx.dot(&b.cross(&c));
        let dca = nx.dot(&c.cross(&a));
        let terms = [(c.norm2(), dab), (a.norm2(), dbc), (b.norm2(), dca)];
        let raw = sign_of_sqrt_sum(terms, CIRCUMCENTER_TERMS)?;
        Some(Verdict::nonzero(raw * self.abc_sign))
    }

    /// Each site sits on an infinitesimal pedestal, higher for sites that
    /// sort first, as in [`compare_distances_perturbed`]. The circumcenter
    /// `z` solves `ŝ_i · z = 1` for the unit sites, and the pedestals raise
    /// the right-hand side to `1 + ε_i` with `ε_0 ≫ ε_1 ≫ ε_2`. Moving by
    /// `ε_i` adds `ε_i (ŝ_j × ŝ_k) / det[ŝ_0, ŝ_1, ŝ_2]`, so the first of
    /// `N · (s_j × s_k)` that is nonzero, signed by `det[s_0, s_1, s_2]`,
    /// gives the side. None of this needs the site norms.
    ///
    /// When the sites share a great circle the circumcenters are 90 degrees
    /// away from all of them; the first sorted site off the edge's circle
    /// decides instead.
    ///
    /// [`compare_distances_perturbed`]: crate::compare_distances_perturbed
    fn symbolic(&self) -> Sign {
        let [s0, s1, s2] = self.sorted_sites().map(|site| site.cast::<ExactFloat>());
        let nx = self.x0.cast::<ExactFloat>().cross(&self.x1.cast());
        let det = Sign::from_i32(s0.dot(&s1.cross(&s2)).sgn());
        let moved = if det.is_zero() {
            None
        } else {
            [(&s1, &s2), (&s2, &s0), (&s0, &s1)]
                .into_iter()
                .map(|(sj, sk)| Sign::from_i32(nx.dot(&sj.cross(sk)).sgn()))
                .find(|s| !s.is_zero())
                .map(|side| side * det)
        };
        let result = moved
            .or_else(|| {
                [&s0, &s1, &s2]
                    .into_iter()
                    .map(|site| Sign::from_i32(nx.dot(site).sgn()))
                    .find(|s| !s.is_zero())
            })
            .or_else(|| {
                self.sorted_sites()
                    .iter()
                    .map(|site| sign(&self.x0, &self.x1, site))
                    .find(|s| !s.is_zero())
            });
        match result {
            Some(side) => side,
            None => panic!("edge_circumcenter_sign: symbolic perturbation left a zero"),
        }
    }
}

/// Returns the side of the great circle through `x0` and `x1` on which the
/// circumcenter of triangle `abc` lies: positive means the circumcenter is to
/// the left of `x0x1`, i.e. `sign(x0, x1, z) > 0` for the circumcenter `z`.
///
/// Of the two antipodal circumcenters, the one that `abc` winds around
/// counter-clockwise is used, so the order of the sites does not matter.
/// The result is zero only if `x0` and `x1` are linearly dependent or two of
/// the sites coincide.
pub fn edge_circumcenter_sign(x0: &Point, x1: &Point, a: &Point, b: &Point, c: &Point) -> Sign {
    if x0 == x1 || a == b || b == c || c == a {
        return Sign::Zero;
    }
    let abc_sign = sign(a, b, c);
    evaluate(&EdgeCircumcenter {
        x0: *x0,
        x1: *x1,
        a: *a,
        b: *b,
        c: *c,
        abc_sign,
    })
    .outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::Stage;
    use crate::geometry::compare_distances_perturbed;
    use std::cmp::Ordering;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn circumcenter_near_the_pole() {
        // A small triangle around the north pole; its circumcenter is the
        // pole itself, left of the equator edge from longitude 0 to 90.
        let x0 = p(1.0, 0.0, 0.0);
        let x1 = p(0.0, 1.0, 0.0);
        let a = p(0.1, 0.0, 1.0);
        let b = p(0.0, 0.1, 1.0);
        let c = p(-0.1, 0.0, 1.0);
        assert_eq!(edge_circumcenter_sign(&x0, &x1, &a, &b, &c), Sign::Positive);
        assert_eq!(edge_circumcenter_sign(&x1, &x0, &a, &b, &c), Sign::Negative);
        // Swapping sites does not move the circumcenter.
        assert_eq!(edge_circumcenter_sign(&x0, &x1, &b, &a, &c), Sign::Positive);
    }

    #[test]
    fn degenerate_arguments() {
        let x0 = p(1.0, 0.0, 0.0);
        let a = p(0.1, 0.0, 1.0);
        let b = p(0.0, 0.1, 1.0);
        let c = p(-0.1, 0.0, 1.0);
        assert_eq!(edge_circumcenter_sign(&x0, &x0, &a, &b, &c), Sign::Zero);
        assert_eq!(edge_circumcenter_sign(&x0, &p(0.0, 1.0, 0.0), &a, &a, &c), Sign::Zero);
        assert_eq!(edge_circumcenter_sign(&x0, &(-x0), &a, &b, &c), Sign::Zero);
        assert_eq!(edge_circumcenter_sign(&x0, &p(2.0, 0.0, 0.0), &a, &b, &c), Sign::Zero);
    }

    #[test]
    fn circumcenter_on_the_edge_line_is_perturbed() {
        // Symmetric about the plane y = 0, so the circumcenter lies on the
        // great circle through x0 = (1,0,0) and x1 = (0,0,1).
        let x0 = p(1.0, 0.0, 0.0);
        let x1 = p(0.0, 0.0, 1.0);
        let a = p(1.0, 1.0, 1.0);
        let b = p(1.0, -1.0, 1.0);
        let c = p(1.0, 0.0, 3.0);
        let abc_sign = sign(&a, &b, &c);
        let eval = evaluate(&EdgeCircumcenter {
            x0,
            x1,
            a,
            b,
            c,
            abc_sign,
        });
        assert_eq!(eval.stage, Stage::Symbolic);
        // b sorts first and counts as farther, so the circumcenter moves
        // towards it: into y < 0, which is left of x0x1.
        assert_eq!(eval.outcome, Sign::Positive);
        assert_eq!(edge_circumcenter_sign(&x0, &x1, &c, &a, &b), Sign::Positive);
        assert_eq!(edge_circumcenter_sign(&x1, &x0, &a, &b, &c), Sign::Negative);
    }

    #[test]
    fn sites_sort_lexicographically() {
        let site = EdgeCircumcenter {
            x0: p(1.0, 0.0, 0.0),
            x1: p(0.0, 1.0, 0.0),
            a: p(1.0, 0.0, 0.0),
            b: p(0.0, 5.0, 0.0),
            c: p(0.0, 1.0, 9.0),
            abc_sign: Sign::Positive,
        };
        let sorted = site.sorted_sites();
        assert!(sorted.windows(2).all(|w| w[0].lex_cmp(&w[1]) == Ordering::Less));
    }

    #[test]
    fn perturbed_circumcenter_follows_the_farther_site() {
        // The circumcenter of abc is exactly the pole, which lies on the
        // great circle through x0 and x1.
        let x0 = p(1.0, 0.0, 0.0);
        let x1 = p(0.0, 0.0, 1.0);
        let a = p(-4.0, 3.0, 5.0);
        let b = p(4.0, 3.0, 5.0);
        let c = p(3.0, 4.0, 5.0);
        let pole = p(0.0, 0.0, 1.0);
        assert_eq!(compare_distances_perturbed(&pole, &a, &b), Ordering::Greater);
        assert_eq!(compare_distances_perturbed(&pole, &a, &c), Ordering::Greater);

        let abc_sign = sign(&a, &b, &c);
        let eval = evaluate(&EdgeCircumcenter {
            x0,
            x1,
            a,
            b,
            c,
            abc_sign,
        });
        assert_eq!(eval.stage, Stage::Symbolic);
        assert_eq!(eval.outcome, Sign::Positive);

        // Actually moving a away from the pole agrees.
        for eps in [1.0e-6, 1.0e-9, 1.0e-12] {
            let moved = p(-4.0, 3.0, 5.0 - eps);
            assert_eq!(edge_circumcenter_sign(&x0, &x1, &moved, &b, &c), Sign::Positive);
        }
        assert_eq!(edge_circumcenter_sign(&x1, &x0, &c, &a, &b), Sign::Negative);
    }

    #[test]
    fn sites_on_one_great_circle_fall_back_to_their_sides() {
        // Three equator sites: the circumcenters are the poles, and both lie
        // on the meridian through x0 and x1.
        let x0 = p(1.0, 0.0, 0.0);
        let x1 = p(0.0, 0.0, 1.0);
        let a = p(1.0, 1.0, 0.0);
        let b = p(-1.0, 2.0, 0.0);
        let c = p(1.0, -3.0, 0.0);
        // (x0 × x1) · b = -2 for the smallest site b.
        assert_eq!(edge_circumcenter_sign(&x0, &x1, &a, &b, &c), Sign::Negative);
    }
}
