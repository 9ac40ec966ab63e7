use std::cmp::Ordering;

use crate::cascade::{ErrorBound, Predicate, Real, Verdict, evaluate};
use crate::expansion::two_sum;

use super::{Point, Sign, Vector3};

/// Error budgets of [`cos_distance_order`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct CosineBounds {
    /// `x · a` and `x · b`.
    pub cosine: ErrorBound,
    /// `(x·b)² |a|² - (x·a)² |b|²`.
    pub cmp: ErrorBound,
}

/// Leaf points: dot products have depth 3, and the comparison squares one
/// (7), multiplies by a norm (11) and subtracts (12).
const LEAF_COSINES: CosineBounds = CosineBounds {
    cosine: ErrorBound::new(3),
    cmp: ErrorBound::new(12),
};

/// `cos(r) = 1 - r2/2` has depth 2; the comparison
/// `cos(r)² |x|² |y|² - (x·y)²` has depth 14.
const COS_RADIUS: ErrorBound = ErrorBound::new(2);
const RADIUS_CMP: ErrorBound = ErrorBound::new(14);

const DOT: ErrorBound = ErrorBound::new(3);

/// `|(x-a)×(x+a)|² |b|² - |(x-b)×(x+b)|² |a|²`: the cross products have
/// depth 3 and their squared norms depth 9.
const SIN2_CMP: ErrorBound = ErrorBound::new(14);

/// `|(x-y)×(x+y)|² - 4 sin²(r) |x|² |y|²`
const SIN2_RADIUS_CMP: ErrorBound = ErrorBound::new(13);

/// Squared chord length of 45 degrees.
const SIN2_RADIUS_LIMIT: f64 = 2.0 - std::f64::consts::SQRT_2;

/// Whether `y` is within 45 degrees of `x` or of `-x`, where `sin²` is the
/// better conditioned measure of the angle between them.
fn nearly_parallel(x: &Point, y: &Point) -> bool {
    let cos_xy = x.dot(y);
    cos_xy * cos_xy > 0.5 * x.norm2() * y.norm2()
}

/// `(x - y) × (x + y) = 2 (x × y)`. The short factor (`x - y` for nearby
/// points, `x + y` for nearly antipodal ones) is computed in f64 and must be
/// exact, so the error bound scales with its length rather than with `x`.
fn chord_cross<T: Real>(x: &Point, y: &Point) -> Option<Vector3<T>> {
    let near = x.dot(y) >= 0.0;
    let exact = |u: f64, v: f64| {
        let (sum, err) = if near { two_sum(u, -v) } else { two_sum(u, v) };
        (err == 0.0).then_some(sum)
    };
    let short = Point::new(exact(x.x, y.x)?, exact(x.y, y.y)?, exact(x.z, y.z)?).cast::<T>();
    let long = if near {
        x.cast::<T>() + y.cast()
    } else {
        x.cast::<T>() - y.cast()
    };
    Some(short.cross(&long))
}

/// Compares the angles `XA` and `XB` through their cosines, without taking
/// square roots. `Less` means `a` is closer to `x`.
pub(crate) fn cos_distance_order<T: Real>(
    x: &Vector3<T>,
    a: &Vector3<T>,
    b: &Vector3<T>,
    bounds: CosineBounds,
) -> Option<Ordering> {
    let cos_ax = x.dot(a);
    let cos_bx = x.dot(b);
    let a_sign = cos_ax.certain_sign(bounds.cosine)?;
    let b_sign = cos_bx.certain_sign(bounds.cosine)?;
    if a_sign != b_sign {
        // The larger cosine is the smaller angle.
        return Some(if a_sign > b_sign {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    if a_sign == Sign::Zero {
        return Some(Ordering::Equal);
    }
    let cmp = cos_bx.clone() * cos_bx * a.norm2() - cos_ax.clone() * cos_ax * b.norm2();
    let cmp_sign = cmp.certain_sign(bounds.cmp)?;
    Some((a_sign * cmp_sign).to_ordering())
}

/// Compares `XA` and `XB` through `sin²`, for angles too close to 0 or 180
/// degrees for [`cos_distance_order`] to separate. Both angles must lie on
/// the same side of 90 degrees.
fn sin2_distance_order<T: Real>(x: &Point, a: &Point, b: &Point) -> Option<Ordering> {
    let (xt, at, bt) = (x.cast::<T>(), a.cast::<T>(), b.cast::<T>());
    let a_sign = xt.dot(&at).certain_sign(DOT)?;
    if a_sign == Sign::Zero || xt.dot(&bt).certain_sign(DOT)? != a_sign {
        return None;
    }
    let sin2_a = chord_cross::<T>(x, a)?.norm2();
    let sin2_b = chord_cross::<T>(x, b)?.norm2();
    // Beyond 90 degrees sin² falls as the angle grows.
    let cmp = sin2_a * bt.norm2() - sin2_b * at.norm2();
    Some((a_sign * cmp.certain_sign(SIN2_CMP)?).to_ordering())
}

/// Compares the angle `XY` with the radius whose squared chord length is
/// `r2`.
pub(crate) fn radius_order<T: Real>(x: &Vector3<T>, y: &Vector3<T>, r2: f64) -> Option<Ordering> {
    let cos_xy = x.dot(y);
    let cos_r = T::from_f64(1.0) - T::from_f64(0.5) * T::from_f64(r2);
    let xy_sign = cos_xy.certain_sign(DOT)?;
    let r_sign = cos_r.certain_sign(COS_RADIUS)?;
    if xy_sign != r_sign {
        return Some(if xy_sign > r_sign {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    let cmp = cos_r.clone() * cos_r * x.norm2() * y.norm2() - cos_xy.clone() * cos_xy;
    let cmp_sign = cmp.certain_sign(RADIUS_CMP)?;
    Some((xy_sign * cmp_sign).to_ordering())
}

/// [`radius_order`] through `sin²`, for radii below 45 degrees.
fn sin2_radius_order<T: Real>(x: &Point, y: &Point, r2: f64) -> Option<Ordering> {
    let (xt, yt) = (x.cast::<T>(), y.cast::<T>());
    if xt.dot(&yt).certain_sign(DOT)? != Sign::Positive {
        return None;
    }
    let sin2_xy = chord_cross::<T>(x, y)?.norm2();
    let r2 = T::from_f64(r2);
    let four_sin2_r = T::from_f64(4.0) * r2.clone() * (T::from_f64(1.0) - T::from_f64(0.25) * r2);
    let cmp = sin2_xy - four_sin2_r * (xt.norm2() * yt.norm2());
    Some(cmp.certain_sign(SIN2_RADIUS_CMP)?.to_ordering())
}

/// Which of `a` and `b` is closer to `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceComparison {
    pub x: Point,
    pub a: Point,
    pub b: Point,
    /// Break exact ties between distinct sites symbolically.
    pub perturbed: bool,
}

impl Predicate for DistanceComparison {
    type Output = Ordering;
    const NAME: &'static str = "compare_distances";

    fn eval<T: Real>(&self) -> Option<Verdict<Ordering>> {
        if self.a == self.b {
            return Some(Verdict::Decided(Ordering::Equal));
        }
        let cosines = cos_distance_order(
            &self.x.cast::<T>(),
            &self.a.cast(),
            &self.b.cast(),
            LEAF_COSINES,
        );
        let order = match cosines {
            Some(order) => order,
            None if nearly_parallel(&self.x, &self.a) => {
                sin2_distance_order::<T>(&self.x, &self.a, &self.b)?
            }
            None => return None,
        };
        Some(match order {
            Ordering::Equal if self.perturbed => Verdict::Degenerate,
            order => Verdict::Decided(order),
        })
    }

    /// Each site sits on an infinitesimal pedestal, higher for sites that
    /// sort first, so of two equidistant sites the smaller one is farther.
    fn symbolic(&self) -> Ordering {
        self.b.lex_cmp(&self.a)
    }
}

/// Angle `XY` against the radius with squared chord length `r2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusComparison {
    pub x: Point,
    pub y: Point,
    pub r2: f64,
}

impl Predicate for RadiusComparison {
    type Output = Ordering;
    const NAME: &'static str = "compare_distance";

    fn eval<T: Real>(&self) -> Option<Verdict<Ordering>> {
        let order = match radius_order(&self.x.cast::<T>(), &self.y.cast(), self.r2) {
            Some(order) => order,
            None if self.r2 < SIN2_RADIUS_LIMIT => {
                sin2_radius_order::<T>(&self.x, &self.y, self.r2)?
            }
            None => return None,
        };
        Some(Verdict::Decided(order))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotProductSign {
    pub a: Point,
    pub b: Point,
}

impl Predicate for DotProductSign {
    type Output = Sign;
    const NAME: &'static str = "sign_dot_prod";
    const EXTENDED: bool = false;

    fn eval<T: Real>(&self) -> Option<Verdict<Sign>> {
        self.a
            .cast::<T>()
            .dot(&self.b.cast())
            .certain_sign(DOT)
            .map(Verdict::Decided)
    }
}

/// Compares the angles `XA` and `XB`: `Less` if `a` is closer to `x`.
///
/// Points need not be unit length; only their directions matter. Exact ties
/// return `Equal`. See [`compare_distances_perturbed`] for a total order.
pub fn compare_distances(x: &Point, a: &Point, b: &Point) -> Ordering {
    evaluate(&DistanceComparison {
        x: *x,
        a: *a,
        b: *b,
        perturbed: false,
    })
    .outcome
}

/// Like [`compare_distances`], but exact ties between distinct sites are
/// broken symbolically: of two equidistant sites the lexicographically
/// smaller one counts as farther. `Equal` is returned only when `a == b`.
pub fn compare_distances_perturbed(x: &Point, a: &Point, b: &Point) -> Ordering {
    evaluate(&DistanceComparison {
        x: *x,
        a: *a,
        b: *b,
        perturbed: true,
    })
    .outcome
}

/// Compares the angle `XY` against a radius given as its squared chord
/// length `r2` (`4 sin²(r/2)`, in `[0, 4]`). `Less` means `y` lies strictly
/// within the radius.
pub fn compare_distance(x: &Point, y: &Point, r2: f64) -> Ordering {
    evaluate(&RadiusComparison {
        x: *x,
        y: *y,
        r2,
    })
    .outcome
}

/// Sign of `a · b`, zero when the vectors are exactly perpendicular.
pub fn sign_dot_prod(a: &Point, b: &Point) -> Sign {
    evaluate(&DotProductSign { a: *a, b: *b }).outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::Stage;
    use crate::exact_float::ExactFloat;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn nearer_site_wins() {
        let x = p(1.0, 0.0, 0.0);
        let near = p(1.0, 0.1, 0.0);
        let far = p(0.0, 1.0, 0.0);
        assert_eq!(compare_distances(&x, &near, &far), Ordering::Less);
        assert_eq!(compare_distances(&x, &far, &near), Ordering::Greater);
        // Beyond 90 degrees the cosines change sign.
        let behind = p(-1.0, 0.1, 0.0);
        assert_eq!(compare_distances(&x, &far, &behind), Ordering::Less);
        assert_eq!(compare_distances(&x, &behind, &behind), Ordering::Equal);
    }

    #[test]
    fn length_does_not_matter() {
        let x = p(0.6, 0.8, 0.0);
        let a = p(1.0, 2.0, 3.0);
        let long_a = p(4.0, 8.0, 12.0);
        assert_eq!(compare_distances(&x, &a, &long_a), Ordering::Equal);
        assert_ne!(compare_distances_perturbed(&x, &a, &long_a), Ordering::Equal);
    }

    #[test]
    fn perturbed_ties_prefer_the_larger_site() {
        let x = p(0.0, 0.0, 1.0);
        let a = p(1.0, 0.0, 0.0);
        let b = p(0.0, 1.0, 0.0);
        let eval = evaluate(&DistanceComparison {
            x,
            a,
            b,
            perturbed: true,
        });
        // b sorts first, so it is the farther one.
        assert_eq!(eval.stage, Stage::Symbolic);
        assert_eq!(eval.outcome, Ordering::Less);
        assert_eq!(compare_distances_perturbed(&x, &b, &a), Ordering::Greater);
        assert_eq!(compare_distances(&x, &a, &b), Ordering::Equal);
    }

    #[test]
    fn radius_comparison() {
        let x = p(1.0, 0.0, 0.0);
        let y = p(0.0, 1.0, 0.0);
        // 90 degrees is a squared chord of 2.
        assert_eq!(compare_distance(&x, &y, 2.0), Ordering::Equal);
        assert_eq!(compare_distance(&x, &y, 1.9), Ordering::Greater);
        assert_eq!(compare_distance(&x, &y, 2.1), Ordering::Less);
        assert_eq!(compare_distance(&x, &x, 0.0), Ordering::Equal);
        assert_eq!(compare_distance(&x, &(-x), 4.0), Ordering::Equal);
        // 45 degrees against radii of about 41.4 and 45.6 degrees.
        let diagonal = p(1.0, 1.0, 0.0);
        assert_eq!(compare_distance(&x, &diagonal, 0.5), Ordering::Greater);
        assert_eq!(compare_distance(&x, &diagonal, 0.6), Ordering::Less);
    }

    #[test]
    fn dot_product_signs() {
        let x = p(1.0, 0.0, 0.0);
        assert_eq!(sign_dot_prod(&x, &p(0.0, 1.0, 0.0)), Sign::Zero);
        assert_eq!(sign_dot_prod(&x, &p(1.0e-300, 1.0, 0.0)), Sign::Positive);
        assert_eq!(sign_dot_prod(&x, &p(-0.5, 1.0, 0.0)), Sign::Negative);
        let eval = evaluate(&DotProductSign {
            a: p(0.1, 0.2, 0.3),
            b: p(0.3, -0.2, 0.1),
        });
        assert_eq!(eval.outcome, Sign::Positive);
        assert_eq!(eval.stage, Stage::Triage);
    }

    #[test]
    fn nearby_sites_settle_in_triage() {
        // |a|² and |b|² both round to 1, which hides the difference from the
        // cosines.
        let x = p(1.0, 0.0, 0.0);
        let a = p(1.0, 1.0e-9, 0.0);
        let b = p(1.0, 2.0e-9, 0.0);
        let eval = evaluate(&DistanceComparison {
            x,
            a,
            b,
            perturbed: false,
        });
        assert_eq!(eval.stage, Stage::Triage);
        assert_eq!(eval.outcome, Ordering::Less);
        assert_eq!(compare_distances(&x, &b, &a), Ordering::Greater);

        // Near the antipode the closer site to -x is the farther one.
        let far_a = p(-1.0, 1.0e-9, 0.0);
        let far_b = p(-1.0, 2.0e-9, 0.0);
        let eval = evaluate(&DistanceComparison {
            x,
            a: far_a,
            b: far_b,
            perturbed: false,
        });
        assert_eq!(eval.stage, Stage::Triage);
        assert_eq!(eval.outcome, Ordering::Greater);
    }

    #[test]
    fn small_radii_settle_in_triage() {
        let x = p(1.0, 0.0, 0.0);
        let y = p(1.0, 1.0e-9, 0.0);
        // XY is about 1e-9, a squared chord of about 1e-18.
        for (r2, expected) in [(2.25e-18, Ordering::Less), (0.81e-18, Ordering::Greater)] {
            let eval = evaluate(&RadiusComparison { x, y, r2 });
            assert_eq!(eval.stage, Stage::Triage, "r2 = {r2}");
            assert_eq!(eval.outcome, expected, "r2 = {r2}");
        }
    }

    #[test]
    fn inexact_chords_skip_the_sine_form() {
        // 1 - 0.1 is not representable, so only the cosines can answer.
        let x = p(1.0, 0.0, 0.0);
        let y = p(0.1, 1.0, 0.0);
        assert!(chord_cross::<ExactFloat>(&x, &y).is_none());
        assert!(chord_cross::<ExactFloat>(&x, &p(1.0, 0.5, 0.0)).is_some());
        assert!(nearly_parallel(&x, &p(-1.0, 0.5, 0.0)));
        assert!(!nearly_parallel(&x, &y));
    }
}
