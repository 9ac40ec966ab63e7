use std::cmp::Ordering;

use crate::cascade::{ErrorBound, Predicate, Real, Verdict, evaluate};

use super::distance::{CosineBounds, cos_distance_order, radius_order};
use super::{Point, Sign, Vector3};

/// `n · (a0 × x)` with `n = a0 × a1`: two cross products (depth 2) combined
/// by a dot product.
const EDGE_SIDE: ErrorBound = ErrorBound::new(7);

/// `(x·n)² - sin²(r) |x|² |n|²`: `x·n` has depth 5, `sin²(r)` depth 3 and
/// `|n|²` depth 7.
const LINE_CMP: ErrorBound = ErrorBound::new(16);

const EDGE_DIRECTIONS: ErrorBound = ErrorBound::new(7);

/// `|b·n| (a·x) + |a·n| (b·x)`
const CROSSING_SIDE: ErrorBound = ErrorBound::new(8);

/// Crossing points `|b·n| a + |a·n| b` have depth 5, so the cosines against a
/// leaf reference point have depth 8 and the comparison depth 32.
const CROSSING_COSINES: CosineBounds = CosineBounds {
    cosine: ErrorBound::new(8),
    cmp: ErrorBound::new(32),
};

/// Point on edge `ab` where it crosses the great circle with normal `n`,
/// up to a positive factor.
fn crossing<T: Real>(a: &Vector3<T>, b: &Vector3<T>, n: &Vector3<T>) -> Vector3<T> {
    a.scale(&b.dot(n).abs()) + b.scale(&a.dot(n).abs())
}

/// Distance from `x` to edge `a0a1` against a radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDistance {
    pub x: Point,
    pub a0: Point,
    pub a1: Point,
    pub r2: f64,
}

impl EdgeDistance {
    /// Distance to the closer endpoint. A certain `Less` at either end
    /// settles it.
    fn vertex_order<T: Real>(
        &self,
        x: &Vector3<T>,
        a0: &Vector3<T>,
        a1: &Vector3<T>,
    ) -> Option<Ordering> {
        match (radius_order(x, a0, self.r2), radius_order(x, a1, self.r2)) {
            (Some(Ordering::Less), _) | (_, Some(Ordering::Less)) => Some(Ordering::Less),
            (Some(d0), Some(d1)) => Some(d0.min(d1)),
            _ => None,
        }
    }

    /// Distance to the great circle through the edge, for points whose
    /// closest edge point is interior.
    fn line_order<T: Real>(&self, x: &Vector3<T>, n: &Vector3<T>) -> Option<Ordering> {
        // Any interior distance is at most 90 degrees.
        if self.r2 > 2.0 {
            return Some(Ordering::Less);
        }
        let r2 = T::from_f64(self.r2);
        let sin2_r = r2.clone() * (T::from_f64(1.0) - T::from_f64(0.25) * r2);
        let sin_d = x.dot(n);
        let cmp = sin_d.clone() * sin_d - sin2_r * x.norm2() * n.norm2();
        Some(cmp.certain_sign(LINE_CMP)?.to_ordering())
    }
}

impl Predicate for EdgeDistance {
    type Output = Ordering;
    const NAME: &'static str = "compare_edge_distance";

    fn eval<T: Real>(&self) -> Option<Verdict<Ordering>> {
        let x = self.x.cast::<T>();
        let a0 = self.a0.cast::<T>();
        if self.a0 == self.a1 {
            return radius_order(&x, &a0, self.r2).map(Verdict::Decided);
        }
        let a1 = self.a1.cast::<T>();

        // The closest point is interior iff x projects between a0 and a1.
        let n = a0.cross(&a1);
        let after_a0 = n.dot(&a0.cross(&x)).certain_sign(EDGE_SIDE);
        let before_a1 = n.dot(&x.cross(&a1)).certain_sign(EDGE_SIDE);
        let order = match (after_a0, before_a1) {
            (Some(Sign::Positive), Some(Sign::Positive)) => self.line_order(&x, &n)?,
            (Some(Sign::Negative | Sign::Zero), _) | (_, Some(Sign::Negative | Sign::Zero)) => {
                self.vertex_order(&x, &a0, &a1)?
            }
            _ => return None,
        };
        Some(Verdict::Decided(order))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDirections {
    pub a0: Point,
    pub a1: Point,
    pub b0: Point,
    pub b1: Point,
}

impl Predicate for EdgeDirections {
    type Output = Sign;
    const NAME: &'static str = "compare_edge_directions";

    fn eval<T: Real>(&self) -> Option<Verdict<Sign>> {
        let na = self.a0.cast::<T>().cross(&self.a1.cast());
        let nb = self.b0.cast::<T>().cross(&self.b1.cast());
        na.dot(&nb).certain_sign(EDGE_DIRECTIONS).map(Verdict::Decided)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEdgeIntersection {
    pub a: Point,
    pub b: Point,
    pub n: Point,
    pub x: Point,
}

impl Predicate for CircleEdgeIntersection {
    type Output = Sign;
    const NAME: &'static str = "circle_edge_intersection_sign";

    fn eval<T: Real>(&self) -> Option<Verdict<Sign>> {
        let (a, b) = (self.a.cast::<T>(), self.b.cast::<T>());
        let (n, x) = (self.n.cast::<T>(), self.x.cast::<T>());
        let side = b.dot(&n).abs() * a.dot(&x) + a.dot(&n).abs() * b.dot(&x);
        side.certain_sign(CROSSING_SIDE).map(Verdict::Decided)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionOrdering {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub d: Point,
    pub m: Point,
    pub n: Point,
}

impl Predicate for IntersectionOrdering {
    type Output = Ordering;
    const NAME: &'static str = "intersection_ordering";

    fn eval<T: Real>(&self) -> Option<Verdict<Ordering>> {
        let same_edge =
            (self.a == self.c && self.b == self.d) || (self.a == self.d && self.b == self.c);
        if same_edge {
            return Some(Verdict::Decided(Ordering::Equal));
        }
        let n = self.n.cast::<T>();
        let ab = crossing(&self.a.cast(), &self.b.cast(), &n);
        let cd = crossing(&self.c.cast(), &self.d.cast(), &n);
        cos_distance_order(&self.m.cast(), &ab, &cd, CROSSING_COSINES).map(Verdict::Decided)
    }
}

/// Compares the distance from `x` to the edge `a0a1` against a radius given
/// as its squared chord length `r2`. `Less` means some point of the edge is
/// strictly within the radius.
///
/// The edge endpoints must not be antipodal. A degenerate edge `a0 == a1`
/// is a single point.
pub fn compare_edge_distance(x: &Point, a0: &Point, a1: &Point, r2: f64) -> Ordering {
    debug_assert_ne!(*a0, -*a1, "edge endpoints are antipodal");
    evaluate(&EdgeDistance {
        x: *x,
        a0: *a0,
        a1: *a1,
        r2,
    })
    .outcome
}

/// Sign of `(a0 × a1) · (b0 × b1)`: positive when the edges point in roughly
/// the same direction, zero when either is degenerate or they are
/// perpendicular.
pub fn compare_edge_directions(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> Sign {
    evaluate(&EdgeDirections {
        a0: *a0,
        a1: *a1,
        b0: *b0,
        b1: *b1,
    })
    .outcome
}

/// Given an edge `ab` that crosses the great circle with normal `n`, returns
/// the side of the great circle with normal `x` on which the crossing point
/// lies. Zero when the crossing lies exactly on `x`'s circle.
pub fn circle_edge_intersection_sign(a: &Point, b: &Point, n: &Point, x: &Point) -> Sign {
    evaluate(&CircleEdgeIntersection {
        a: *a,
        b: *b,
        n: *n,
        x: *x,
    })
    .outcome
}

/// Given edges `ab` and `cd` that both cross the great circle with normal
/// `n`, compares the distances from `m` to the two crossing points: `Less`
/// if the crossing of `ab` is closer. Identical edges (in either direction)
/// and exact ties are `Equal`.
pub fn intersection_ordering(
    a: &Point,
    b: &Point,
    c: &Point,
    d: &Point,
    m: &Point,
    n: &Point,
) -> Ordering {
    evaluate(&IntersectionOrdering {
        a: *a,
        b: *b,
        c: *c,
        d: *d,
        m: *m,
        n: *n,
    })
    .outcome
}
