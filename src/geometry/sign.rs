use std::cmp::Ordering;

use crate::cascade::{ErrorBound, Predicate, Real, Verdict, evaluate};
use crate::exact_float::ExactFloat;

use super::{Point, Sign, Vector3};

/// `(a × b) · c`: each cross product entry is a difference of two products
/// (depth 2), the dot product adds a product and two sums.
const DET: ErrorBound = ErrorBound::new(5);

/// The longest-edge form multiplies edge vectors (depth 1) instead of the
/// raw inputs, which pushes every step one level deeper.
const STABLE_DET: ErrorBound = ErrorBound::new(7);

/// Orientation of three points: the sign of `(a × b) · c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Orientation {
    pub fn new(a: &Point, b: &Point, c: &Point) -> Self {
        Self {
            a: *a,
            b: *b,
            c: *c,
        }
    }

    fn has_repeated_point(&self) -> bool {
        self.a == self.b || self.b == self.c || self.c == self.a
    }

    /// Same determinant, computed from the two shortest edges. Much more
    /// accurate than the direct form when the points are close together.
    fn stable_det<T: Real>(&self) -> T {
        let (a, b, c) = (self.a.cast::<T>(), self.b.cast::<T>(), self.c.cast::<T>());
        let ab2 = (self.b - self.a).norm2();
        let bc2 = (self.c - self.b).norm2();
        let ca2 = (self.a - self.c).norm2();
        let ab = b.clone() - a.clone();
        let bc = c.clone() - b.clone();
        let ca = a.clone() - c.clone();
        if ab2 >= bc2 && ab2 >= ca2 {
            -ca.cross(&bc).dot(&c)
        } else if bc2 >= ca2 {
            -ab.cross(&ca).dot(&a)
        } else {
            -bc.cross(&ab).dot(&b)
        }
    }
}

impl Predicate for Orientation {
    type Output = Sign;
    const NAME: &'static str = "sign";

    fn eval<T: Real>(&self) -> Option<Verdict<Sign>> {
        if self.has_repeated_point() {
            return Some(Verdict::Decided(Sign::Zero));
        }
        let (a, b, c) = (self.a.cast::<T>(), self.b.cast::<T>(), self.c.cast::<T>());
        if let Some(sign) = a.cross(&b).dot(&c).certain_sign(DET) {
            return Some(Verdict::nonzero(sign));
        }
        self.stable_det::<T>()
            .certain_sign(STABLE_DET)
            .map(Verdict::nonzero)
    }

    /// Simulation of simplicity over the lexicographically sorted points.
    fn symbolic(&self) -> Sign {
        let mut points = [self.a, self.b, self.c];
        let mut permutation = Sign::Positive;
        for (i, j) in [(0, 1), (1, 2), (0, 1)] {
            if points[i].lex_cmp(&points[j]) == Ordering::Greater {
                points.swap(i, j);
                permutation = -permutation;
            }
        }
        let [a, b, c] = points.map(|p| p.cast::<ExactFloat>());
        permutation * perturbed_sign(&a, &b, &c)
    }
}

/// Sign of the determinant after displacing each sorted point by an
/// infinitesimal whose size decreases along the order. `a < b < c`, and the
/// unperturbed determinant must be zero.
///
/// Terms are listed by decreasing order of the infinitesimal they multiply,
/// so the first nonzero one decides.
fn perturbed_sign(
    a: &Vector3<ExactFloat>,
    b: &Vector3<ExactFloat>,
    c: &Vector3<ExactFloat>,
) -> Sign {
    let sgn = |x: &ExactFloat| Sign::from_i32(x.sgn());
    let b_cross_c = b.cross(c);
    let terms = [
        sgn(&b_cross_c.z),
        sgn(&b_cross_c.y),
        sgn(&b_cross_c.x),
        sgn(&(&c.x * &a.y - &c.y * &a.x)),
        sgn(&c.x),
        -sgn(&c.y),
        sgn(&(&c.z * &a.x - &c.x * &a.z)),
        sgn(&c.z),
        // Redundant after the terms above: c is now known to be zero.
        sgn(&(&a.x * &b.y - &a.y * &b.x)),
        -sgn(&b.x),
        sgn(&b.y),
        sgn(&a.x),
    ];
    terms
        .into_iter()
        .find(|sign| !sign.is_zero())
        .unwrap_or(Sign::Positive)
}

/// Returns the orientation of `a`, `b`, `c`: positive when they turn
/// counter-clockwise seen from outside the sphere, i.e. `(a × b) · c > 0`.
///
/// The result is zero only if two of the points are identical; every other
/// exactly coplanar triple gets a consistent nonzero sign that flips under
/// any swap of two arguments.
pub fn sign(a: &Point, b: &Point, c: &Point) -> Sign {
    evaluate(&Orientation::new(a, b, c)).outcome
}

/// Returns true if `a`, `b` and `c` are encountered in that order when
/// sweeping counter-clockwise around `o`. If `a == b` or `b == c` the result
/// is true; if `a == c` (and `a != b`) it is false.
pub fn ordered_ccw(a: &Point, b: &Point, c: &Point, o: &Point) -> bool {
    let mut sum = 0;
    if sign(b, o, a) != Sign::Negative {
        sum += 1;
    }
    if sign(c, o, b) != Sign::Negative {
        sum += 1;
    }
    if sign(a, o, c) == Sign::Positive {
        sum += 1;
    }
    sum >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::Stage;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn right_handed_triangle() {
        let north = p(0.0, 0.0, 1.0);
        let lon0 = p(1.0, 0.0, 0.0);
        let lon90 = p(0.0, 1.0, 0.0);
        assert_eq!(sign(&north, &lon0, &lon90), Sign::Positive);
        assert_eq!(sign(&north, &lon90, &lon0), Sign::Negative);
        assert_eq!(sign(&lon0, &lon90, &north), Sign::Positive);
    }

    #[test]
    fn repeated_points_are_zero() {
        let a = p(1.0, 2.0, 3.0);
        let b = p(-1.0, 0.5, 2.0);
        assert_eq!(sign(&a, &a, &b), Sign::Zero);
        assert_eq!(sign(&a, &b, &b), Sign::Zero);
        assert_eq!(sign(&b, &a, &b), Sign::Zero);
    }

    #[test]
    fn collinear_points_are_perturbed() {
        let a = p(1.0, 0.0, 0.0);
        let b = p(2.0, 0.0, 0.0);
        let c = p(3.0, 0.0, 0.0);
        let eval = evaluate(&Orientation::new(&a, &b, &c));
        assert_eq!(eval.stage, Stage::Symbolic);
        // b × c and the a/c minor vanish; c.x decides.
        assert_eq!(eval.outcome, Sign::Positive);
        assert_eq!(sign(&b, &c, &a), Sign::Positive);
        assert_eq!(sign(&c, &a, &b), Sign::Positive);
        assert_eq!(sign(&b, &a, &c), Sign::Negative);
        assert_eq!(sign(&a, &c, &b), Sign::Negative);
        assert_eq!(sign(&c, &b, &a), Sign::Negative);
    }

    #[test]
    fn points_on_one_great_circle() {
        let a = p(1.0, 0.0, 0.0);
        let b = p(0.0, 1.0, 0.0);
        let c = p(-1.0, 0.0, 0.0);
        let abc = sign(&a, &b, &c);
        assert_ne!(abc, Sign::Zero);
        assert_eq!(sign(&b, &c, &a), abc);
        assert_eq!(sign(&b, &a, &c), -abc);
    }

    #[test]
    fn stable_determinant_agrees_with_the_direct_one() {
        let o = Orientation::new(
            &p(0.3, -0.2, 0.9),
            &p(0.3000001, -0.2, 0.9),
            &p(0.3, -0.2000001, 0.9),
        );
        let direct = o.a.cast::<ExactFloat>().cross(&o.b.cast()).dot(&o.c.cast());
        assert_eq!(o.stable_det::<ExactFloat>(), direct);
    }

    #[test]
    fn close_points_are_resolved_exactly() {
        let a = p(0.5, 0.5, 0.5);
        let b = p(0.5 + f64::EPSILON, 0.5, 0.5);
        let c = p(0.5, 0.5 + f64::EPSILON, 0.5);
        assert_eq!(sign(&a, &b, &c), Sign::Positive);
        assert_eq!(sign(&a, &c, &b), Sign::Negative);
    }

    #[test]
    fn ordered_ccw_around_the_pole() {
        let o = p(0.0, 0.0, 1.0);
        let a = p(1.0, 0.0, 0.0);
        let b = p(0.0, 1.0, 0.0);
        let c = p(-1.0, 0.0, 0.0);
        assert!(ordered_ccw(&a, &b, &c, &o));
        assert!(ordered_ccw(&b, &c, &a, &o));
        assert!(!ordered_ccw(&a, &c, &b, &o));
        assert!(ordered_ccw(&a, &a, &c, &o));
    }
}
