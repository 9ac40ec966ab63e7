use std::cmp::Ordering;
use std::ops::{Add, Index, Neg, Sub};

use crate::cascade::{Real, Scalar};

/// A 3D vector over any cascade scalar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

/// An input point. Points on the sphere need not be unit length unless a
/// predicate says so.
pub type Point = Vector3<f64>;

impl<T> Vector3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Scalar> Vector3<T> {
    pub fn dot(&self, other: &Self) -> T {
        self.x.clone() * other.x.clone()
            + self.y.clone() * other.y.clone()
            + self.z.clone() * other.z.clone()
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y.clone() * other.z.clone() - self.z.clone() * other.y.clone(),
            y: self.z.clone() * other.x.clone() - self.x.clone() * other.z.clone(),
            z: self.x.clone() * other.y.clone() - self.y.clone() * other.x.clone(),
        }
    }

    pub fn norm2(&self) -> T {
        self.dot(self)
    }

    pub fn scale(&self, factor: &T) -> Self {
        Self {
            x: factor.clone() * self.x.clone(),
            y: factor.clone() * self.y.clone(),
            z: factor.clone() * self.z.clone(),
        }
    }
}

impl Point {
    /// Converts every coordinate exactly into `T`.
    #[inline]
    pub fn cast<T: Real>(&self) -> Vector3<T> {
        Vector3 {
            x: T::from_f64(self.x),
            y: T::from_f64(self.y),
            z: T::from_f64(self.z),
        }
    }

    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    /// Scales to unit length; the zero vector is returned unchanged.
    pub fn normalize(&self) -> Point {
        let norm = self.norm();
        if norm == 0.0 {
            return *self;
        }
        Point::new(self.x / norm, self.y / norm, self.z / norm)
    }

    /// Lexicographic order on `(x, y, z)`. NaN coordinates compare equal.
    pub fn lex_cmp(&self, other: &Point) -> Ordering {
        let cmp = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        cmp(self.x, other.x)
            .then_with(|| cmp(self.y, other.y))
            .then_with(|| cmp(self.z, other.z))
    }
}

impl<T: Scalar> Add for Vector3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl<T: Scalar> Sub for Vector3<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl<T: Scalar> Neg for Vector3<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index out of range: {index}"),
        }
    }
}

impl<T> From<[T; 3]> for Vector3<T> {
    fn from([x, y, z]: [T; 3]) -> Self {
        Self { x, y, z }
    }
}

impl<T> From<(T, T, T)> for Vector3<T> {
    fn from((x, y, z): (T, T, T)) -> Self {
        Self { x, y, z }
    }
}
