use std::cmp::Ordering;
use std::ops::{Mul, Neg};

/// Sign of a predicate determinant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sign {
    Negative = -1,
    Zero = 0,
    Positive = 1,
}

impl Sign {
    pub fn from_i32(value: i32) -> Self {
        match value.signum() {
            -1 => Sign::Negative,
            0 => Sign::Zero,
            _ => Sign::Positive,
        }
    }

    pub fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Sign::Negative,
            Ordering::Equal => Sign::Zero,
            Ordering::Greater => Sign::Positive,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }

    pub fn to_ordering(self) -> Ordering {
        self.cmp(&Sign::Zero)
    }

    pub fn is_zero(self) -> bool {
        self == Sign::Zero
    }
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        Sign::from_i32(self.to_i32() * rhs.to_i32())
    }
}

/// Which Voronoi site, if any, can be dropped from an edge's diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Excluded {
    /// The first site (`a`) is never the closest site within range.
    First,
    /// The second site (`b`) is never the closest site within range.
    Second,
    Neither,
}
