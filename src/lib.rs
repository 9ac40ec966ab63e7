//! Exact predicates for geometry on the unit sphere.
//!
//! Every predicate returns the sign of a polynomial in its input coordinates
//! exactly as if the inputs were real numbers, and resolves exact zeros with
//! a consistent symbolic perturbation where the caller needs a strict answer.
//! Most calls complete in plain f64 arithmetic; inputs near a degeneracy fall
//! back to double-double and then to the exact [`ExactFloat`].
//!
//! # Quick Start
//!
//! ```rust
//! use spherepred::{Point, Sign, sign};
//!
//! let a = Point::new(1.0, 0.0, 0.0);
//! let b = Point::new(0.0, 1.0, 0.0);
//! let c = Point::new(0.0, 0.0, 1.0);
//!
//! assert_eq!(sign(&a, &b, &c), Sign::Positive);
//! assert_eq!(sign(&b, &a, &c), Sign::Negative);
//! // Three points on one great circle still get a consistent strict answer.
//! let d = Point::new(1.0, 1.0, 0.0);
//! assert_eq!(sign(&a, &b, &d), -sign(&b, &a, &d));
//! ```
//!
//! Distances are compared without square roots or trigonometry:
//!
//! ```rust
//! use spherepred::{Point, compare_distances};
//! use std::cmp::Ordering;
//!
//! let x = Point::new(0.0, 0.0, 1.0);
//! let near = Point::new(0.1, 0.0, 1.0);
//! let far = Point::new(1.0, 0.0, 0.0);
//! assert_eq!(compare_distances(&x, &near, &far), Ordering::Less);
//! ```
//!
//! # Available Predicates
//!
//! - [`sign`], [`ordered_ccw`]: orientation of three points
//! - [`compare_distances`], [`compare_distances_perturbed`], [`compare_distance`]:
//!   point to point distances
//! - [`sign_dot_prod`]: which hemisphere a point lies in
//! - [`compare_edge_distance`], [`compare_edge_directions`]: point to edge
//!   distances and edge directions
//! - [`circle_edge_intersection_sign`], [`intersection_ordering`]: where
//!   edges cross great circles
//! - [`edge_circumcenter_sign`], [`voronoi_site_exclusion`]: building blocks
//!   of spherical Voronoi diagrams
//!
//! # Features
//!
//! - `extended-precision` (default): insert a double-double stage between
//!   f64 triage and exact arithmetic.

#[doc(hidden)]
pub mod cascade;
mod error;
pub mod exact_float;
pub(crate) mod expansion;
mod geometry;

pub use cascade::{Evaluation, Stage};
pub use error::InvariantError;
pub use exact_float::{ExactFloat, RoundingMode};
pub use geometry::{
    Excluded, Point, Sign, Vector3, circle_edge_intersection_sign, compare_distance,
    compare_distances, compare_distances_perturbed, compare_edge_directions,
    compare_edge_distance, edge_circumcenter_sign, intersection_ordering, ordered_ccw, sign,
    sign_dot_prod, voronoi_site_exclusion,
};

#[doc(hidden)]
pub use geometry::{
    CircleEdgeIntersection, DistanceComparison, DotProductSign, EdgeCircumcenter, EdgeDirections,
    EdgeDistance, IntersectionOrdering, Orientation, RadiusComparison, VoronoiExclusion,
};
