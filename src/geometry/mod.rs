mod circumcenter;
mod distance;
mod edge;
mod outcome;
mod radical;
mod sign;
mod vector;
mod voronoi;

pub use circumcenter::{EdgeCircumcenter, edge_circumcenter_sign};
pub use distance::{
    DistanceComparison, DotProductSign, RadiusComparison, compare_distance, compare_distances,
    compare_distances_perturbed, sign_dot_prod,
};
pub use edge::{
    CircleEdgeIntersection, EdgeDirections, EdgeDistance, IntersectionOrdering,
    circle_edge_intersection_sign, compare_edge_directions, compare_edge_distance,
    intersection_ordering,
};
pub use outcome::{Excluded, Sign};
pub use sign::{Orientation, ordered_ccw, sign};
pub use vector::{Point, Vector3};
pub use voronoi::{VoronoiExclusion, voronoi_site_exclusion};
