//! Feature constructors, one per feature family.
//!
//! Every constructor is a pure function of resolved geometry. Profiles are
//! validated on construction, so a degenerate parameter combination surfaces
//! here as a [`GeometryError`] before the kernel is touched.

pub mod bracket;
pub mod enclosure;

use nalgebra::{Point2, Point3};
use part_types::{GeometryError, Profile};

/// Close an open loop and validate it.
pub(crate) fn closed_loop(mut points: Vec<Point3<f64>>) -> Result<Profile, GeometryError> {
    if let Some(&first) = points.first() {
        points.push(first);
    }
    Profile::closed(points)
}

/// Profile in the plane `x = const` from (y, z) pairs.
pub(crate) fn yz_profile(x: f64, points: &[Point2<f64>]) -> Result<Profile, GeometryError> {
    closed_loop(points.iter().map(|p| Point3::new(x, p.x, p.y)).collect())
}

/// Profile in the plane `z = const` from (x, y) pairs.
pub(crate) fn xy_profile(z: f64, points: &[Point2<f64>]) -> Result<Profile, GeometryError> {
    closed_loop(points.iter().map(|p| Point3::new(p.x, p.y, z)).collect())
}
