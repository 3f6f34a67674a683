//! Closed planar polygons ("wires") used as extrusion and loft cross-sections.

use nalgebra::{Point3, Vector3};

use crate::tolerance::Tolerance;

/// Why a profile was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("profile needs at least 3 distinct points, got {count}")]
    TooFewPoints { count: usize },

    #[error("profile is not closed: last point must repeat the first")]
    NotClosed,

    #[error("profile segment {index} has zero length")]
    ZeroLengthSegment { index: usize },

    #[error("profile encloses zero area")]
    ZeroArea,

    #[error("profile is not planar (max deviation {deviation:.3e})")]
    NonPlanar { deviation: f64 },

    #[error("profile segments {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },

    #[error("loft loops differ in point count ({lower} vs {upper})")]
    LoftMismatch { lower: usize, upper: usize },
}

/// An ordered, closed sequence of coplanar points forming a simple polygon.
///
/// The first point is repeated as the last one. Instances only exist once
/// they passed validation, so consumers can rely on the invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    points: Vec<Point3<f64>>,
    normal: Vector3<f64>,
}

impl Profile {
    /// Validate `points` (closing point included) with default tolerances.
    pub fn closed(points: Vec<Point3<f64>>) -> Result<Self, GeometryError> {
        Self::closed_with(points, &Tolerance::default())
    }

    pub fn closed_with(points: Vec<Point3<f64>>, tol: &Tolerance) -> Result<Self, GeometryError> {
        if points.len() < 4 {
            return Err(GeometryError::TooFewPoints {
                count: points.len().saturating_sub(1),
            });
        }
        let first = points[0];
        let last = points[points.len() - 1];
        if (last - first).norm() > tol.coincidence {
            return Err(GeometryError::NotClosed);
        }

        let open = &points[..points.len() - 1];
        for (index, pair) in points.windows(2).enumerate() {
            if (pair[1] - pair[0]).norm() <= tol.coincidence {
                return Err(GeometryError::ZeroLengthSegment { index });
            }
        }

        let newell = newell_normal(open);
        let twice_area = newell.norm();
        if twice_area * 0.5 <= tol.area {
            return Err(GeometryError::ZeroArea);
        }
        let normal = newell / twice_area;

        let deviation = open
            .iter()
            .map(|p| (p - first).dot(&normal).abs())
            .fold(0.0_f64, f64::max);
        if deviation > tol.planarity {
            return Err(GeometryError::NonPlanar { deviation });
        }

        if let Some((first, second)) = find_self_intersection(open, &normal, tol) {
            return Err(GeometryError::SelfIntersecting { first, second });
        }

        Ok(Self { points, normal })
    }

    /// All points, closing point included.
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// The distinct corner points (closing point dropped).
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.points[..self.points.len() - 1]
    }

    /// Unit normal following the right-hand rule over the point order.
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn area(&self) -> f64 {
        newell_normal(self.vertices()).norm() * 0.5
    }

    pub fn centroid(&self) -> Point3<f64> {
        let verts = self.vertices();
        let sum = verts
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / verts.len() as f64)
    }

    /// A copy moved by `offset`. Translation preserves every invariant.
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            points: self.points.iter().map(|p| p + offset).collect(),
            normal: self.normal,
        }
    }

    /// Axis-aligned extent of the profile.
    pub fn extent(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in self.vertices() {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        (min, max)
    }
}

/// Newell's method; the length of the result is twice the enclosed area.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Orthonormal in-plane basis `(u, v)` for a plane with unit normal `normal`.
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(normal).normalize();
    let v = normal.cross(&u);
    (u, v)
}

fn find_self_intersection(
    open: &[Point3<f64>],
    normal: &Vector3<f64>,
    tol: &Tolerance,
) -> Option<(usize, usize)> {
    let (u, v) = plane_basis(normal);
    let origin = open[0];
    let flat: Vec<[f64; 2]> = open
        .iter()
        .map(|p| {
            let d = p - origin;
            [d.dot(&u), d.dot(&v)]
        })
        .collect();

    let n = flat.len();
    for i in 0..n {
        for j in (i + 1)..n {
            // Neighbouring segments share a corner by construction.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (a, b) = (flat[i], flat[(i + 1) % n]);
            let (c, d) = (flat[j], flat[(j + 1) % n]);
            if segments_touch(a, b, c, d, tol.coincidence) {
                return Some((i, j));
            }
        }
    }
    None
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2], eps: f64) -> bool {
    p[0] >= a[0].min(b[0]) - eps
        && p[0] <= a[0].max(b[0]) + eps
        && p[1] >= a[1].min(b[1]) - eps
        && p[1] <= a[1].max(b[1]) + eps
}

fn segments_touch(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2], eps: f64) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);

    if ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
    {
        return true;
    }

    (d1.abs() <= eps && on_segment(c, d, a, eps))
        || (d2.abs() <= eps && on_segment(c, d, b, eps))
        || (d3.abs() <= eps && on_segment(a, b, c, eps))
        || (d4.abs() <= eps && on_segment(a, b, d, eps))
}
