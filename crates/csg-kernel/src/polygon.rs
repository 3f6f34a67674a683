//! Facets: the analysis view of a csgrs solid.
//!
//! Booleans run on `csgrs::CSG` with a [`SurfaceTag`] as polygon metadata, so
//! splits keep track of which surface a fragment came from. Face and edge
//! recovery, volumes and rounding work on plain [`Polygon`]s converted out of
//! it and back.

use csgrs::polygon::Polygon as CsgPolygon;
use csgrs::vertex::Vertex;
use csgrs::CSG;
use nalgebra::{Point3, Vector3};
use part_types::newell_normal;

/// A kernel solid as csgrs sees it.
pub type Solid = CSG<SurfaceTag>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    pub fn from_normal_point(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        Self {
            normal,
            w: normal.dot(&point.coords),
        }
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Same plane and same orientation.
    pub fn coincides(&self, other: &Plane, eps: f64) -> bool {
        self.normal.dot(&other.normal) > 1.0 - 1e-9 && (self.w - other.w).abs() < eps
    }
}

/// Which surface a polygon was cut from. Polygons of one curved surface
/// share an id so faceted cylinders and fillets read back as one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceTag {
    Planar,
    Curved(u32),
}

/// A convex planar polygon, counter-clockwise seen from outside the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    pub plane: Plane,
    pub tag: SurfaceTag,
}

impl Polygon {
    /// `None` when the vertices enclose no area.
    pub fn new(vertices: Vec<Point3<f64>>, tag: SurfaceTag) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let n = newell_normal(&vertices);
        let len = n.norm();
        if len < 1e-12 {
            return None;
        }
        let normal = n / len;
        let plane = Plane::from_normal_point(normal, &vertices[0]);
        Some(Self {
            vertices,
            plane,
            tag,
        })
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    pub fn area(&self) -> f64 {
        newell_normal(&self.vertices).norm() * 0.5
    }

    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Signed volume of the cone from the origin to this polygon.
    pub fn signed_volume(&self) -> f64 {
        let v0 = self.vertices[0].coords;
        self.vertices
            .windows(2)
            .skip(1)
            .map(|w| v0.dot(&w[0].coords.cross(&w[1].coords)))
            .sum::<f64>()
            / 6.0
    }
}

/// Total enclosed volume of a closed, outward-oriented polygon set.
pub fn enclosed_volume(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(Polygon::signed_volume).sum()
}

/// Build a csgrs solid from convex facets.
///
/// Collinear vertices (T-junction repairs) are dropped first; csgrs derives
/// each polygon's plane from its leading vertices.
pub fn to_csg(polygons: &[Polygon]) -> Solid {
    let converted: Vec<CsgPolygon<SurfaceTag>> = polygons
        .iter()
        .filter_map(|p| {
            let corners = corners(&p.vertices);
            (corners.len() >= 3).then(|| {
                let vertices = corners
                    .into_iter()
                    .map(|pos| Vertex::new(pos, p.plane.normal))
                    .collect();
                CsgPolygon::new(vertices, Some(p.tag))
            })
        })
        .collect();
    CSG::from_polygons(&converted)
}

/// Facets of a csgrs solid. Untagged polygons are planar.
pub fn from_csg(solid: &Solid) -> Vec<Polygon> {
    solid
        .polygons
        .iter()
        .filter_map(|p| {
            Polygon::new(
                p.vertices.iter().map(|v| v.pos).collect(),
                p.metadata.unwrap_or(SurfaceTag::Planar),
            )
        })
        .collect()
}

fn corners(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let mut out = points.to_vec();
    let mut i = 0;
    while out.len() > 3 && i < out.len() {
        let n = out.len();
        let (a, b, c) = (out[(i + n - 1) % n], out[i], out[(i + 1) % n]);
        let (ab, bc) = (b - a, c - b);
        if ab.cross(&bc).norm() <= 1e-9 * ab.norm() * bc.norm() {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Polygon {
        Polygon::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            SurfaceTag::Planar,
        )
        .unwrap()
    }

    #[test]
    fn square_normal_points_up() {
        let sq = unit_square();
        assert_relative_eq!(sq.plane.normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(sq.area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn csg_round_trip_drops_t_vertices() {
        let mut square = unit_square();
        square.vertices.insert(1, Point3::new(0.5, 0.0, 0.0));
        let back = from_csg(&to_csg(&[square]));
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].vertices.len(), 4);
        assert_eq!(back[0].tag, SurfaceTag::Planar);
        assert_relative_eq!(back[0].plane.normal, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn curved_tag_survives_csgrs() {
        let mut square = unit_square();
        square.tag = SurfaceTag::Curved(7);
        let back = from_csg(&to_csg(&[square]));
        assert_eq!(back[0].tag, SurfaceTag::Curved(7));
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let line = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(Polygon::new(line, SurfaceTag::Planar).is_none());
    }
}
