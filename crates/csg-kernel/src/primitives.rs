//! Solids for every primitive the kernel builds.
//!
//! Boxes and cylinders come straight from csgrs. Extrusions and lofts are
//! ruled solids between a bottom loop and a top loop with matching vertex
//! order; orientation is fixed afterwards from the sign of the enclosed
//! volume, so callers may pass loops in either winding.

use csgrs::polygon::Polygon as CsgPolygon;
use csgrs::vertex::Vertex;
use csgrs::CSG;
use nalgebra::{Point3, Vector3};
use part_types::{newell_normal, Profile};
use tracing::debug;

use crate::polygon::{enclosed_volume, from_csg, to_csg, Polygon, Solid, SurfaceTag};
use crate::types::KernelError;

/// Solids enclosing less than this are rejected as degenerate.
const MIN_VOLUME: f64 = 1e-9;

pub fn box_solid(origin: Point3<f64>, size: Vector3<f64>) -> Result<Solid, KernelError> {
    if size.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
        return Err(KernelError::Degenerate {
            reason: format!("box size must be positive, got {:?}", size.as_slice()),
        });
    }
    let cube: Solid = CSG::cube(size.x, size.y, size.z, Some(SurfaceTag::Planar));
    Ok(cube.translate(origin.x, origin.y, origin.z))
}

/// Faceted cylinder; the side facets share `surface`, the caps are planar.
pub fn cylinder_solid(
    base: Point3<f64>,
    axis: Vector3<f64>,
    radius: f64,
    height: f64,
    segments: usize,
    surface: u32,
) -> Result<Solid, KernelError> {
    let axis_len = axis.norm();
    if radius <= 0.0 || height <= 0.0 || axis_len < 1e-12 {
        return Err(KernelError::Degenerate {
            reason: format!("cylinder needs positive radius, height and axis (r={radius}, h={height})"),
        });
    }
    let axis = axis / axis_len;
    let raw: Solid = CSG::frustum_ptp(base, base + axis * height, radius, radius, segments, None);

    let mut facets = from_csg(&raw);
    for facet in &mut facets {
        let cap = facet.plane.normal.dot(&axis).abs() > 1.0 - 1e-9;
        facet.tag = if cap {
            SurfaceTag::Planar
        } else {
            SurfaceTag::Curved(surface)
        };
    }
    Ok(to_csg(&facets))
}

pub fn extrusion_solid(profile: &Profile, vector: Vector3<f64>) -> Result<Solid, KernelError> {
    let len = vector.norm();
    if len < 1e-12 || (vector.dot(&profile.normal()) / len).abs() < 1e-9 {
        return Err(KernelError::Degenerate {
            reason: "extrusion vector lies in the profile plane".to_string(),
        });
    }
    let bottom = profile.vertices();
    let top: Vec<_> = bottom.iter().map(|p| p + vector).collect();
    Ok(to_csg(&solid_from_loops(bottom, &top, SurfaceTag::Planar)?))
}

pub fn loft_solid(lower: &Profile, upper: &Profile) -> Result<Solid, KernelError> {
    if lower.vertices().len() != upper.vertices().len() {
        return Err(KernelError::Degenerate {
            reason: format!(
                "loft loops differ in point count ({} vs {})",
                lower.vertices().len(),
                upper.vertices().len()
            ),
        });
    }
    Ok(to_csg(&solid_from_loops(
        lower.vertices(),
        upper.vertices(),
        SurfaceTag::Planar,
    )?))
}

/// Side faces of a ruled surface between `bottom[i]` and `top[i]` plus the
/// two caps. Side quads that are not planar are split into triangles.
pub fn solid_from_loops(
    bottom: &[Point3<f64>],
    top: &[Point3<f64>],
    side_tag: SurfaceTag,
) -> Result<Vec<Polygon>, KernelError> {
    let n = bottom.len();
    if n < 3 || top.len() != n {
        return Err(KernelError::Degenerate {
            reason: format!("loops need 3+ matching points ({} vs {})", n, top.len()),
        });
    }

    let mut polygons = Vec::with_capacity(n + 2);

    let mut bottom_cap: Vec<_> = bottom.to_vec();
    bottom_cap.reverse();
    polygons.extend(cap_polygons(bottom_cap));
    polygons.extend(cap_polygons(top.to_vec()));

    for i in 0..n {
        let j = (i + 1) % n;
        let quad = [bottom[i], bottom[j], top[j], top[i]];
        if is_planar(&quad) {
            let mut verts = quad.to_vec();
            verts.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
            if verts.len() > 3 && (verts[verts.len() - 1] - verts[0]).norm() < 1e-12 {
                verts.pop();
            }
            polygons.extend(Polygon::new(verts, side_tag));
        } else {
            polygons.extend(Polygon::new(vec![quad[0], quad[1], quad[2]], side_tag));
            polygons.extend(Polygon::new(vec![quad[0], quad[2], quad[3]], side_tag));
        }
    }

    let volume = enclosed_volume(&polygons);
    if volume.abs() < MIN_VOLUME {
        return Err(KernelError::Degenerate {
            reason: format!("solid encloses no volume ({volume:.3e})"),
        });
    }
    if volume < 0.0 {
        for polygon in &mut polygons {
            polygon.flip();
        }
    }
    debug!(polygons = polygons.len(), volume = volume.abs(), "built ruled solid");
    Ok(polygons)
}

fn is_planar(quad: &[Point3<f64>; 4]) -> bool {
    let normal = newell_normal(quad);
    let len = normal.norm();
    if len < 1e-12 {
        return true;
    }
    let normal = normal / len;
    let scale = quad
        .iter()
        .map(|p| (p - quad[0]).norm())
        .fold(1.0_f64, f64::max);
    quad.iter()
        .all(|p| (p - quad[0]).dot(&normal).abs() <= 1e-9 * scale)
}

/// A cap as one polygon when convex, else as triangles from csgrs.
fn cap_polygons(loop_points: Vec<Point3<f64>>) -> Vec<Polygon> {
    let normal = newell_normal(&loop_points);
    if is_convex(&loop_points, &normal) {
        return Polygon::new(loop_points, SurfaceTag::Planar)
            .into_iter()
            .collect();
    }
    let unit = normal.normalize();
    let vertices = loop_points.iter().map(|p| Vertex::new(*p, unit)).collect();
    let outline: CsgPolygon<SurfaceTag> = CsgPolygon::new(vertices, Some(SurfaceTag::Planar));
    outline
        .tessellate()
        .into_iter()
        .filter_map(|[a, b, c]| {
            let mut corners = vec![a.pos, b.pos, c.pos];
            // csgrs may hand triangles back in the plane's own winding.
            if newell_normal(&corners).dot(&normal) < 0.0 {
                corners.reverse();
            }
            Polygon::new(corners, SurfaceTag::Planar)
        })
        .collect()
}

pub(crate) fn is_convex(points: &[Point3<f64>], normal: &Vector3<f64>) -> bool {
    let n = points.len();
    (0..n).all(|i| {
        let a = points[(i + n - 1) % n];
        let b = points[i];
        let c = points[(i + 1) % n];
        (b - a).cross(&(c - b)).dot(normal) >= -1e-9
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_is_outward() {
        let polys = from_csg(&box_solid(Point3::origin(), Vector3::new(2.0, 3.0, 4.0)).unwrap());
        assert_eq!(polys.len(), 6);
        assert_relative_eq!(enclosed_volume(&polys), 24.0, epsilon = 1e-12);
        for p in &polys {
            let outward = p.centroid() - Point3::new(1.0, 1.5, 2.0);
            assert!(outward.dot(&p.plane.normal) > 0.0);
        }
    }

    #[test]
    fn box_sits_at_origin() {
        let polys = from_csg(
            &box_solid(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 1.0)).unwrap(),
        );
        let lowest = polys
            .iter()
            .flat_map(|p| p.vertices.iter())
            .fold(Point3::new(f64::MAX, f64::MAX, f64::MAX), |m, v| {
                Point3::new(m.x.min(v.x), m.y.min(v.y), m.z.min(v.z))
            });
        assert_relative_eq!(lowest, Point3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn cylinder_volume_matches_prism() {
        let polys = from_csg(
            &cylinder_solid(Point3::origin(), Vector3::z(), 1.0, 2.0, 16, 1).unwrap(),
        );
        let expected = 0.5 * 16.0 * (std::f64::consts::TAU / 16.0).sin() * 2.0;
        assert_relative_eq!(enclosed_volume(&polys), expected, epsilon = 1e-9);
        assert_eq!(
            polys
                .iter()
                .filter(|p| p.tag == SurfaceTag::Curved(1))
                .count(),
            16
        );
        assert!(polys
            .iter()
            .filter(|p| p.tag == SurfaceTag::Planar)
            .all(|p| p.plane.normal.z.abs() > 0.999));
    }

    #[test]
    fn concave_profile_extrudes() {
        let profile = Profile::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        let polys = from_csg(&extrusion_solid(&profile, Vector3::new(0.0, 0.0, 2.0)).unwrap());
        assert_relative_eq!(enclosed_volume(&polys), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn in_plane_extrusion_is_degenerate() {
        let profile = Profile::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(matches!(
            extrusion_solid(&profile, Vector3::x()),
            Err(KernelError::Degenerate { .. })
        ));
    }

    #[test]
    fn frustum_loft_volume() {
        let square = |half: f64, z: f64| {
            Profile::closed(vec![
                Point3::new(-half, -half, z),
                Point3::new(half, -half, z),
                Point3::new(half, half, z),
                Point3::new(-half, half, z),
                Point3::new(-half, -half, z),
            ])
            .unwrap()
        };
        let polys = from_csg(&loft_solid(&square(2.0, 0.0), &square(1.0, 1.0)).unwrap());
        // Frustum: h/3 (A1 + A2 + sqrt(A1 A2))
        let expected = (16.0 + 4.0 + 8.0) / 3.0;
        assert_relative_eq!(enclosed_volume(&polys), expected, epsilon = 1e-9);
    }
}
