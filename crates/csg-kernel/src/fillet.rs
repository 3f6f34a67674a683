//! Constant-radius rounding of straight edges between planar faces.
//!
//! Each edge gets a prismatic tool whose cross-section is bounded by the two
//! faces and a faceted arc tangent to both. Concave edges are filled by
//! fusing the tool, convex edges are rounded by cutting it away.

use nalgebra::{Point3, Vector3};

use crate::polygon::{Polygon, SurfaceTag};
use crate::primitives::solid_from_loops;
use crate::topology::Topology;
use crate::types::{Deflection, EdgeCurve, KernelError};

/// Faces closer to parallel than this cannot be rounded.
const PARALLEL_LIMIT: f64 = 1.0 - 1e-6;

#[derive(Debug)]
pub struct FilletTool {
    pub polygons: Vec<Polygon>,
    /// Fuse when true, cut when false.
    pub concave: bool,
}

/// Build one tool per edge index of `topology`. Tools are all derived from the
/// unmodified solid; edge `i` is tagged with surface `first_surface + i`.
pub fn fillet_tools(
    topology: &Topology,
    edges: &[usize],
    radius: f64,
    deflection: &Deflection,
    first_surface: u32,
) -> Result<Vec<FilletTool>, KernelError> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(KernelError::FilletFailed {
            reason: format!("radius must be positive, got {radius}"),
        });
    }
    edges
        .iter()
        .enumerate()
        .map(|(i, &edge)| edge_tool(topology, edge, radius, deflection, first_surface + i as u32))
        .collect()
}

fn edge_tool(
    topology: &Topology,
    edge: usize,
    radius: f64,
    deflection: &Deflection,
    surface: u32,
) -> Result<FilletTool, KernelError> {
    let failed = |reason: String| KernelError::FilletFailed { reason };
    let record = &topology.edges[edge];
    if record.curve != EdgeCurve::Line {
        return Err(failed(format!("edge {edge} is not straight")));
    }
    let (face_l, face_m) = (&topology.faces[record.faces.0], &topology.faces[record.faces.1]);
    if face_l.tag != SurfaceTag::Planar || face_m.tag != SurfaceTag::Planar {
        return Err(failed(format!("edge {edge} borders a curved face")));
    }

    let n_l = face_l.plane.normal;
    let n_m = face_m.plane.normal;
    let k = n_l.dot(&n_m);
    if k.abs() > PARALLEL_LIMIT {
        return Err(failed(format!("faces at edge {edge} are parallel")));
    }

    let positions = &topology.mesh.positions;
    let start = positions[record.chain[0]];
    let end = positions[record.chain[record.chain.len() - 1]];
    let dir = (end - start).normalize();

    // Direction from the edge into face L.
    let loop_l = &topology.mesh.loops[record.side_loops.0];
    let mut into_l = n_l.cross(&dir);
    if (topology.mesh.loop_centroid(loop_l) - start).dot(&into_l) < 0.0 {
        into_l = -into_l;
    }
    let concave = into_l.dot(&n_m) > 0.0;

    let bisector = (n_l + n_m) * (radius / (1.0 + k));
    let (center, t_l, t_m) = if concave {
        let c = start + bisector;
        (c, c - n_l * radius, c - n_m * radius)
    } else {
        let c = start - bisector;
        (c, c + n_l * radius, c + n_m * radius)
    };

    let section = section_points(start, center, t_l, t_m, radius, deflection);
    let top: Vec<Point3<f64>> = section.iter().map(|p| p + (end - start)).collect();
    let polygons = solid_from_loops(&section, &top, SurfaceTag::Curved(surface))
        .map_err(|e| failed(format!("edge {edge}: {e}")))?;

    Ok(FilletTool { polygons, concave })
}

/// Corner, first tangent point, arc facets, second tangent point.
fn section_points(
    corner: Point3<f64>,
    center: Point3<f64>,
    t_l: Point3<f64>,
    t_m: Point3<f64>,
    radius: f64,
    deflection: &Deflection,
) -> Vec<Point3<f64>> {
    let a: Vector3<f64> = (t_l - center) / radius;
    let b: Vector3<f64> = (t_m - center) / radius;
    let sweep = a.dot(&b).clamp(-1.0, 1.0).acos();
    let steps = deflection.arc_segments(radius, sweep);

    let mut points = Vec::with_capacity(steps + 2);
    points.push(corner);
    points.push(t_l);
    for i in 1..steps {
        let t = i as f64 / steps as f64;
        let dir = (a * ((1.0 - t) * sweep).sin() + b * (t * sweep).sin()) / sweep.sin();
        points.push(center + dir * radius);
    }
    points.push(t_m);
    points
}
