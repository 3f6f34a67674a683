use nalgebra::{Point3, Vector3};
use part_types::newell_normal;

use crate::polygon::Solid;
use crate::types::{KernelError, RenderMesh};

/// Triangulate every polygon of a solid with csgrs.
///
/// Triangles do not share vertices, so each carries its facet normal.
/// Winding is checked against the polygon's own normal before it is kept.
pub fn tessellate(solid: &Solid) -> Result<RenderMesh, KernelError> {
    let mut out = MeshBuilder::default();
    for polygon in &solid.polygons {
        let outline: Vec<Point3<f64>> = polygon.vertices.iter().map(|v| v.pos).collect();
        let facing = newell_normal(&outline);
        for [a, b, c] in polygon.tessellate() {
            let (a, b, c) = (a.pos, b.pos, c.pos);
            let normal = (b - a).cross(&(c - a));
            let Some(unit) = normal.try_normalize(1e-12) else {
                continue;
            };
            if unit.dot(&facing) < 0.0 {
                out.push_triangle([a, c, b], -unit);
            } else {
                out.push_triangle([a, b, c], unit);
            }
        }
    }
    if out.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid has no triangles".to_string(),
        });
    }
    Ok(out.finish())
}

#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn push_triangle(&mut self, corners: [Point3<f64>; 3], normal: Vector3<f64>) {
        for p in corners {
            self.indices.push(self.positions.len() as u32);
            self.positions.push(p);
            self.normals.push(normal);
        }
    }

    fn finish(self) -> RenderMesh {
        RenderMesh {
            vertices: self
                .positions
                .iter()
                .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
                .collect(),
            normals: self
                .normals
                .iter()
                .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
                .collect(),
            indices: self.indices,
        }
    }
}
