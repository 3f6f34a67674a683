//! MockKernel: a deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Every solid is a list of axis-aligned boxes plus a tracked volume. Boxes
//! give predictable edges and faces, approximate volumes are good enough to
//! check that the pipeline adds and removes material. Every call is logged
//! and any operation can be told to fail.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::{Point3, Vector3};
use part_types::Profile;

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

/// A straight edge with known endpoints.
#[derive(Debug, Clone)]
struct MockEdge {
    start: Point3<f64>,
    end: Point3<f64>,
}

/// A synthetic solid: the boxes it was assembled from.
#[derive(Debug, Clone)]
struct MockSolid {
    boxes: Vec<BoundingBox>,
    volume: f64,
    edges: Vec<MockEdge>,
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_handle: u64,
    solids: BTreeMap<u64, MockSolid>,
    op_log: Vec<String>,
    fail_ops: BTreeSet<String>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: BTreeMap::new(),
            op_log: Vec::new(),
            fail_ops: BTreeSet::new(),
        }
    }

    /// Names of the kernel operations called so far, in call order.
    pub fn op_log(&self) -> &[String] {
        &self.op_log
    }

    /// Make every later call of `op` fail.
    pub fn fail_on(&mut self, op: &str) {
        self.fail_ops.insert(op.to_string());
    }

    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids.get(&handle.id()).ok_or(KernelError::SolidNotFound {
            handle: handle.id(),
        })
    }

    /// Log `op` and fail if it was marked with [`MockKernel::fail_on`].
    fn record(&mut self, op: &str) -> Result<(), KernelError> {
        self.op_log.push(op.to_string());
        if !self.fail_ops.contains(op) {
            return Ok(());
        }
        let reason = format!("injected failure in {op}");
        Err(match op {
            "boolean_union" | "boolean_subtract" => KernelError::BooleanFailed { reason },
            "fillet_edges" => KernelError::FilletFailed { reason },
            "tessellate" => KernelError::TessellationFailed { reason },
            _ => KernelError::Degenerate { reason },
        })
    }

    fn box_solid(bb: BoundingBox) -> MockSolid {
        let (min, max) = (bb.min, bb.max);
        let corners = [
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        // 4 bottom, 4 top, 4 vertical
        let edge_pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let size = bb.size();
        MockSolid {
            boxes: vec![bb],
            volume: size.x * size.y * size.z,
            edges: edge_pairs
                .iter()
                .map(|&(s, e)| MockEdge {
                    start: corners[s],
                    end: corners[e],
                })
                .collect(),
        }
    }

    /// A solid known only by its bounds and volume; it has no straight edges.
    fn bounded_solid(bb: BoundingBox, volume: f64) -> MockSolid {
        MockSolid {
            boxes: vec![bb],
            volume,
            edges: Vec::new(),
        }
    }

    fn check_positive(name: &str, value: f64) -> Result<(), KernelError> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(KernelError::Degenerate {
                reason: format!("{name} must be positive, got {value}"),
            })
        }
    }

    /// Generate a deterministic box mesh: 2 triangles per face = 12 triangles per box.
    fn tessellate_boxes(solid: &MockSolid) -> RenderMesh {
        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();

        for bb in &solid.boxes {
            let (lo, hi) = (bb.min, bb.max);
            for axis in 0..3 {
                for (side, value) in [(-1.0, lo[axis]), (1.0, hi[axis])] {
                    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
                    let base = (vertices.len() / 3) as u32;
                    let mut quad = [[0.0_f64; 3]; 4];
                    for (k, (cu, cv)) in [(lo[u], lo[v]), (hi[u], lo[v]), (hi[u], hi[v]), (lo[u], hi[v])]
                        .into_iter()
                        .enumerate()
                    {
                        quad[k][axis] = value;
                        quad[k][u] = cu;
                        quad[k][v] = cv;
                    }
                    if side < 0.0 {
                        quad.reverse();
                    }
                    let mut n = [0.0_f32; 3];
                    n[axis] = side as f32;
                    for corner in &quad {
                        vertices.extend(corner.iter().map(|&c| c as f32));
                        normals.extend_from_slice(&n);
                    }
                    // Two triangles: 0-1-2 and 0-2-3
                    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
                }
            }
        }

        RenderMesh {
            vertices,
            normals,
            indices,
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_box(
        &mut self,
        origin: Point3<f64>,
        size: Vector3<f64>,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("make_box")?;
        for (name, s) in [("width", size.x), ("length", size.y), ("height", size.z)] {
            Self::check_positive(name, s)?;
        }
        let bb = BoundingBox {
            min: origin,
            max: origin + size,
        };
        Ok(self.store(Self::box_solid(bb)))
    }

    fn make_cylinder(
        &mut self,
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("make_cylinder")?;
        Self::check_positive("radius", radius)?;
        Self::check_positive("height", height)?;
        let axis = axis.try_normalize(1e-12).ok_or(KernelError::Degenerate {
            reason: "cylinder axis has zero length".to_string(),
        })?;
        let top = base + axis * height;
        // Disc extent per axis is r * sqrt(1 - a_i^2).
        let reach = axis.map(|a| radius * (1.0 - a * a).max(0.0).sqrt());
        let mut bb = BoundingBox {
            min: base - reach,
            max: base + reach,
        };
        bb.include(&(top - reach));
        bb.include(&(top + reach));
        let volume = std::f64::consts::PI * radius * radius * height;
        Ok(self.store(Self::bounded_solid(bb, volume)))
    }

    fn extrude_profile(
        &mut self,
        profile: &Profile,
        vector: Vector3<f64>,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("extrude_profile")?;
        let height = vector.dot(&profile.normal()).abs();
        if height < 1e-12 {
            return Err(KernelError::Degenerate {
                reason: "extrusion vector lies in the profile plane".to_string(),
            });
        }
        let swept: Vec<Point3<f64>> = profile
            .vertices()
            .iter()
            .flat_map(|p| [*p, p + vector])
            .collect();
        let bb = BoundingBox::from_points(&swept).ok_or(KernelError::Degenerate {
            reason: "empty profile".to_string(),
        })?;
        Ok(self.store(Self::bounded_solid(bb, profile.area() * height)))
    }

    fn loft_profiles(
        &mut self,
        lower: &Profile,
        upper: &Profile,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("loft_profiles")?;
        if lower.vertices().len() != upper.vertices().len() {
            return Err(KernelError::Degenerate {
                reason: "loft loops differ in point count".to_string(),
            });
        }
        let height = (upper.centroid() - lower.centroid())
            .dot(&lower.normal())
            .abs();
        let bb = BoundingBox::from_points(lower.vertices().iter().chain(upper.vertices()))
            .ok_or(KernelError::Degenerate {
                reason: "empty profile".to_string(),
            })?;
        let volume = (lower.area() + upper.area()) / 2.0 * height;
        Ok(self.store(Self::bounded_solid(bb, volume)))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("boolean_union")?;
        let (sa, sb) = (self.get(a)?, self.get(b)?);
        let overlap: f64 = sa
            .boxes
            .iter()
            .flat_map(|x| sb.boxes.iter().map(move |y| x.intersection_volume(y)))
            .sum();
        let merged = MockSolid {
            boxes: sa.boxes.iter().chain(&sb.boxes).copied().collect(),
            volume: sa.volume + sb.volume - overlap.min(sb.volume),
            edges: sa.edges.iter().chain(&sb.edges).cloned().collect(),
        };
        Ok(self.store(merged))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("boolean_subtract")?;
        let (sa, sb) = (self.get(a)?, self.get(b)?);
        let removed: f64 = sa
            .boxes
            .iter()
            .flat_map(|x| sb.boxes.iter().map(move |y| x.intersection_volume(y)))
            .sum();
        let mut result = sa.clone();
        result.volume = (sa.volume - removed.min(sb.volume)).max(0.0);
        Ok(self.store(result))
    }

    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("fillet_edges")?;
        if radius <= 0.0 {
            return Err(KernelError::FilletFailed {
                reason: "radius must be positive".to_string(),
            });
        }
        let source = self.get(solid)?.clone();
        for &id in edges {
            if id.solid_part() != solid.id() || id.index_part() >= source.edges.len() {
                return Err(KernelError::EntityNotFound { id });
            }
        }
        Ok(self.store(source))
    }

    fn refine(&mut self, solid: &KernelSolidHandle) -> Result<KernelSolidHandle, KernelError> {
        self.record("refine")?;
        let source = self.get(solid)?.clone();
        Ok(self.store(source))
    }

    fn tessellate(&mut self, solid: &KernelSolidHandle) -> Result<RenderMesh, KernelError> {
        self.record("tessellate")?;
        Ok(Self::tessellate_boxes(self.get(solid)?))
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.op_log.push("release".to_string());
        self.solids.remove(&solid.id());
    }
}

impl KernelIntrospect for MockKernel {
    /// Clusters of touching or overlapping boxes.
    fn solid_count(&self, solid: &KernelSolidHandle) -> usize {
        let Ok(s) = self.get(solid) else { return 0 };
        let n = s.boxes.len();
        let mut cluster: Vec<usize> = (0..n).collect();
        for i in 0..n {
            for j in (i + 1)..n {
                if s.boxes[i].overlaps(&s.boxes[j], 1e-9) {
                    let (ci, cj) = (cluster[i], cluster[j]);
                    if ci != cj {
                        for c in cluster.iter_mut().filter(|c| **c == cj) {
                            *c = ci;
                        }
                    }
                }
            }
        }
        cluster.iter().collect::<BTreeSet<_>>().len()
    }

    fn volume(&self, solid: &KernelSolidHandle) -> f64 {
        self.get(solid).map(|s| s.volume).unwrap_or(0.0)
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<EdgeInfo> {
        let Ok(s) = self.get(solid) else {
            return Vec::new();
        };
        s.edges
            .iter()
            .enumerate()
            .map(|(i, e)| EdgeInfo {
                id: KernelId::entity(solid, i),
                curve: EdgeCurve::Line,
                start: e.start,
                end: e.end,
                midpoint: nalgebra::center(&e.start, &e.end),
                length: (e.end - e.start).norm(),
            })
            .collect()
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceInfo> {
        let Ok(s) = self.get(solid) else {
            return Vec::new();
        };
        let mut faces = Vec::new();
        for bb in &s.boxes {
            let size = bb.size();
            let center = bb.center();
            for axis in 0..3 {
                let area = size[(axis + 1) % 3] * size[(axis + 2) % 3];
                for side in [-1.0, 1.0] {
                    let mut normal = Vector3::zeros();
                    normal[axis] = side;
                    let mut centroid = center;
                    centroid[axis] += side * size[axis] / 2.0;
                    faces.push(FaceInfo {
                        id: KernelId::entity(solid, faces.len()),
                        surface: SurfaceKind::Planar,
                        normal: Some(normal),
                        area,
                        centroid,
                    });
                }
            }
        }
        faces
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox> {
        let s = self.get(solid).ok()?;
        let mut boxes = s.boxes.iter();
        let first = *boxes.next()?;
        Some(boxes.fold(first, |acc, b| acc.union(b)))
    }
}
