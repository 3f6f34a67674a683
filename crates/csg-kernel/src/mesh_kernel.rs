//! MeshKernel: polyhedral CSG on csgrs.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use part_types::Profile;
use tracing::{debug, info, instrument};

use crate::fillet::fillet_tools;
use crate::polygon::{enclosed_volume, from_csg, to_csg, Polygon, Solid};
use crate::primitives;
use crate::tessellation;
use crate::topology::{refine_polygons, Topology};
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

/// Face ids live above edge ids within one solid.
const FACE_INDEX_BASE: usize = 1 << 31;

struct MeshSolid {
    csg: Solid,
    /// Facets of `csg`, read back once.
    polygons: Vec<Polygon>,
    topology: OnceCell<Topology>,
}

impl MeshSolid {
    fn new(csg: Solid) -> Self {
        Self {
            polygons: from_csg(&csg),
            csg,
            topology: OnceCell::new(),
        }
    }

    fn topology(&self) -> &Topology {
        self.topology.get_or_init(|| Topology::analyze(&self.polygons))
    }

    fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.polygons.iter().flat_map(|p| p.vertices.iter()))
    }
}

/// Solid kernel whose solids are `csgrs` polygon sets tagged by surface.
///
/// Curved primitives are faceted once, at creation, using the kernel's
/// [`Deflection`]; two kernels with different deflections build different
/// meshes from the same calls.
pub struct MeshKernel {
    deflection: Deflection,
    next_handle: u64,
    next_surface: u32,
    solids: BTreeMap<u64, MeshSolid>,
}

impl MeshKernel {
    pub fn new(deflection: Deflection) -> Self {
        Self {
            deflection,
            next_handle: 1,
            next_surface: 1,
            solids: BTreeMap::new(),
        }
    }

    pub fn deflection(&self) -> Deflection {
        self.deflection
    }

    /// Number of solids currently held.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_surface(&mut self) -> u32 {
        let s = self.next_surface;
        self.next_surface += 1;
        s
    }

    fn store_solid(&mut self, csg: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), MeshSolid::new(csg));
        handle
    }

    fn get_solid(&self, handle: &KernelSolidHandle) -> Result<&MeshSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound {
                handle: handle.id(),
            })
    }

    fn combine(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
        fuse: bool,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?;
        let solid_b = self.get_solid(b)?;

        let disjoint = match (solid_a.bounds(), solid_b.bounds()) {
            (Some(ba), Some(bb)) => !ba.overlaps(&bb, 0.0),
            _ => true,
        };
        let polygons = match (fuse, disjoint) {
            (true, true) => {
                let mut all = solid_a.polygons.clone();
                all.extend(solid_b.polygons.iter().cloned());
                all
            }
            (false, true) => solid_a.polygons.clone(),
            (true, false) => refine_polygons(&from_csg(&solid_a.csg.union(&solid_b.csg))),
            (false, false) => refine_polygons(&from_csg(&solid_a.csg.difference(&solid_b.csg))),
        };

        if polygons.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "result is empty".to_string(),
            });
        }
        debug!(polygons = polygons.len(), disjoint, "boolean done");
        Ok(self.store_solid(to_csg(&polygons)))
    }
}

impl Default for MeshKernel {
    fn default() -> Self {
        Self::new(Deflection::STANDARD)
    }
}

impl Kernel for MeshKernel {
    #[instrument(skip(self))]
    fn make_box(
        &mut self,
        origin: Point3<f64>,
        size: Vector3<f64>,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = primitives::box_solid(origin, size)?;
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self))]
    fn make_cylinder(
        &mut self,
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let segments = self.deflection.segments(radius);
        let surface = self.alloc_surface();
        let solid = primitives::cylinder_solid(base, axis, radius, height, segments, surface)?;
        debug!(segments, "faceted cylinder");
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self, profile), fields(points = profile.vertices().len()))]
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        vector: Vector3<f64>,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = primitives::extrusion_solid(profile, vector)?;
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self, lower, upper))]
    fn loft_profiles(
        &mut self,
        lower: &Profile,
        upper: &Profile,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = primitives::loft_solid(lower, upper)?;
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self))]
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.combine(a, b, true)
    }

    #[instrument(skip(self))]
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.combine(a, b, false)
    }

    #[instrument(skip(self, edges), fields(edges = edges.len()))]
    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        if edges.is_empty() {
            return Err(KernelError::FilletFailed {
                reason: "no edges given".to_string(),
            });
        }
        let first_surface = self.next_surface;
        let deflection = self.deflection;
        let target = self.get_solid(solid)?;
        let topology = target.topology();

        let mut indices = Vec::with_capacity(edges.len());
        for &id in edges {
            if id.solid_part() != solid.id() || id.index_part() >= topology.edges.len() {
                return Err(KernelError::EntityNotFound { id });
            }
            indices.push(id.index_part());
        }

        let tools = fillet_tools(topology, &indices, radius, &deflection, first_surface)?;
        let mut body = target.csg.clone();
        for tool in tools {
            let cutter = to_csg(&tool.polygons);
            body = if tool.concave {
                body.union(&cutter)
            } else {
                body.difference(&cutter)
            };
        }
        let polygons = refine_polygons(&from_csg(&body));
        if polygons.is_empty() {
            return Err(KernelError::FilletFailed {
                reason: "rounding consumed the solid".to_string(),
            });
        }

        self.next_surface += edges.len() as u32;
        info!(edges = edges.len(), radius, "rounded edges");
        Ok(self.store_solid(to_csg(&polygons)))
    }

    #[instrument(skip(self))]
    fn refine(&mut self, solid: &KernelSolidHandle) -> Result<KernelSolidHandle, KernelError> {
        let polygons = refine_polygons(&self.get_solid(solid)?.polygons);
        Ok(self.store_solid(to_csg(&polygons)))
    }

    #[instrument(skip(self))]
    fn tessellate(&mut self, solid: &KernelSolidHandle) -> Result<RenderMesh, KernelError> {
        let mesh = tessellation::tessellate(&self.get_solid(solid)?.csg)?;
        debug!(triangles = mesh.triangle_count(), "tessellated");
        Ok(mesh)
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }
}

impl KernelIntrospect for MeshKernel {
    fn solid_count(&self, solid: &KernelSolidHandle) -> usize {
        self.get_solid(solid)
            .map(|s| s.topology().components)
            .unwrap_or(0)
    }

    fn volume(&self, solid: &KernelSolidHandle) -> f64 {
        self.get_solid(solid)
            .map(|s| enclosed_volume(&s.polygons))
            .unwrap_or(0.0)
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<EdgeInfo> {
        let Ok(target) = self.get_solid(solid) else {
            return Vec::new();
        };
        let topology = target.topology();
        let positions = &topology.mesh.positions;
        topology
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| EdgeInfo {
                id: KernelId::entity(solid, i),
                curve: e.curve,
                start: positions[e.chain[0]],
                end: positions[e.chain[e.chain.len() - 1]],
                midpoint: e.midpoint(positions),
                length: e.length,
            })
            .collect()
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceInfo> {
        let Ok(target) = self.get_solid(solid) else {
            return Vec::new();
        };
        target
            .topology()
            .faces
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let surface = f.kind();
                FaceInfo {
                    id: KernelId::entity(solid, FACE_INDEX_BASE + i),
                    surface,
                    normal: (surface == SurfaceKind::Planar).then_some(f.plane.normal),
                    area: f.area,
                    centroid: f.centroid,
                }
            })
            .collect()
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox> {
        self.get_solid(solid).ok()?.bounds()
    }
}
