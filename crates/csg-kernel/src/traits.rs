use nalgebra::{Point3, Vector3};
use part_types::Profile;

use crate::types::*;

/// Core kernel trait: solid construction, booleans and export.
/// Implemented by MeshKernel (polyhedral CSG on csgrs) and MockKernel (deterministic test double).
///
/// Solids are immutable once created; every operation returns a new handle
/// and leaves its inputs untouched.
pub trait Kernel {
    /// Axis-aligned box from `origin` spanning `size`.
    fn make_box(
        &mut self,
        origin: Point3<f64>,
        size: Vector3<f64>,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Circular cylinder whose base disc is centered at `base`.
    fn make_cylinder(
        &mut self,
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Sweep a closed profile along a straight vector.
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        vector: Vector3<f64>,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Ruled solid between two loops with matching point order.
    fn loft_profiles(
        &mut self,
        lower: &Profile,
        upper: &Profile,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Round the given edges with a constant radius in one operation.
    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Merge coplanar fragments of the same face without changing volume.
    fn refine(&mut self, solid: &KernelSolidHandle) -> Result<KernelSolidHandle, KernelError>;

    /// Tessellate a solid to a triangle mesh at the kernel's deflection.
    fn tessellate(&mut self, solid: &KernelSolidHandle) -> Result<RenderMesh, KernelError>;

    /// Drop a solid. Releasing an unknown handle is a no-op.
    fn release(&mut self, solid: &KernelSolidHandle);
}

/// Read-only queries on kernel solids.
pub trait KernelIntrospect {
    /// Number of connected solids the handle resolves to.
    fn solid_count(&self, solid: &KernelSolidHandle) -> usize;

    /// Enclosed volume.
    fn volume(&self, solid: &KernelSolidHandle) -> f64;

    /// All edges between distinct faces, in a deterministic order.
    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<EdgeInfo>;

    /// All faces, in a deterministic order.
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceInfo>;

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox>;
}
