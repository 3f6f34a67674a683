use approx::assert_relative_eq;
use csg_kernel::{
    Deflection, EdgeCurve, Kernel, KernelError, KernelIntrospect, MeshKernel, SurfaceKind,
};
use nalgebra::{Point3, Vector3};
use part_types::Profile;

fn polygon_area(radius: f64, segments: usize) -> f64 {
    0.5 * segments as f64 * radius * radius * (std::f64::consts::TAU / segments as f64).sin()
}

// ── Primitives ─────────────────────────────────────────────────────────────

#[test]
fn box_has_six_faces_and_twelve_edges() {
    let mut kernel = MeshKernel::default();
    let b = kernel
        .make_box(Point3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0))
        .unwrap();
    assert_relative_eq!(kernel.volume(&b), 120.0, epsilon = 1e-9);
    assert_eq!(kernel.solid_count(&b), 1);

    let faces = kernel.list_faces(&b);
    assert_eq!(faces.len(), 6);
    assert!(faces.iter().all(|f| f.surface == SurfaceKind::Planar));
    let total: f64 = faces.iter().map(|f| f.area).sum();
    assert_relative_eq!(total, 2.0 * (20.0 + 24.0 + 30.0), epsilon = 1e-9);

    let edges = kernel.list_edges(&b);
    assert_eq!(edges.len(), 12);
    assert!(edges.iter().all(|e| e.curve == EdgeCurve::Line));

    let bb = kernel.bounding_box(&b).unwrap();
    assert_eq!(bb.min, Point3::new(1.0, 2.0, 3.0));
    assert_eq!(bb.max, Point3::new(5.0, 7.0, 9.0));
}

#[test]
fn zero_size_box_is_degenerate() {
    let mut kernel = MeshKernel::default();
    let result = kernel.make_box(Point3::origin(), Vector3::new(1.0, 0.0, 1.0));
    assert!(matches!(result, Err(KernelError::Degenerate { .. })));
}

#[test]
fn extruded_triangle_volume() {
    let mut kernel = MeshKernel::default();
    let profile = Profile::closed(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 4.0, 0.0),
        Point3::new(0.0, 0.0, 3.0),
        Point3::new(0.0, 0.0, 0.0),
    ])
    .unwrap();
    let prism = kernel
        .extrude_profile(&profile, Vector3::new(10.0, 0.0, 0.0))
        .unwrap();
    assert_relative_eq!(kernel.volume(&prism), 60.0, epsilon = 1e-9);
    assert_eq!(kernel.list_faces(&prism).len(), 5);
    assert_eq!(kernel.list_edges(&prism).len(), 9);
}

// ── Booleans ───────────────────────────────────────────────────────────────

#[test]
fn through_hole_volume_and_topology() {
    let mut kernel = MeshKernel::new(Deflection::STANDARD);
    let block = kernel
        .make_box(Point3::origin(), Vector3::new(10.0, 10.0, 10.0))
        .unwrap();
    let drill = kernel
        .make_cylinder(Point3::new(5.0, 5.0, -1.0), Vector3::z(), 2.0, 12.0)
        .unwrap();
    let holed = kernel.boolean_subtract(&block, &drill).unwrap();

    let segments = Deflection::STANDARD.segments(2.0);
    let expected = 1000.0 - polygon_area(2.0, segments) * 10.0;
    assert_relative_eq!(kernel.volume(&holed), expected, epsilon = 1e-6);
    assert_eq!(kernel.solid_count(&holed), 1);

    let faces = kernel.list_faces(&holed);
    assert_eq!(faces.len(), 7);
    assert_eq!(
        faces.iter().filter(|f| f.surface == SurfaceKind::Curved).count(),
        1
    );
    let edges = kernel.list_edges(&holed);
    assert_eq!(edges.len(), 14);
    assert_eq!(edges.iter().filter(|e| e.curve == EdgeCurve::Curve).count(), 2);
}

#[test]
fn union_and_subtract_volume_identities() {
    let mut kernel = MeshKernel::default();
    let a = kernel
        .make_box(Point3::origin(), Vector3::new(4.0, 4.0, 4.0))
        .unwrap();
    let b = kernel
        .make_box(Point3::new(2.0, 1.0, -1.0), Vector3::new(4.0, 2.0, 2.0))
        .unwrap();
    let overlap = 2.0 * 2.0 * 1.0;

    let u = kernel.boolean_union(&a, &b).unwrap();
    let d = kernel.boolean_subtract(&a, &b).unwrap();
    assert_relative_eq!(kernel.volume(&u), 64.0 + 16.0 - overlap, epsilon = 1e-9);
    assert_relative_eq!(kernel.volume(&d), 64.0 - overlap, epsilon = 1e-9);
    assert_relative_eq!(
        kernel.volume(&u),
        kernel.volume(&d) + kernel.volume(&b),
        epsilon = 1e-9
    );
}

#[test]
fn disjoint_union_reports_two_solids() {
    let mut kernel = MeshKernel::default();
    let a = kernel
        .make_box(Point3::origin(), Vector3::new(1.0, 1.0, 1.0))
        .unwrap();
    let b = kernel
        .make_box(Point3::new(5.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
        .unwrap();
    let u = kernel.boolean_union(&a, &b).unwrap();
    assert_eq!(kernel.solid_count(&u), 2);
    assert_relative_eq!(kernel.volume(&u), 2.0, epsilon = 1e-12);
}

#[test]
fn subtract_of_disjoint_tool_keeps_body() {
    let mut kernel = MeshKernel::default();
    let a = kernel
        .make_box(Point3::origin(), Vector3::new(1.0, 1.0, 1.0))
        .unwrap();
    let b = kernel
        .make_box(Point3::new(5.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
        .unwrap();
    let d = kernel.boolean_subtract(&a, &b).unwrap();
    assert_relative_eq!(kernel.volume(&d), 1.0, epsilon = 1e-12);
}

#[test]
fn subtracting_everything_fails() {
    let mut kernel = MeshKernel::default();
    let a = kernel
        .make_box(Point3::origin(), Vector3::new(1.0, 1.0, 1.0))
        .unwrap();
    let b = kernel
        .make_box(Point3::new(-1.0, -1.0, -1.0), Vector3::new(3.0, 3.0, 3.0))
        .unwrap();
    assert!(matches!(
        kernel.boolean_subtract(&a, &b),
        Err(KernelError::BooleanFailed { .. })
    ));
}

// ── Refine, fillet, tessellate ─────────────────────────────────────────────

#[test]
fn refine_keeps_volume_and_merges_faces() {
    let mut kernel = MeshKernel::default();
    let mut body = kernel
        .make_box(Point3::origin(), Vector3::new(1.0, 1.0, 1.0))
        .unwrap();
    for i in 1..4 {
        let next = kernel
            .make_box(Point3::new(i as f64, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
            .unwrap();
        body = kernel.boolean_union(&body, &next).unwrap();
    }
    let refined = kernel.refine(&body).unwrap();
    assert_relative_eq!(kernel.volume(&refined), 4.0, epsilon = 1e-9);
    assert_relative_eq!(kernel.volume(&refined), kernel.volume(&body), epsilon = 1e-12);
    assert_eq!(kernel.list_faces(&refined).len(), 6);
    assert_eq!(kernel.list_edges(&refined).len(), 12);
}

#[test]
fn concave_fillet_adds_material() {
    let mut kernel = MeshKernel::default();
    let floor = kernel
        .make_box(Point3::origin(), Vector3::new(20.0, 5.0, 10.0))
        .unwrap();
    let wall = kernel
        .make_box(Point3::origin(), Vector3::new(5.0, 20.0, 10.0))
        .unwrap();
    let l = kernel.boolean_union(&floor, &wall).unwrap();
    let before = kernel.volume(&l);

    let inner = kernel
        .list_edges(&l)
        .into_iter()
        .find(|e| (e.midpoint - Point3::new(5.0, 5.0, 5.0)).norm() < 1e-6)
        .unwrap();
    assert_eq!(inner.curve, EdgeCurve::Line);
    assert_relative_eq!(inner.length, 10.0, epsilon = 1e-9);

    let rounded = kernel.fillet_edges(&l, &[inner.id], 2.0).unwrap();
    let added = kernel.volume(&rounded) - before;
    let exact = (4.0 - std::f64::consts::PI) * 10.0;
    assert!(added > exact && added < exact * 1.2, "added {added}");
    assert_eq!(kernel.solid_count(&rounded), 1);
    assert!(kernel
        .list_faces(&rounded)
        .iter()
        .any(|f| f.surface == SurfaceKind::Curved));
}

#[test]
fn tessellation_is_deterministic() {
    fn build() -> Vec<u8> {
        let mut kernel = MeshKernel::default();
        let block = kernel
            .make_box(Point3::origin(), Vector3::new(10.0, 8.0, 6.0))
            .unwrap();
        let drill = kernel
            .make_cylinder(Point3::new(5.0, 4.0, -1.0), Vector3::z(), 1.5, 8.0)
            .unwrap();
        let holed = kernel.boolean_subtract(&block, &drill).unwrap();
        let mesh = kernel.tessellate(&holed).unwrap();
        mesh.vertices
            .iter()
            .chain(&mesh.normals)
            .flat_map(|f| f.to_le_bytes())
            .chain(mesh.indices.iter().flat_map(|i| i.to_le_bytes()))
            .collect()
    }
    assert_eq!(build(), build());
}

#[test]
fn tessellated_box_is_closed() {
    let mut kernel = MeshKernel::default();
    let b = kernel
        .make_box(Point3::origin(), Vector3::new(2.0, 2.0, 2.0))
        .unwrap();
    let mesh = kernel.tessellate(&b).unwrap();
    // Divergence theorem over the triangles recovers the volume.
    let p = |i: u32| {
        let i = i as usize * 3;
        Vector3::new(
            mesh.vertices[i] as f64,
            mesh.vertices[i + 1] as f64,
            mesh.vertices[i + 2] as f64,
        )
    };
    let volume: f64 = mesh
        .indices
        .chunks(3)
        .map(|t| p(t[0]).dot(&p(t[1]).cross(&p(t[2]))) / 6.0)
        .sum();
    assert_relative_eq!(volume, 8.0, epsilon = 1e-5);
}
