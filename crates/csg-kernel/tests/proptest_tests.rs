//! Property-based tests for the mesh kernel's boolean volume identities.

use proptest::prelude::*;

use csg_kernel::{BoundingBox, Kernel, KernelIntrospect, MeshKernel};
use nalgebra::{Point3, Vector3};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Axis-aligned box on a half-unit grid: (origin, size).
fn arb_grid_box() -> impl Strategy<Value = ((i32, i32, i32), (i32, i32, i32))> {
    ((0..8, 0..8, 0..8), (1..6, 1..6, 1..6))
}

fn to_box(((x, y, z), (w, l, h)): ((i32, i32, i32), (i32, i32, i32))) -> (Point3<f64>, Vector3<f64>) {
    (
        Point3::new(x as f64, y as f64, z as f64) * 0.5,
        Vector3::new(w as f64, l as f64, h as f64) * 0.5,
    )
}

fn overlap((oa, sa): (Point3<f64>, Vector3<f64>), (ob, sb): (Point3<f64>, Vector3<f64>)) -> f64 {
    let a = BoundingBox { min: oa, max: oa + sa };
    let b = BoundingBox { min: ob, max: ob + sb };
    a.intersection_volume(&b)
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. |A ∪ B| = |A| + |B| − |A ∩ B|
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn union_volume_identity(a in arb_grid_box(), b in arb_grid_box()) {
        let (a, b) = (to_box(a), to_box(b));
        let mut kernel = MeshKernel::default();
        let ha = kernel.make_box(a.0, a.1).unwrap();
        let hb = kernel.make_box(b.0, b.1).unwrap();
        let u = kernel.boolean_union(&ha, &hb).unwrap();

        let expected = kernel.volume(&ha) + kernel.volume(&hb) - overlap(a, b);
        let got = kernel.volume(&u);
        prop_assert!((got - expected).abs() < TOL, "union volume {} != {}", got, expected);
    }
}

// ---------------------------------------------------------------------------
// 2. |A − B| = |A| − |A ∩ B|
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn subtract_volume_identity(a in arb_grid_box(), b in arb_grid_box()) {
        let (a, b) = (to_box(a), to_box(b));
        let mut kernel = MeshKernel::default();
        let ha = kernel.make_box(a.0, a.1).unwrap();
        let hb = kernel.make_box(b.0, b.1).unwrap();
        let expected = kernel.volume(&ha) - overlap(a, b);

        match kernel.boolean_subtract(&ha, &hb) {
            Ok(d) => {
                let got = kernel.volume(&d);
                prop_assert!((got - expected).abs() < TOL, "difference volume {} != {}", got, expected);
            }
            // B swallowed A entirely.
            Err(_) => prop_assert!(expected.abs() < TOL),
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Refine never changes the enclosed volume
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn refine_preserves_volume(a in arb_grid_box(), b in arb_grid_box()) {
        let (a, b) = (to_box(a), to_box(b));
        let mut kernel = MeshKernel::default();
        let ha = kernel.make_box(a.0, a.1).unwrap();
        let hb = kernel.make_box(b.0, b.1).unwrap();
        let u = kernel.boolean_union(&ha, &hb).unwrap();
        let r = kernel.refine(&u).unwrap();
        prop_assert!((kernel.volume(&r) - kernel.volume(&u)).abs() < TOL);
    }
}
