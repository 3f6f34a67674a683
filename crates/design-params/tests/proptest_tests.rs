//! Property-based tests for the parameter resolver.

use approx::assert_relative_eq;
use proptest::prelude::*;

use design_params::{DesignParameterSet, EnclosureParams, Product, SplineBracketParams};

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Tab angles strictly inside the valid open interval.
fn arb_tab_angle() -> impl Strategy<Value = f64> {
    0.5f64..89.5
}

fn arb_enclosure() -> impl Strategy<Value = EnclosureParams> {
    (arb_tab_angle(), 10.0f64..60.0, 1.0f64..10.0, 1.0f64..4.0).prop_map(
        |(angle, face_length, tab_wall, wall)| EnclosureParams {
            tab_angle_deg: angle,
            tab_face_length: face_length,
            tab_wall_thickness: tab_wall,
            wall_thickness: wall,
            ..EnclosureParams::revision_2()
        },
    )
}

// ---------------------------------------------------------------------------
// Face direction and inward normal are an orthonormal pair
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn face_frame_is_orthonormal(params in arb_enclosure()) {
        prop_assert!(params.validate().is_ok());
        let geom = params.resolve();
        prop_assert!((geom.face_dir.norm() - 1.0).abs() < TOL);
        prop_assert!((geom.inward.norm() - 1.0).abs() < TOL);
        prop_assert!(geom.face_dir.dot(&geom.inward).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// The inward normal points down into the box (negative Z component)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn inward_normal_points_into_part(params in arb_enclosure()) {
        let geom = params.resolve();
        prop_assert!(geom.inward.y < 0.0);
        let inner = geom.inner_face_center - geom.face_center;
        prop_assert!((inner.norm() - params.tab_wall_thickness).abs() < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Cavity is always the outer envelope minus the walls
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn cavity_is_inset_by_walls(
        width in 40.0f64..200.0,
        length in 20.0f64..200.0,
        height in 8.0f64..50.0,
        wall in 0.5f64..3.0,
    ) {
        let params = EnclosureParams {
            box_width: width,
            box_length: length,
            box_height: height,
            wall_thickness: wall,
            ..EnclosureParams::revision_1()
        };
        let geom = params.resolve();
        prop_assert!((geom.cavity.x - (width - 2.0 * wall)).abs() < TOL);
        prop_assert!((geom.cavity.y - (length - 2.0 * wall)).abs() < TOL);
        prop_assert!((geom.cavity.z - (height - wall)).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// Groove always clears the tongue by at least one unit
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn groove_clears_tongue(tongue in 2.0f64..30.0, clearance in 1.0f64..5.0) {
        let params = SplineBracketParams {
            tongue_width: tongue,
            vgroove_clearance: clearance,
            ..SplineBracketParams::revision_1()
        };
        prop_assert!(params.validate().is_ok());
        let geom = params.resolve();
        let groove = geom.vgroove_z_right - geom.vgroove_z_left;
        let tongue_base = geom.tongue_x_right - geom.tongue_x_left;
        prop_assert!(groove >= tongue_base + 1.0 - TOL);
    }
}

#[test]
fn revision_2_moves_strip_with_length() {
    let v1 = EnclosureParams::revision_1();
    let v2 = EnclosureParams::revision_2();
    assert_relative_eq!(
        v2.strip_center_y - v1.strip_center_y,
        v2.box_length - v1.box_length
    );
    assert_relative_eq!(v2.box_length, 79.0);
}

#[test]
fn revisions_are_independent_sets() {
    let v1 = DesignParameterSet::builtin(Product::CurrentLimitBox, 1).unwrap();
    let v2 = DesignParameterSet::builtin(Product::CurrentLimitBox, 2).unwrap();
    assert_eq!(v1.revision(), 1);
    assert_eq!(v2.revision(), 2);
    assert_ne!(v1, v2);
    v1.validate().unwrap();
    v2.validate().unwrap();
}
