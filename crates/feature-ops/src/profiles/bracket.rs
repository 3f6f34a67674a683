//! Features of the spline bracket pair.
//!
//! The holder sits above `y = 0` with its tongue hanging below. The gusset
//! bracket hangs below `y = 0`: a flange along X and a leg along -Y, joined
//! by two triangular ribs at either end of the part depth.

use design_params::SplineBracketGeometry;
use nalgebra::{Point2, Point3, Vector3};
use part_types::{Feature, GeometryError, ToolShape};

use super::{xy_profile, yz_profile};

// ── Holder ─────────────────────────────────────────────────────────────────

pub fn holder_block(g: &SplineBracketGeometry) -> Feature {
    let p = &g.params;
    Feature::fuse(
        "holder block",
        ToolShape::Block {
            origin: Point3::origin(),
            size: Vector3::new(p.part_width, p.holder_height, p.part_depth),
        },
    )
}

/// Groove outline in XY: straight walls, a taper toward the top, then a
/// short overshoot so the cutter clears the top face.
pub fn groove_outline(g: &SplineBracketGeometry) -> [Point2<f64>; 8] {
    let over = g.groove_y_top + g.params.groove_overshoot;
    [
        Point2::new(g.groove_x_left, g.groove_y_bottom),
        Point2::new(g.groove_x_right, g.groove_y_bottom),
        Point2::new(g.groove_x_right, g.groove_y_taper_start),
        Point2::new(g.groove_top_right, g.groove_y_top),
        Point2::new(g.groove_top_right, over),
        Point2::new(g.groove_top_left, over),
        Point2::new(g.groove_top_left, g.groove_y_top),
        Point2::new(g.groove_x_left, g.groove_y_taper_start),
    ]
}

pub fn holder_groove(g: &SplineBracketGeometry) -> Result<Feature, GeometryError> {
    let profile = xy_profile(0.0, &groove_outline(g))?;
    Ok(Feature::cut(
        "roadbed groove",
        ToolShape::Extrusion {
            profile,
            vector: Vector3::new(0.0, 0.0, g.params.part_depth),
        },
    ))
}

/// Triangular key under the holder, running the full depth.
pub fn holder_tongue(g: &SplineBracketGeometry) -> Result<Feature, GeometryError> {
    let profile = xy_profile(
        0.0,
        &[
            Point2::new(g.tongue_x_left, 0.0),
            Point2::new(g.tongue_x_right, 0.0),
            Point2::new(g.bolt_x, -g.params.tongue_depth),
        ],
    )?;
    Ok(Feature::fuse(
        "tongue",
        ToolShape::Extrusion {
            profile,
            vector: Vector3::new(0.0, 0.0, g.params.part_depth),
        },
    ))
}

pub fn holder_bolt(g: &SplineBracketGeometry) -> Feature {
    bolt(g, "holder bolt", g.holder_bolt_base, Vector3::y(), g.holder_bolt_length())
}

// ── Gusset bracket ─────────────────────────────────────────────────────────

pub fn flange(g: &SplineBracketGeometry) -> Feature {
    let p = &g.params;
    Feature::fuse(
        "flange",
        ToolShape::Block {
            origin: Point3::new(0.0, -p.flange_thickness, 0.0),
            size: Vector3::new(p.part_width, p.flange_thickness, p.part_depth),
        },
    )
}

pub fn leg(g: &SplineBracketGeometry) -> Feature {
    let p = &g.params;
    Feature::fuse(
        "leg",
        ToolShape::Block {
            origin: Point3::new(0.0, -p.leg_height, 0.0),
            size: Vector3::new(p.leg_thickness, p.leg_height, p.part_depth),
        },
    )
}

/// Seat for the holder tongue, cut across the flange top along X.
pub fn vgroove(g: &SplineBracketGeometry) -> Result<Feature, GeometryError> {
    let p = &g.params;
    let profile = yz_profile(
        0.0,
        &[
            Point2::new(p.vgroove_lip, g.vgroove_z_left),
            Point2::new(p.vgroove_lip, g.vgroove_z_right),
            Point2::new(-p.vgroove_depth, g.bolt_z),
        ],
    )?;
    Ok(Feature::cut(
        "V-groove",
        ToolShape::Extrusion {
            profile,
            vector: Vector3::new(p.part_width, 0.0, 0.0),
        },
    ))
}

pub fn upper_bolt(g: &SplineBracketGeometry) -> Feature {
    bolt(g, "upper bolt", g.upper_bolt_base, Vector3::y(), g.upper_bolt_length())
}

/// Mounting hole through the leg, horizontal.
pub fn lower_bolt(g: &SplineBracketGeometry) -> Feature {
    bolt(g, "lower bolt", g.lower_bolt_base, Vector3::x(), g.lower_bolt_length())
}

/// Two ribs, flush with the front and back faces.
pub fn gussets(g: &SplineBracketGeometry) -> Result<Vec<Feature>, GeometryError> {
    let t = g.params.gusset_thickness;
    [0.0, g.params.part_depth - t]
        .into_iter()
        .enumerate()
        .map(|(i, z)| {
            Ok(Feature::fuse(
                format!("gusset {}", i + 1),
                ToolShape::Extrusion {
                    profile: xy_profile(z, &g.gusset)?,
                    vector: Vector3::new(0.0, 0.0, t),
                },
            ))
        })
        .collect()
}

fn bolt(
    g: &SplineBracketGeometry,
    label: &str,
    base: Point3<f64>,
    axis: Vector3<f64>,
    length: f64,
) -> Feature {
    Feature::cut(
        label,
        ToolShape::Cylinder {
            base,
            axis,
            radius: g.params.bolt_diameter / 2.0,
            height: length,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use design_params::SplineBracketParams;
    use part_types::CombineMode;

    fn geometry() -> SplineBracketGeometry {
        SplineBracketParams::revision_1().resolve()
    }

    #[test]
    fn groove_outline_default_values() {
        let outline = groove_outline(&geometry());
        let expected = [
            (10.0, 10.0),
            (50.0, 10.0),
            (50.0, 27.0),
            (45.0, 32.0),
            (45.0, 33.0),
            (15.0, 33.0),
            (15.0, 32.0),
            (10.0, 27.0),
        ];
        for (p, (x, y)) in outline.iter().zip(expected) {
            assert_relative_eq!(p.x, x);
            assert_relative_eq!(p.y, y);
        }
    }

    #[test]
    fn groove_profile_area() {
        let f = holder_groove(&geometry()).unwrap();
        assert_eq!(f.mode, CombineMode::Cut);
        let ToolShape::Extrusion { profile, vector } = f.tool else {
            panic!("groove should be an extrusion");
        };
        // rectangle 40×17, trapezoid (40+30)/2×5, cap 30×1
        assert_relative_eq!(profile.area(), 680.0 + 175.0 + 30.0, epsilon = 1e-9);
        assert_eq!(vector, Vector3::new(0.0, 0.0, 60.0));
    }

    #[test]
    fn tongue_hangs_below_holder() {
        let f = holder_tongue(&geometry()).unwrap();
        assert_eq!(f.mode, CombineMode::Fuse);
        let ToolShape::Extrusion { profile, .. } = f.tool else {
            panic!("tongue should be an extrusion");
        };
        let (min, max) = profile.extent();
        assert_relative_eq!(min.y, -3.0);
        assert_relative_eq!(max.y, 0.0);
        assert_relative_eq!(profile.area(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn vgroove_clears_the_tongue() {
        let g = geometry();
        let ToolShape::Extrusion { profile, vector } = vgroove(&g).unwrap().tool else {
            panic!("V-groove should be an extrusion");
        };
        let (min, max) = profile.extent();
        assert_relative_eq!(max.z - min.z, g.vgroove_width);
        assert!(g.vgroove_width > g.params.tongue_width);
        assert_relative_eq!(min.y, -3.0);
        assert_eq!(vector, Vector3::new(60.0, 0.0, 0.0));
    }

    #[test]
    fn gussets_are_flush_with_part_faces() {
        let g = geometry();
        let ribs = gussets(&g).unwrap();
        let zs: Vec<f64> = ribs
            .iter()
            .map(|f| match &f.tool {
                ToolShape::Extrusion { profile, vector } => {
                    assert_eq!(*vector, Vector3::new(0.0, 0.0, 5.0));
                    profile.vertices()[0].z
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(zs, vec![0.0, 55.0]);
    }

    #[test]
    fn bolts_pierce_with_overshoot() {
        let g = geometry();
        let ToolShape::Cylinder { base, axis, radius, height } = lower_bolt(&g).tool else {
            panic!("bolt should be a cylinder");
        };
        assert_eq!(base, Point3::new(-1.0, -93.0, 30.0));
        assert_eq!(axis, Vector3::x());
        assert_relative_eq!(radius, 3.175);
        assert_relative_eq!(height, 12.0);
        assert_eq!(holder_bolt(&g).mode, CombineMode::Cut);
        assert_eq!(upper_bolt(&g).mode, CombineMode::Cut);
    }
}
