//! Features of the current-limit box: a walled tray with an angled lamp tab.
//!
//! Tab features live on the slanted tab face. They are placed with
//! [`EnclosureGeometry::face_point`] and pushed along the inward normal, so
//! every cutter starts `tool_standoff` outside the face and runs
//! `tool_length` into the part.

use design_params::{ClipStyle, EnclosureGeometry};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use part_types::{Feature, GeometryError, Profile, ToolShape};

use super::{closed_loop, yz_profile};

/// A rectangle parallel to the tab face, in face coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRect {
    pub x: f64,
    pub along: f64,
    pub half_x: f64,
    pub half_along: f64,
    /// Offset along the inward normal; negative is outside the part.
    pub depth: f64,
}

impl FaceRect {
    pub fn corners(&self, g: &EnclosureGeometry) -> [Point3<f64>; 4] {
        let (x, a) = (self.x, self.along);
        let (hx, ha) = (self.half_x, self.half_along);
        [
            g.face_point(x - hx, a - ha, self.depth),
            g.face_point(x - hx, a + ha, self.depth),
            g.face_point(x + hx, a + ha, self.depth),
            g.face_point(x + hx, a - ha, self.depth),
        ]
    }

    pub fn profile(&self, g: &EnclosureGeometry) -> Result<Profile, GeometryError> {
        closed_loop(self.corners(g).to_vec())
    }
}

pub fn base_block(g: &EnclosureGeometry) -> Feature {
    let p = &g.params;
    Feature::fuse(
        "base block",
        ToolShape::Block {
            origin: Point3::origin(),
            size: Vector3::new(p.box_width, p.box_length, p.box_height),
        },
    )
}

/// Inset by the wall on every side it bounds and open at the top.
pub fn cavity(g: &EnclosureGeometry) -> Feature {
    let w = g.params.wall_thickness;
    Feature::cut(
        "cavity",
        ToolShape::Block {
            origin: Point3::new(w, w, w),
            size: g.cavity,
        },
    )
}

pub fn tab(g: &EnclosureGeometry) -> Result<Feature, GeometryError> {
    let profile = yz_profile(0.0, &g.tab_corners)?;
    Ok(Feature::fuse(
        "tab",
        ToolShape::Extrusion {
            profile,
            vector: Vector3::new(g.params.box_width, 0.0, 0.0),
        },
    ))
}

pub fn posts(g: &EnclosureGeometry) -> Vec<Feature> {
    g.post_centers
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Feature::fuse(
                format!("post {}", i + 1),
                ToolShape::Cylinder {
                    base: *c,
                    axis: Vector3::z(),
                    radius: g.params.post_radius,
                    height: g.params.post_height,
                },
            )
        })
        .collect()
}

fn face_cylinder(g: &EnclosureGeometry, label: String, x: f64, radius: f64) -> Feature {
    Feature::cut(
        label,
        ToolShape::Cylinder {
            base: g.face_point(x, 0.0, -g.params.tool_standoff),
            axis: g.inward_3d(),
            radius,
            height: g.params.tool_length,
        },
    )
}

/// Rectangle outside the face pushed through the tab.
fn face_cutter(g: &EnclosureGeometry, label: String, rect: FaceRect) -> Result<Feature, GeometryError> {
    Ok(Feature::cut(
        label,
        ToolShape::Extrusion {
            profile: rect.profile(g)?,
            vector: g.inward_3d() * g.params.tool_length,
        },
    ))
}

pub fn bulb_hole(g: &EnclosureGeometry) -> Feature {
    face_cylinder(g, "bulb hole".to_string(), g.params.bulb_x, g.bulb_radius)
}

/// Two key notches on opposite sides of the bulb hole, along the face.
pub fn notches(g: &EnclosureGeometry) -> Result<Vec<Feature>, GeometryError> {
    let p = &g.params;
    [-g.notch_offset, g.notch_offset]
        .into_iter()
        .enumerate()
        .map(|(i, along)| {
            let rect = FaceRect {
                x: p.bulb_x,
                along,
                half_x: p.bulb_notch_width / 2.0,
                half_along: p.bulb_notch_depth / 2.0,
                depth: -p.tool_standoff,
            };
            face_cutter(g, format!("bulb notch {}", i + 1), rect)
        })
        .collect()
}

/// Bulb retaining clips on either side of the hole, on the inner face.
pub fn clips(g: &EnclosureGeometry) -> Result<Vec<Feature>, GeometryError> {
    g.clip_xs
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let label = format!("clip {}", i + 1);
            let tool = match g.params.clip_style {
                ClipStyle::Straight => straight_clip(g, x)?,
                ClipStyle::Tapered => tapered_clip(g, x)?,
            };
            Ok(Feature::fuse(label, tool))
        })
        .collect()
}

fn straight_clip(g: &EnclosureGeometry, x: f64) -> Result<ToolShape, GeometryError> {
    let p = &g.params;
    let (hx, ha) = (p.clip_thickness / 2.0, p.clip_width / 2.0);
    let profile = closed_loop(vec![
        g.inner_face_point(x - hx, -ha, 0.0),
        g.inner_face_point(x - hx, ha, 0.0),
        g.inner_face_point(x + hx, ha, 0.0),
        g.inner_face_point(x + hx, -ha, 0.0),
    ])?;
    Ok(ToolShape::Extrusion {
        profile,
        vector: g.inward_3d() * p.clip_depth,
    })
}

fn tapered_clip(g: &EnclosureGeometry, x: f64) -> Result<ToolShape, GeometryError> {
    let p = &g.params;
    let section = tapered_wedge_section(
        g.inner_face_center,
        g.face_dir,
        g.inward,
        p.clip_width / 2.0,
        p.clip_depth,
    );
    let profile = yz_profile(x - p.clip_thickness / 2.0, &section)?;
    Ok(ToolShape::Extrusion {
        profile,
        vector: Vector3::new(p.clip_thickness, 0.0, 0.0),
    })
}

/// Cross-section of a printable clip wedge in the YZ plane.
///
/// The near edge lies on the inner face, the top edge follows the inward
/// normal for `depth`, the far end is vertical and at least 1 tall, and the
/// bottom edge is horizontal.
pub fn tapered_wedge_section(
    inner_center: Point2<f64>,
    face_dir: Vector2<f64>,
    inward: Vector2<f64>,
    half_width: f64,
    depth: f64,
) -> [Point2<f64>; 4] {
    let near_low = inner_center - face_dir * half_width;
    let near_high = inner_center + face_dir * half_width;
    let tip = near_high + inward * depth;
    let far_top = Point2::new(tip.x, tip.y.max(near_low.y + 1.0));
    let far_bottom = Point2::new(tip.x, near_low.y);
    [near_low, near_high, far_top, far_bottom]
}

pub fn switch_cutout_rect(g: &EnclosureGeometry) -> FaceRect {
    let p = &g.params;
    FaceRect {
        x: p.switch_x,
        along: 0.0,
        half_x: p.switch_cutout_width / 2.0,
        half_along: p.switch_cutout_height / 2.0,
        depth: -p.tool_standoff,
    }
}

pub fn switch_cutout(g: &EnclosureGeometry) -> Result<Feature, GeometryError> {
    face_cutter(g, "switch cutout".to_string(), switch_cutout_rect(g))
}

/// Loops of the bevel cutter: the outer one on the face, widened by `depth`
/// on each side, the inner one `depth` below the face at cutout size.
pub fn chamfer_loops(g: &EnclosureGeometry, depth: f64) -> (FaceRect, FaceRect) {
    let cutout = switch_cutout_rect(g);
    let outer = FaceRect {
        half_x: cutout.half_x + depth,
        half_along: cutout.half_along + depth,
        depth: 0.0,
        ..cutout
    };
    let inner = FaceRect {
        depth,
        ..cutout
    };
    (outer, inner)
}

/// 45° bevel around the switch opening; `None` when the revision has none.
pub fn switch_chamfer(g: &EnclosureGeometry) -> Result<Option<Feature>, GeometryError> {
    let Some(depth) = g.params.switch_chamfer_depth else {
        return Ok(None);
    };
    let (outer, inner) = chamfer_loops(g, depth);
    Ok(Some(Feature::cut(
        "switch chamfer",
        ToolShape::Loft {
            lower: outer.profile(g)?,
            upper: inner.profile(g)?,
        },
    )))
}

pub fn screw_holes(g: &EnclosureGeometry) -> Vec<Feature> {
    let radius = g.params.switch_screw_diameter / 2.0;
    g.screw_xs
        .iter()
        .enumerate()
        .map(|(i, &x)| face_cylinder(g, format!("switch screw {}", i + 1), x, radius))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use design_params::EnclosureParams;

    fn rev1() -> EnclosureGeometry {
        EnclosureParams::revision_1().resolve()
    }

    fn rev2() -> EnclosureGeometry {
        EnclosureParams::revision_2().resolve()
    }

    #[test]
    fn cavity_is_flush_with_top() {
        let g = rev1();
        let ToolShape::Block { origin, size } = cavity(&g).tool else {
            panic!("cavity should be a block");
        };
        assert_eq!(origin, Point3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(size, Vector3::new(76.0, 45.0, 15.0));
        assert_relative_eq!(origin.z + size.z, g.params.box_height);
    }

    #[test]
    fn tab_spans_box_width() {
        let g = rev1();
        let ToolShape::Extrusion { profile, vector } = tab(&g).unwrap().tool else {
            panic!("tab should be an extrusion");
        };
        assert_eq!(vector, Vector3::new(80.0, 0.0, 0.0));
        assert_eq!(profile.vertices().len(), 4);
        // face length × wall thickness
        assert_relative_eq!(profile.area(), 35.0 * 5.0, epsilon = 1e-9);
    }

    #[test]
    fn face_rect_corners_lie_on_offset_plane() {
        let g = rev1();
        let rect = switch_cutout_rect(&g);
        for c in rect.corners(&g) {
            let rel = c - g.face_point(c.x, 0.0, 0.0);
            assert_relative_eq!(rel.dot(&g.inward_3d()), -2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn notches_straddle_the_hole() {
        let g = rev1();
        let features = notches(&g).unwrap();
        assert_eq!(features.len(), 2);
        for f in &features {
            let ToolShape::Extrusion { profile, vector } = &f.tool else {
                panic!("notch should be an extrusion");
            };
            assert_relative_eq!(profile.area(), 3.0 * 4.0, epsilon = 1e-9);
            assert_relative_eq!(vector.norm(), 10.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn revision_one_clips_are_straight() {
        let g = rev1();
        let features = clips(&g).unwrap();
        assert_eq!(features.len(), 2);
        let ToolShape::Extrusion { vector, .. } = &features[0].tool else {
            panic!("clip should be an extrusion");
        };
        assert_relative_eq!(*vector, g.inward_3d() * 12.0, epsilon = 1e-12);
    }

    #[test]
    fn revision_two_clips_are_tapered() {
        let g = rev2();
        let features = clips(&g).unwrap();
        let ToolShape::Extrusion { profile, vector } = &features[1].tool else {
            panic!("clip should be an extrusion");
        };
        assert_eq!(*vector, Vector3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(profile.vertices()[0].x, g.clip_xs[1] - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn chamfer_only_in_revision_two() {
        assert!(switch_chamfer(&rev1()).unwrap().is_none());
        let chamfer = switch_chamfer(&rev2()).unwrap().unwrap();
        assert!(matches!(chamfer.tool, ToolShape::Loft { .. }));
    }

    #[test]
    fn screw_holes_flank_the_switch() {
        let g = rev1();
        let holes = screw_holes(&g);
        let xs: Vec<f64> = holes
            .iter()
            .map(|f| match &f.tool {
                ToolShape::Cylinder { base, .. } => base.x,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(xs, vec![55.0 - 18.75, 55.0 + 18.75]);
    }

    #[test]
    fn four_posts_on_the_floor() {
        let g = rev1();
        let p = posts(&g);
        assert_eq!(p.len(), 4);
        assert!(p.iter().all(|f| matches!(
            f.tool,
            ToolShape::Cylinder { base, .. } if base.z == 2.0
        )));
    }
}
