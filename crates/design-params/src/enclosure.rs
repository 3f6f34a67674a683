//! The current-limit enclosure: an open box with an angled front tab carrying
//! a bulb holder and a slide switch.
//!
//! Tab geometry lives in the YZ plane and is extruded along X. Two-dimensional
//! points and vectors in this module are stored as `(y, z)`.

use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::errors::{positive, ParamError};

/// Shape of the two friction clips flanking the bulb hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipStyle {
    /// Rectangle on the inner tab face pushed straight along the inward normal.
    Straight,
    /// Wedge whose bottom edge stays level so it prints without overhang.
    Tapered,
}

/// Every dimension of one enclosure revision, in millimetres and degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnclosureParams {
    pub revision: u32,

    pub box_width: f64,
    pub box_length: f64,
    pub box_height: f64,
    pub wall_thickness: f64,

    pub tab_angle_deg: f64,
    pub tab_face_length: f64,
    pub tab_wall_thickness: f64,

    pub post_radius: f64,
    pub post_height: f64,
    pub strip_center_y: f64,
    pub post_x_spacing: f64,
    pub post_y_spacing: f64,

    pub bulb_x: f64,
    pub bulb_hole_diameter: f64,
    pub bulb_notch_width: f64,
    pub bulb_notch_depth: f64,

    pub clip_style: ClipStyle,
    pub clip_thickness: f64,
    pub clip_width: f64,
    pub clip_depth: f64,
    pub clip_gap: f64,

    pub switch_x: f64,
    pub switch_cutout_width: f64,
    pub switch_cutout_height: f64,
    pub switch_screw_spacing: f64,
    pub switch_screw_diameter: f64,
    /// Bevel around the switch cutout; `None` leaves a sharp edge.
    pub switch_chamfer_depth: Option<f64>,

    /// Distance outside the tab face where cutting tools start.
    pub tool_standoff: f64,
    /// Length of every cutting tool pushed through the tab.
    pub tool_length: f64,
}

impl Default for EnclosureParams {
    fn default() -> Self {
        Self::revision_1()
    }
}

impl EnclosureParams {
    /// First release: 49 mm deep box with straight clips.
    pub fn revision_1() -> Self {
        Self {
            revision: 1,
            box_width: 80.0,
            box_length: 49.0,
            box_height: 17.0,
            wall_thickness: 2.0,
            tab_angle_deg: 55.0,
            tab_face_length: 35.0,
            tab_wall_thickness: 5.0,
            post_radius: 1.95,
            post_height: 6.35,
            strip_center_y: 24.0,
            post_x_spacing: 57.0,
            post_y_spacing: 7.88,
            bulb_x: 20.0,
            bulb_hole_diameter: 15.5,
            bulb_notch_width: 3.0,
            bulb_notch_depth: 4.0,
            clip_style: ClipStyle::Straight,
            clip_thickness: 2.0,
            clip_width: 10.0,
            clip_depth: 12.0,
            clip_gap: 0.5,
            switch_x: 55.0,
            switch_cutout_width: 11.8,
            switch_cutout_height: 6.3,
            switch_screw_spacing: 37.5,
            switch_screw_diameter: 3.2,
            switch_chamfer_depth: None,
            tool_standoff: 2.0,
            tool_length: 10.0,
        }
    }

    /// Deeper box with the terminal strip moved back by the same amount,
    /// printable tapered clips and a chamfered switch opening.
    pub fn revision_2() -> Self {
        Self {
            revision: 2,
            box_width: 80.0,
            box_length: 79.0,
            box_height: 17.0,
            wall_thickness: 2.0,
            tab_angle_deg: 55.0,
            tab_face_length: 35.0,
            tab_wall_thickness: 5.0,
            post_radius: 1.95,
            post_height: 6.35,
            strip_center_y: 54.0,
            post_x_spacing: 57.0,
            post_y_spacing: 7.88,
            bulb_x: 20.0,
            bulb_hole_diameter: 15.5,
            bulb_notch_width: 3.0,
            bulb_notch_depth: 4.0,
            clip_style: ClipStyle::Tapered,
            clip_thickness: 2.0,
            clip_width: 10.0,
            clip_depth: 10.0,
            clip_gap: 0.5,
            switch_x: 55.0,
            switch_cutout_width: 11.8,
            switch_cutout_height: 6.3,
            switch_screw_spacing: 37.5,
            switch_screw_diameter: 3.2,
            switch_chamfer_depth: Some(1.0),
            tool_standoff: 2.0,
            tool_length: 10.0,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("box_width", self.box_width),
            ("box_length", self.box_length),
            ("box_height", self.box_height),
            ("wall_thickness", self.wall_thickness),
            ("tab_face_length", self.tab_face_length),
            ("tab_wall_thickness", self.tab_wall_thickness),
            ("post_radius", self.post_radius),
            ("post_height", self.post_height),
            ("post_x_spacing", self.post_x_spacing),
            ("post_y_spacing", self.post_y_spacing),
            ("bulb_hole_diameter", self.bulb_hole_diameter),
            ("bulb_notch_width", self.bulb_notch_width),
            ("bulb_notch_depth", self.bulb_notch_depth),
            ("clip_thickness", self.clip_thickness),
            ("clip_width", self.clip_width),
            ("clip_depth", self.clip_depth),
            ("switch_cutout_width", self.switch_cutout_width),
            ("switch_cutout_height", self.switch_cutout_height),
            ("switch_screw_spacing", self.switch_screw_spacing),
            ("switch_screw_diameter", self.switch_screw_diameter),
            ("tool_standoff", self.tool_standoff),
            ("tool_length", self.tool_length),
        ] {
            positive(name, value)?;
        }
        if let Some(depth) = self.switch_chamfer_depth {
            positive("switch_chamfer_depth", depth)?;
        }
        if self.clip_gap < 0.0 {
            return Err(ParamError::NonPositive {
                name: "clip_gap",
                value: self.clip_gap,
            });
        }

        if !(self.tab_angle_deg > 0.0 && self.tab_angle_deg < 90.0) {
            return Err(ParamError::DegenerateTabAngle {
                degrees: self.tab_angle_deg,
            });
        }

        let cavity = [
            ("x", self.box_width - 2.0 * self.wall_thickness),
            ("y", self.box_length - 2.0 * self.wall_thickness),
            ("z", self.box_height - self.wall_thickness),
        ];
        for (axis, extent) in cavity {
            if extent <= 0.0 {
                return Err(ParamError::CavityCollapsed { axis });
            }
        }

        if self.post_x_spacing >= self.box_width - 2.0 * self.wall_thickness {
            return Err(ParamError::Inconsistent {
                reason: format!(
                    "post spacing {} does not fit inside the cavity",
                    self.post_x_spacing
                ),
            });
        }
        Ok(())
    }

    /// Resolve the parameter set into concrete coordinates.
    pub fn resolve(&self) -> EnclosureGeometry {
        EnclosureGeometry::resolve(self)
    }
}

/// Coordinates derived from one [`EnclosureParams`]. Never mutated; a new
/// value is resolved for every build.
#[derive(Debug, Clone, PartialEq)]
pub struct EnclosureGeometry {
    pub params: EnclosureParams,

    pub cos_a: f64,
    pub sin_a: f64,

    /// Cavity extent as (width, length, depth).
    pub cavity: Vector3<f64>,
    pub floor_z: f64,

    /// Distance along the tab face to its midpoint.
    pub face_mid: f64,
    pub face_center: Point2<f64>,
    pub face_dir: Vector2<f64>,
    pub inward: Vector2<f64>,
    pub inner_face_center: Point2<f64>,

    /// Tab cross-section: box-top edge, far face edge, then the inner edge.
    pub tab_corners: [Point2<f64>; 4],

    pub post_centers: [Point3<f64>; 4],

    pub bulb_radius: f64,
    /// Offset of each notch center from the face center along the face.
    pub notch_offset: f64,
    pub clip_offset_x: f64,
    pub clip_xs: [f64; 2],
    pub screw_xs: [f64; 2],
}

impl EnclosureGeometry {
    /// Pure and deterministic. Degenerate tab angles are propagated as-is;
    /// callers reject them through [`EnclosureParams::validate`].
    pub fn resolve(params: &EnclosureParams) -> Self {
        let p = params;
        let angle = p.tab_angle_deg.to_radians();
        let (sin_a, cos_a) = angle.sin_cos();

        let cavity = Vector3::new(
            p.box_width - 2.0 * p.wall_thickness,
            p.box_length - 2.0 * p.wall_thickness,
            p.box_height - p.wall_thickness,
        );

        let face_mid = p.tab_face_length / 2.0;
        let face_center = Point2::new(face_mid * cos_a, p.box_height + face_mid * sin_a);
        let face_dir = Vector2::new(cos_a, sin_a);
        let inward = Vector2::new(sin_a, -cos_a);
        let inner_face_center = face_center + p.tab_wall_thickness * inward;

        let v1 = Point2::new(0.0, p.box_height);
        let v2 = v1 + p.tab_face_length * face_dir;
        let v3 = v2 + p.tab_wall_thickness * inward;
        let v4 = v1 + p.tab_wall_thickness * inward;

        let post_x1 = (p.box_width - p.post_x_spacing) / 2.0;
        let post_x2 = post_x1 + p.post_x_spacing;
        let half_y = p.post_y_spacing / 2.0;
        let floor_z = p.wall_thickness;
        let post_centers = [
            Point3::new(post_x1, p.strip_center_y - half_y, floor_z),
            Point3::new(post_x1, p.strip_center_y + half_y, floor_z),
            Point3::new(post_x2, p.strip_center_y - half_y, floor_z),
            Point3::new(post_x2, p.strip_center_y + half_y, floor_z),
        ];

        let bulb_radius = p.bulb_hole_diameter / 2.0;
        let clip_offset_x = bulb_radius + p.clip_gap + p.clip_thickness / 2.0;

        Self {
            params: params.clone(),
            cos_a,
            sin_a,
            cavity,
            floor_z,
            face_mid,
            face_center,
            face_dir,
            inward,
            inner_face_center,
            tab_corners: [v1, v2, v3, v4],
            post_centers,
            bulb_radius,
            notch_offset: bulb_radius + p.bulb_notch_depth / 2.0,
            clip_offset_x,
            clip_xs: [p.bulb_x - clip_offset_x, p.bulb_x + clip_offset_x],
            screw_xs: [
                p.switch_x - p.switch_screw_spacing / 2.0,
                p.switch_x + p.switch_screw_spacing / 2.0,
            ],
        }
    }

    /// Point on (or parallel to) the outer tab face.
    ///
    /// `along` runs from the face center along the face direction, `depth`
    /// along the inward normal; negative depths lie outside the part.
    pub fn face_point(&self, x: f64, along: f64, depth: f64) -> Point3<f64> {
        let yz = self.face_center + along * self.face_dir + depth * self.inward;
        Point3::new(x, yz.x, yz.y)
    }

    /// Same as [`face_point`](Self::face_point) but relative to the inner face.
    pub fn inner_face_point(&self, x: f64, along: f64, depth: f64) -> Point3<f64> {
        let yz = self.inner_face_center + along * self.face_dir + depth * self.inward;
        Point3::new(x, yz.x, yz.y)
    }

    /// The inward normal as a 3D direction.
    pub fn inward_3d(&self) -> Vector3<f64> {
        Vector3::new(0.0, self.inward.x, self.inward.y)
    }

    pub fn face_dir_3d(&self) -> Vector3<f64> {
        Vector3::new(0.0, self.face_dir.x, self.face_dir.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn revision_1_cavity() {
        let geom = EnclosureParams::revision_1().resolve();
        assert_relative_eq!(geom.cavity, Vector3::new(76.0, 45.0, 15.0));
        assert_relative_eq!(geom.floor_z, 2.0);
    }

    #[test]
    fn face_center_matches_tab_midpoint() {
        let geom = EnclosureParams::revision_1().resolve();
        let [v1, v2, _, _] = geom.tab_corners;
        let mid = v1 + (v2 - v1) / 2.0;
        assert_relative_eq!(geom.face_center, mid, epsilon = 1e-12);
    }

    #[test]
    fn inner_face_is_one_wall_below_outer_face() {
        let geom = EnclosureParams::revision_2().resolve();
        let offset = geom.inner_face_center - geom.face_center;
        assert_relative_eq!(offset.norm(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(offset.dot(&geom.face_dir), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn posts_are_centered_across_width() {
        let geom = EnclosureParams::revision_1().resolve();
        assert_relative_eq!(geom.post_centers[0].x, 11.5);
        assert_relative_eq!(geom.post_centers[2].x, 68.5);
        assert_relative_eq!(
            geom.post_centers[1].y - geom.post_centers[0].y,
            7.88,
            epsilon = 1e-12
        );
    }

    #[test]
    fn clip_and_screw_offsets() {
        let geom = EnclosureParams::revision_1().resolve();
        assert_relative_eq!(geom.clip_offset_x, 7.75 + 0.5 + 1.0);
        assert_relative_eq!(geom.screw_xs[0], 36.25);
        assert_relative_eq!(geom.screw_xs[1], 73.75);
    }

    #[test]
    fn right_angle_propagates_unclamped() {
        let mut params = EnclosureParams::revision_1();
        params.tab_angle_deg = 90.0;
        let geom = params.resolve();
        assert!(geom.cos_a.abs() < 1e-12);
        assert_eq!(
            params.validate(),
            Err(ParamError::DegenerateTabAngle { degrees: 90.0 })
        );
    }

    #[test]
    fn zero_angle_is_rejected() {
        let mut params = EnclosureParams::revision_2();
        params.tab_angle_deg = 0.0;
        assert!(matches!(
            params.validate(),
            Err(ParamError::DegenerateTabAngle { .. })
        ));
    }

    #[test]
    fn thick_walls_collapse_cavity() {
        let mut params = EnclosureParams::revision_1();
        params.wall_thickness = 17.0;
        assert!(matches!(
            params.validate(),
            Err(ParamError::CavityCollapsed { .. })
        ));
    }

    #[test]
    fn builtin_revisions_validate() {
        EnclosureParams::revision_1().validate().unwrap();
        EnclosureParams::revision_2().validate().unwrap();
    }
}
