//! The two-part spline bracket: a holder block that clamps premade spline
//! roadbed, and an L-shaped gusset bracket that screws to the layout edge.
//!
//! Both parts share one vertical bolt. The tongue under the holder keys into
//! the V-groove on the bracket flange so the holder cannot rotate.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::errors::{positive, ParamError};

/// Absolute distance used when matching edges against reference positions.
pub const FILLET_MATCH_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineBracketParams {
    pub revision: u32,

    pub part_width: f64,
    pub part_depth: f64,
    pub bolt_diameter: f64,
    /// How far bolt cutters stick out past each side they pierce.
    pub bolt_overshoot: f64,

    pub holder_height: f64,
    pub holder_floor: f64,
    pub groove_bottom_width: f64,
    pub groove_straight_height: f64,
    pub groove_taper_height: f64,
    pub groove_taper_inset: f64,
    /// Height the groove cutter reaches above the holder top.
    pub groove_overshoot: f64,

    pub tongue_width: f64,
    pub tongue_depth: f64,

    pub flange_thickness: f64,
    pub leg_thickness: f64,
    pub leg_height: f64,
    pub gusset_thickness: f64,
    pub fillet_radius: f64,

    /// Extra V-groove width over the tongue width.
    pub vgroove_clearance: f64,
    pub vgroove_depth: f64,
    /// Height the V-groove cutter starts above the flange top.
    pub vgroove_lip: f64,

    pub lower_bolt_y: f64,
}

impl Default for SplineBracketParams {
    fn default() -> Self {
        Self::revision_1()
    }
}

impl SplineBracketParams {
    pub fn revision_1() -> Self {
        Self {
            revision: 1,
            part_width: 60.0,
            part_depth: 60.0,
            bolt_diameter: 6.35,
            bolt_overshoot: 1.0,
            holder_height: 32.0,
            holder_floor: 10.0,
            groove_bottom_width: 40.0,
            groove_straight_height: 17.0,
            groove_taper_height: 5.0,
            groove_taper_inset: 5.0,
            groove_overshoot: 1.0,
            tongue_width: 10.0,
            tongue_depth: 3.0,
            flange_thickness: 10.0,
            leg_thickness: 10.0,
            leg_height: 120.0,
            gusset_thickness: 5.0,
            fillet_radius: 3.0,
            vgroove_clearance: 1.0,
            vgroove_depth: 3.0,
            vgroove_lip: 1.0,
            lower_bolt_y: -93.0,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("part_width", self.part_width),
            ("part_depth", self.part_depth),
            ("bolt_diameter", self.bolt_diameter),
            ("bolt_overshoot", self.bolt_overshoot),
            ("holder_height", self.holder_height),
            ("holder_floor", self.holder_floor),
            ("groove_bottom_width", self.groove_bottom_width),
            ("groove_straight_height", self.groove_straight_height),
            ("groove_taper_height", self.groove_taper_height),
            ("groove_taper_inset", self.groove_taper_inset),
            ("groove_overshoot", self.groove_overshoot),
            ("tongue_width", self.tongue_width),
            ("tongue_depth", self.tongue_depth),
            ("flange_thickness", self.flange_thickness),
            ("leg_thickness", self.leg_thickness),
            ("leg_height", self.leg_height),
            ("gusset_thickness", self.gusset_thickness),
            ("fillet_radius", self.fillet_radius),
            ("vgroove_depth", self.vgroove_depth),
            ("vgroove_lip", self.vgroove_lip),
        ] {
            positive(name, value)?;
        }

        if self.vgroove_clearance < 1.0 {
            return Err(ParamError::InsufficientClearance {
                clearance: self.vgroove_clearance,
            });
        }
        if self.tongue_width >= self.part_width {
            return Err(ParamError::TongueTooWide {
                tongue: self.tongue_width,
                part: self.part_width,
            });
        }

        let inconsistent = |reason: &str| -> Result<(), ParamError> {
            Err(ParamError::Inconsistent {
                reason: reason.to_string(),
            })
        };
        if self.groove_bottom_width >= self.part_width {
            return inconsistent("groove is wider than the holder");
        }
        if 2.0 * self.groove_taper_inset >= self.groove_bottom_width {
            return inconsistent("groove tapers closed before reaching the top");
        }
        if self.holder_floor + self.groove_straight_height + self.groove_taper_height
            > self.holder_height + 1e-9
        {
            return inconsistent("groove is taller than the holder");
        }
        if self.leg_height <= self.flange_thickness {
            return inconsistent("leg must extend below the flange");
        }
        if self.leg_thickness >= self.part_width {
            return inconsistent("leg is as wide as the flange");
        }
        if 2.0 * self.gusset_thickness >= self.part_depth {
            return inconsistent("gusset ribs overlap");
        }
        if self.vgroove_width() >= self.part_depth {
            return inconsistent("V-groove is wider than the flange");
        }
        if self.lower_bolt_y >= -self.flange_thickness || self.lower_bolt_y <= -self.leg_height {
            return inconsistent("lower bolt is outside the leg");
        }
        Ok(())
    }

    /// Always wider than the tongue by the clearance.
    pub fn vgroove_width(&self) -> f64 {
        self.tongue_width + self.vgroove_clearance
    }

    pub fn resolve(&self) -> SplineBracketGeometry {
        SplineBracketGeometry::resolve(self)
    }
}

/// Reference positions that identify the inside corners to round.
#[derive(Debug, Clone, PartialEq)]
pub struct FilletReferences {
    /// X of the inner face of the leg.
    pub junction_x: f64,
    /// Y of the underside of the flange.
    pub junction_y: f64,
    /// Z of the inner face of each gusset rib.
    pub rib_planes_z: [f64; 2],
    pub tolerance: f64,
    pub min_length_l_junction: f64,
    pub min_length_gusset_leg: f64,
    pub min_length_gusset_flange: f64,
    pub radius: f64,
}

/// Coordinates derived from [`SplineBracketParams`]. Holder features are
/// built in the XY plane and extruded along Z; the V-groove runs along X.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineBracketGeometry {
    pub params: SplineBracketParams,

    pub groove_x_left: f64,
    pub groove_x_right: f64,
    pub groove_y_bottom: f64,
    pub groove_y_taper_start: f64,
    pub groove_y_top: f64,
    pub groove_top_left: f64,
    pub groove_top_right: f64,

    pub bolt_x: f64,
    pub bolt_z: f64,
    pub tongue_x_left: f64,
    pub tongue_x_right: f64,

    pub vgroove_width: f64,
    pub vgroove_z_left: f64,
    pub vgroove_z_right: f64,

    /// Right triangle in XY: leg/flange junction, flange tip, leg bottom.
    pub gusset: [Point2<f64>; 3],

    pub holder_bolt_base: Point3<f64>,
    pub upper_bolt_base: Point3<f64>,
    pub lower_bolt_base: Point3<f64>,

    pub fillet: FilletReferences,
}

impl SplineBracketGeometry {
    pub fn resolve(params: &SplineBracketParams) -> Self {
        let p = params;

        let groove_x_left = (p.part_width - p.groove_bottom_width) / 2.0;
        let groove_x_right = groove_x_left + p.groove_bottom_width;
        let groove_y_bottom = p.holder_floor;
        let groove_y_taper_start = groove_y_bottom + p.groove_straight_height;
        let groove_y_top = groove_y_taper_start + p.groove_taper_height;

        let bolt_x = p.part_width / 2.0;
        let bolt_z = p.part_depth / 2.0;
        let vgroove_width = p.vgroove_width();

        let junction = Point2::new(p.leg_thickness, -p.flange_thickness);

        Self {
            params: params.clone(),
            groove_x_left,
            groove_x_right,
            groove_y_bottom,
            groove_y_taper_start,
            groove_y_top,
            groove_top_left: groove_x_left + p.groove_taper_inset,
            groove_top_right: groove_x_right - p.groove_taper_inset,
            bolt_x,
            bolt_z,
            tongue_x_left: bolt_x - p.tongue_width / 2.0,
            tongue_x_right: bolt_x + p.tongue_width / 2.0,
            vgroove_width,
            vgroove_z_left: bolt_z - vgroove_width / 2.0,
            vgroove_z_right: bolt_z + vgroove_width / 2.0,
            gusset: [
                junction,
                Point2::new(p.part_width, -p.flange_thickness),
                Point2::new(p.leg_thickness, -p.leg_height),
            ],
            holder_bolt_base: Point3::new(bolt_x, -p.tongue_depth - p.bolt_overshoot, bolt_z),
            upper_bolt_base: Point3::new(
                bolt_x,
                -p.flange_thickness - p.bolt_overshoot,
                bolt_z,
            ),
            lower_bolt_base: Point3::new(-p.bolt_overshoot, p.lower_bolt_y, bolt_z),
            fillet: FilletReferences {
                junction_x: junction.x,
                junction_y: junction.y,
                rib_planes_z: [p.gusset_thickness, p.part_depth - p.gusset_thickness],
                tolerance: FILLET_MATCH_TOLERANCE,
                min_length_l_junction: 10.0,
                min_length_gusset_leg: 50.0,
                min_length_gusset_flange: 10.0,
                radius: p.fillet_radius,
            },
        }
    }

    /// Holder bolt runs through the floor and the tongue.
    pub fn holder_bolt_length(&self) -> f64 {
        let p = &self.params;
        p.holder_floor + p.tongue_depth + 2.0 * p.bolt_overshoot
    }

    pub fn upper_bolt_length(&self) -> f64 {
        self.params.flange_thickness + 2.0 * self.params.bolt_overshoot
    }

    pub fn lower_bolt_length(&self) -> f64 {
        self.params.leg_thickness + 2.0 * self.params.bolt_overshoot
    }
}
