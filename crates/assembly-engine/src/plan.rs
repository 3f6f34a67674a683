use design_params::{EnclosureGeometry, FilletReferences, SplineBracketGeometry};
use feature_ops::profiles::{bracket, enclosure};
use part_types::{Feature, GeometryError};

/// Every part the generator emits as a separate printable solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    CurrentLimitBox,
    SplineHolder,
    GussetBracket,
}

impl PartKind {
    /// File stem used for exports.
    pub fn name(self) -> &'static str {
        match self {
            PartKind::CurrentLimitBox => "CurrentLimitBox",
            PartKind::SplineHolder => "SplineBracket-Holder",
            PartKind::GussetBracket => "SplineBracket-GussetBracket",
        }
    }

    /// Every part is printed as one piece.
    pub fn expected_solids(self) -> usize {
        1
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered features for one part, plus the rounding step if it has one.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub part: PartKind,
    pub features: Vec<Feature>,
    pub fillet: Option<FilletReferences>,
}

impl BuildPlan {
    pub fn current_limit_box(g: &EnclosureGeometry) -> Result<Self, GeometryError> {
        let mut features = vec![
            enclosure::base_block(g),
            enclosure::cavity(g),
            enclosure::tab(g)?,
        ];
        features.extend(enclosure::posts(g));
        features.push(enclosure::bulb_hole(g));
        features.extend(enclosure::notches(g)?);
        features.extend(enclosure::clips(g)?);
        features.push(enclosure::switch_cutout(g)?);
        features.extend(enclosure::switch_chamfer(g)?);
        features.extend(enclosure::screw_holes(g));
        Ok(Self {
            part: PartKind::CurrentLimitBox,
            features,
            fillet: None,
        })
    }

    pub fn spline_holder(g: &SplineBracketGeometry) -> Result<Self, GeometryError> {
        Ok(Self {
            part: PartKind::SplineHolder,
            features: vec![
                bracket::holder_block(g),
                bracket::holder_groove(g)?,
                bracket::holder_tongue(g)?,
                bracket::holder_bolt(g),
            ],
            fillet: None,
        })
    }

    pub fn gusset_bracket(g: &SplineBracketGeometry) -> Result<Self, GeometryError> {
        let mut features = vec![
            bracket::flange(g),
            bracket::leg(g),
            bracket::vgroove(g)?,
            bracket::upper_bolt(g),
            bracket::lower_bolt(g),
        ];
        features.extend(bracket::gussets(g)?);
        Ok(Self {
            part: PartKind::GussetBracket,
            features,
            fillet: Some(g.fillet.clone()),
        })
    }
}
