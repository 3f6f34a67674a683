use nalgebra::{Point3, Vector3};

use crate::profile::Profile;

/// How a feature's tool is combined with the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    Fuse,
    Cut,
}

/// The shape a single feature contributes before it is combined with the body.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolShape {
    /// Axis-aligned box from `origin` spanning `size`.
    Block {
        origin: Point3<f64>,
        size: Vector3<f64>,
    },
    /// A rectangle revolved around `axis`; the base disc sits at `base`.
    Cylinder {
        base: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        height: f64,
    },
    /// A profile swept along `vector`.
    Extrusion { profile: Profile, vector: Vector3<f64> },
    /// Ruled surface between two loops with equal point counts.
    Loft { lower: Profile, upper: Profile },
}

impl ToolShape {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolShape::Block { .. } => "block",
            ToolShape::Cylinder { .. } => "cylinder",
            ToolShape::Extrusion { .. } => "extrusion",
            ToolShape::Loft { .. } => "loft",
        }
    }
}

/// One step of a build: a labelled tool and whether it is added or removed.
///
/// Features carry no state and are consumed by the assembler exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub label: String,
    pub tool: ToolShape,
    pub mode: CombineMode,
}

impl Feature {
    pub fn fuse(label: impl Into<String>, tool: ToolShape) -> Self {
        Self {
            label: label.into(),
            tool,
            mode: CombineMode::Fuse,
        }
    }

    pub fn cut(label: impl Into<String>, tool: ToolShape) -> Self {
        Self {
            label: label.into(),
            tool,
            mode: CombineMode::Cut,
        }
    }
}
