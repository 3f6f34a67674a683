use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a solid in the kernel.
/// NEVER persisted. Valid only for the kernel session that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Transient identifier of an edge or face of one solid.
/// Only meaningful for the solid it was listed from; rebuilding renumbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelId(pub u64);

impl KernelId {
    /// Pack a solid handle and an entity index into one id.
    pub(crate) fn entity(solid: &KernelSolidHandle, index: usize) -> Self {
        KernelId((solid.0 << 32) | index as u64)
    }

    pub(crate) fn solid_part(self) -> u64 {
        self.0 >> 32
    }

    pub(crate) fn index_part(self) -> usize {
        (self.0 & 0xffff_ffff) as usize
    }
}

impl Serialize for KernelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KernelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(KernelId)
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("degenerate geometry: {reason}")]
    Degenerate { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("solid not found: {handle}")]
    SolidNotFound { handle: u64 },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

/// Triangle mesh of a solid, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals, same layout as `vertices`.
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array, counter-clockwise from outside.
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Geometry class of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeCurve {
    /// Straight segment between two planar faces.
    Line,
    /// Anything touching a curved surface or not collinear.
    Curve,
}

/// A boundary between two distinct faces.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInfo {
    pub id: KernelId,
    pub curve: EdgeCurve,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Point at half the arc length.
    pub midpoint: Point3<f64>,
    pub length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Planar,
    Curved,
}

/// A maximal connected region of one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceInfo {
    pub id: KernelId,
    pub surface: SurfaceKind,
    /// Outward normal; only defined for planar faces.
    pub normal: Option<Vector3<f64>>,
    pub area: f64,
    pub centroid: Point3<f64>,
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bb = BoundingBox {
            min: first,
            max: first,
        };
        for p in iter {
            bb.include(p);
        }
        Some(bb)
    }

    pub fn include(&mut self, p: &Point3<f64>) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        out.include(&other.min);
        out.include(&other.max);
        out
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// True when the boxes share any point, growing both by `eps`.
    pub fn overlaps(&self, other: &BoundingBox, eps: f64) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] + eps && other.min[i] <= self.max[i] + eps)
    }

    /// Volume of the intersection, zero when disjoint.
    pub fn intersection_volume(&self, other: &BoundingBox) -> f64 {
        (0..3)
            .map(|i| (self.max[i].min(other.max[i]) - self.min[i].max(other.min[i])).max(0.0))
            .product()
    }
}

/// Chordal tolerance used to facet curved surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deflection {
    /// Maximum distance between a facet and the true surface.
    pub linear: f64,
    /// Maximum angle in radians subtended by one facet.
    pub angular: f64,
}

impl Deflection {
    pub const STANDARD: Deflection = Deflection {
        linear: 0.1,
        angular: 0.5,
    };

    pub const FINE: Deflection = Deflection {
        linear: 0.05,
        angular: 0.3,
    };

    const MIN_SEGMENTS: usize = 8;
    const MAX_SEGMENTS: usize = 256;

    /// Facets around a full circle of `radius`. Always a multiple of 4 so
    /// axis-aligned tangent planes coincide with facets.
    pub fn segments(&self, radius: f64) -> usize {
        let by_angle = (std::f64::consts::TAU / self.angular).ceil();
        let by_chord = if self.linear < radius {
            (std::f64::consts::PI / (1.0 - self.linear / radius).acos()).ceil()
        } else {
            0.0
        };
        let n = (by_angle.max(by_chord) as usize).clamp(Self::MIN_SEGMENTS, Self::MAX_SEGMENTS);
        n.div_ceil(4) * 4
    }

    /// Facets along an arc of `sweep` radians.
    pub fn arc_segments(&self, radius: f64, sweep: f64) -> usize {
        let full = self.segments(radius) as f64;
        ((full * sweep / std::f64::consts::TAU).ceil() as usize).max(2)
    }
}

impl Default for Deflection {
    fn default() -> Self {
        Self::STANDARD
    }
}
