/// Tolerances used when validating profiles and comparing coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Points closer than this are the same point.
    pub coincidence: f64,
    /// Maximum distance of a profile point from the profile's plane.
    pub planarity: f64,
    /// Enclosed areas below this are treated as zero.
    pub area: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-9,
            planarity: 1e-6,
            area: 1e-9,
        }
    }
}
