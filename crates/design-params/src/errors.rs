/// Precondition violations detected before any geometry is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("tab angle {degrees} deg is outside (0, 90); tab and cutting tools would degenerate")]
    DegenerateTabAngle { degrees: f64 },

    #[error("cavity collapses along {axis}: wall thickness too large")]
    CavityCollapsed { axis: &'static str },

    #[error("V-groove clearance {clearance} is below the minimum of 1")]
    InsufficientClearance { clearance: f64 },

    #[error("tongue width {tongue} must be smaller than part width {part}")]
    TongueTooWide { tongue: f64, part: f64 },

    #[error("inconsistent parameters: {reason}")]
    Inconsistent { reason: String },

    #[error("{product} has no revision {revision}")]
    UnknownRevision { product: &'static str, revision: u32 },

    #[error("invalid parameter override: {0}")]
    Override(String),
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NonPositive { name, value })
    }
}
