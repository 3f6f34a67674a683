use csg_kernel::KernelError;
use design_params::ParamError;
use feature_ops::OpError;
use part_types::GeometryError;

use crate::plan::PartKind;

/// Fatal failures of a part build. Anything recoverable is a
/// [`Diagnostic`](crate::Diagnostic) instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("degenerate profile: {0}")]
    Geometry(#[from] GeometryError),

    #[error("{part}: feature '{label}' failed: {source}")]
    Feature {
        part: PartKind,
        label: String,
        #[source]
        source: OpError,
    },

    #[error("{part}: {source}")]
    Step {
        part: PartKind,
        #[source]
        source: OpError,
    },

    #[error("{part} has no features")]
    EmptyPlan { part: PartKind },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}
