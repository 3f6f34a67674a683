use csg_kernel::KernelSolidHandle;
use part_types::GeometryError;

/// Result of applying one operation to a body.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// Handle to the resulting solid. Runtime-only, not persisted.
    pub handle: KernelSolidHandle,
    /// Non-fatal warnings and timing information.
    pub diagnostics: Diagnostics,
}

/// Non-fatal diagnostics from an operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Time taken for the kernel calls, in milliseconds.
    pub kernel_time_ms: f64,
}

/// Errors from feature operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] csg_kernel::KernelError),

    #[error("invalid profile: {0}")]
    Geometry(#[from] GeometryError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}
