use std::time::Instant;

use csg_kernel::{KernelId, KernelSolidHandle};
use tracing::instrument;

use crate::execute::elapsed_ms;
use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, OpError, OpResult};

/// Round `edges` of a solid with one constant radius in a single kernel call.
#[instrument(skip(kb, solid, edges), fields(edges = edges.len()))]
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    radius: f64,
) -> Result<OpResult, OpError> {
    if radius <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "fillet radius must be positive".to_string(),
        });
    }
    if edges.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: "no edges selected for rounding".to_string(),
        });
    }

    let started = Instant::now();
    let handle = kb.fillet_edges(solid, edges, radius)?;

    let mut warnings = Vec::new();
    let (_, before) = kb.measure(solid);
    let (_, after) = kb.measure(&handle);
    if after != before {
        warnings.push(format!("rounding changed the solid count from {before} to {after}"));
    }

    Ok(OpResult {
        handle,
        diagnostics: Diagnostics {
            warnings,
            kernel_time_ms: elapsed_ms(started),
        },
    })
}
