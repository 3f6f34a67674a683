use std::time::Instant;

use csg_kernel::KernelSolidHandle;
use part_types::{CombineMode, Feature};
use tracing::{debug, instrument};

use crate::kernel_ext::KernelBundle;
use crate::tool::build_tool;
use crate::types::{Diagnostics, OpError, OpResult};

/// Relative volume change below which a feature is reported as having no effect.
const NO_EFFECT_RATIO: f64 = 1e-9;

/// Create the first solid of a body from a fuse feature.
#[instrument(skip(kb, feature), fields(label = %feature.label))]
pub fn execute_base(kb: &mut dyn KernelBundle, feature: &Feature) -> Result<OpResult, OpError> {
    if feature.mode != CombineMode::Fuse {
        return Err(OpError::InvalidParameter {
            reason: format!("base feature '{}' must add material", feature.label),
        });
    }
    let started = Instant::now();
    let handle = build_tool(kb, &feature.tool)?;
    Ok(OpResult {
        handle,
        diagnostics: Diagnostics {
            warnings: Vec::new(),
            kernel_time_ms: elapsed_ms(started),
        },
    })
}

/// Build the feature's tool, combine it with `body` and release the tool.
///
/// `body` itself is left untouched; the caller owns both handles afterwards.
#[instrument(skip(kb, body, feature), fields(label = %feature.label, tool = feature.tool.kind()))]
pub fn execute_feature(
    kb: &mut dyn KernelBundle,
    body: &KernelSolidHandle,
    feature: &Feature,
) -> Result<OpResult, OpError> {
    let started = Instant::now();
    let tool = build_tool(kb, &feature.tool)?;
    let combined = match feature.mode {
        CombineMode::Fuse => kb.boolean_union(body, &tool),
        CombineMode::Cut => kb.boolean_subtract(body, &tool),
    };
    kb.release(&tool);
    let handle = combined?;
    let kernel_time_ms = elapsed_ms(started);

    let (before, _) = kb.measure(body);
    let (after, solids) = kb.measure(&handle);
    debug!(before, after, solids, "combined");

    let mut warnings = Vec::new();
    if (after - before).abs() <= NO_EFFECT_RATIO * before.abs().max(1.0) {
        warnings.push(format!("feature '{}' did not change the volume", feature.label));
    }

    Ok(OpResult {
        handle,
        diagnostics: Diagnostics {
            warnings,
            kernel_time_ms,
        },
    })
}

/// Merge coplanar fragments left behind by the booleans.
#[instrument(skip(kb, body))]
pub fn execute_refine(
    kb: &mut dyn KernelBundle,
    body: &KernelSolidHandle,
) -> Result<OpResult, OpError> {
    let started = Instant::now();
    let handle = kb.refine(body)?;
    Ok(OpResult {
        handle,
        diagnostics: Diagnostics {
            warnings: Vec::new(),
            kernel_time_ms: elapsed_ms(started),
        },
    })
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_kernel::{KernelIntrospect, MockKernel};
    use nalgebra::{Point3, Vector3};
    use part_types::ToolShape;

    fn block(x: f64, size: f64) -> ToolShape {
        ToolShape::Block {
            origin: Point3::new(x, 0.0, 0.0),
            size: Vector3::new(size, size, size),
        }
    }

    #[test]
    fn base_must_fuse() {
        let mut kernel = MockKernel::new();
        let result = execute_base(&mut kernel, &Feature::cut("hole", block(0.0, 1.0)));
        assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
    }

    #[test]
    fn feature_releases_its_tool() {
        let mut kernel = MockKernel::new();
        let base = execute_base(&mut kernel, &Feature::fuse("base", block(0.0, 2.0))).unwrap();
        let cut = execute_feature(&mut kernel, &base.handle, &Feature::cut("bite", block(1.0, 2.0)))
            .unwrap();
        assert_eq!(kernel.volume(&cut.handle), 4.0);
        // base + result; the tool is gone
        assert_eq!(kernel.live_solids(), 2);
        assert!(cut.diagnostics.warnings.is_empty());
    }

    #[test]
    fn cut_that_misses_warns() {
        let mut kernel = MockKernel::new();
        let base = execute_base(&mut kernel, &Feature::fuse("base", block(0.0, 1.0))).unwrap();
        let cut = execute_feature(&mut kernel, &base.handle, &Feature::cut("miss", block(5.0, 1.0)))
            .unwrap();
        assert_eq!(cut.diagnostics.warnings.len(), 1);
    }

    #[test]
    fn failed_boolean_still_releases_tool() {
        let mut kernel = MockKernel::new();
        let base = execute_base(&mut kernel, &Feature::fuse("base", block(0.0, 1.0))).unwrap();
        kernel.fail_on("boolean_subtract");
        let result = execute_feature(&mut kernel, &base.handle, &Feature::cut("bite", block(0.5, 1.0)));
        assert!(matches!(result, Err(OpError::Kernel(_))));
        assert_eq!(kernel.live_solids(), 1);
    }
}
