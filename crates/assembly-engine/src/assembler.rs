use feature_ops::{execute_base, execute_feature, execute_refine, KernelBundle};
use tracing::{debug, info, instrument};

use crate::body::Body;
use crate::errors::BuildError;
use crate::plan::{BuildPlan, PartKind};

/// A body fresh out of the fold, with any warnings the steps raised.
#[derive(Debug)]
pub struct Assembly {
    pub body: Body,
    pub warnings: Vec<String>,
}

/// Fold the plan's features into one body, first to last.
///
/// The first feature creates the body. Every later one is combined with it,
/// and the superseded solid is released, so only the returned body stays
/// alive in the kernel. On error nothing the fold created is left behind.
#[instrument(skip_all, fields(part = %plan.part, features = plan.features.len()))]
pub fn assemble(kb: &mut dyn KernelBundle, plan: BuildPlan) -> Result<Assembly, BuildError> {
    let part = plan.part;
    let mut features = plan.features.into_iter();
    let first = features.next().ok_or(BuildError::EmptyPlan { part })?;

    let base = execute_base(kb, &first).map_err(|source| BuildError::Feature {
        part,
        label: first.label.clone(),
        source,
    })?;
    let mut warnings = base.diagnostics.warnings;
    let mut body = Body::new(base.handle);

    for feature in features {
        let step = match execute_feature(kb, body.handle(), &feature) {
            Ok(step) => step,
            Err(source) => {
                body.release(kb);
                return Err(BuildError::Feature {
                    part,
                    label: feature.label,
                    source,
                });
            }
        };
        debug!(
            label = %feature.label,
            ms = step.diagnostics.kernel_time_ms,
            "feature applied"
        );
        warnings.extend(step.diagnostics.warnings);
        body = body.replace(kb, step.handle);
    }

    info!(warnings = warnings.len(), "assembled");
    Ok(Assembly { body, warnings })
}

/// Merge coplanar fragments left by the booleans. Volume is unchanged.
pub fn cleanup(kb: &mut dyn KernelBundle, body: Body, part: PartKind) -> Result<Body, BuildError> {
    match execute_refine(kb, body.handle()) {
        Ok(refined) => Ok(body.replace(kb, refined.handle)),
        Err(source) => {
            body.release(kb);
            Err(BuildError::Step { part, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_kernel::{KernelIntrospect, MockKernel};
    use nalgebra::{Point3, Vector3};
    use part_types::{Feature, ToolShape};

    fn cube(x: f64, size: f64) -> ToolShape {
        ToolShape::Block {
            origin: Point3::new(x, 0.0, 0.0),
            size: Vector3::new(size, size, size),
        }
    }

    fn plan(features: Vec<Feature>) -> BuildPlan {
        BuildPlan {
            part: PartKind::SplineHolder,
            features,
            fillet: None,
        }
    }

    #[test]
    fn fold_leaves_only_the_result_alive() {
        let mut kernel = MockKernel::new();
        let assembly = assemble(
            &mut kernel,
            plan(vec![
                Feature::fuse("a", cube(0.0, 2.0)),
                Feature::fuse("b", cube(2.0, 2.0)),
                Feature::cut("c", cube(0.0, 1.0)),
            ]),
        )
        .unwrap();
        assert_eq!(kernel.live_solids(), 1);
        assert_eq!(kernel.volume(assembly.body.handle()), 15.0);
    }

    #[test]
    fn failure_names_the_feature_and_cleans_up() {
        let mut kernel = MockKernel::new();
        kernel.fail_on("boolean_subtract");
        let err = assemble(
            &mut kernel,
            plan(vec![
                Feature::fuse("a", cube(0.0, 2.0)),
                Feature::cut("hole", cube(0.0, 1.0)),
            ]),
        )
        .unwrap_err();
        match err {
            BuildError::Feature { label, .. } => assert_eq!(label, "hole"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(kernel.live_solids(), 0);
    }

    #[test]
    fn empty_plan_is_an_error() {
        let mut kernel = MockKernel::new();
        assert!(matches!(
            assemble(&mut kernel, plan(Vec::new())),
            Err(BuildError::EmptyPlan { .. })
        ));
    }

    #[test]
    fn cleanup_replaces_the_body() {
        let mut kernel = MockKernel::new();
        let assembly = assemble(&mut kernel, plan(vec![Feature::fuse("a", cube(0.0, 1.0))])).unwrap();
        let before = assembly.body.handle().clone();
        let body = cleanup(&mut kernel, assembly.body, PartKind::SplineHolder).unwrap();
        assert_ne!(body.handle(), &before);
        assert_eq!(kernel.live_solids(), 1);
        assert_eq!(kernel.op_log().last().map(String::as_str), Some("release"));
    }
}
