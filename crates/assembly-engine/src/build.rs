use design_params::{DesignParameterSet, EnclosureParams, SplineBracketParams};
use feature_ops::{execute_fillet, KernelBundle};
use tracing::{debug, info, instrument};

use crate::assembler::{assemble, cleanup, Assembly};
use crate::body::Body;
use crate::diagnostics::Diagnostic;
use crate::edge_classifier::{select_fillet_edges, FilletSelection};
use crate::errors::BuildError;
use crate::plan::{BuildPlan, PartKind};
use crate::validator::{check, Validation};

/// One finished part, ready for export.
#[derive(Debug)]
pub struct PartBuild {
    pub part: PartKind,
    pub body: Body,
    pub validation: Validation,
    /// The edges that were rounded, if the part has a rounding step and
    /// anything matched.
    pub fillet: Option<FilletSelection>,
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<String>,
}

/// Build every part of the product described by `set`.
///
/// Parameters are validated before any geometry is created. Diagnostics do
/// not stop the build; they are logged and returned with the part.
pub fn build(
    kb: &mut dyn KernelBundle,
    set: &DesignParameterSet,
) -> Result<Vec<PartBuild>, BuildError> {
    match set {
        DesignParameterSet::CurrentLimitBox(params) => {
            Ok(vec![build_current_limit_box(kb, params)?])
        }
        DesignParameterSet::SplineBracket(params) => build_spline_bracket(kb, params),
    }
}

#[instrument(skip_all, fields(revision = params.revision))]
pub fn build_current_limit_box(
    kb: &mut dyn KernelBundle,
    params: &EnclosureParams,
) -> Result<PartBuild, BuildError> {
    params.validate()?;
    let geometry = params.resolve();
    run_plan(kb, BuildPlan::current_limit_box(&geometry)?)
}

/// Holder first, then the gusset bracket.
#[instrument(skip_all, fields(revision = params.revision))]
pub fn build_spline_bracket(
    kb: &mut dyn KernelBundle,
    params: &SplineBracketParams,
) -> Result<Vec<PartBuild>, BuildError> {
    params.validate()?;
    let geometry = params.resolve();
    let holder_plan = BuildPlan::spline_holder(&geometry)?;
    let gusset_plan = BuildPlan::gusset_bracket(&geometry)?;

    let holder = run_plan(kb, holder_plan)?;
    match run_plan(kb, gusset_plan) {
        Ok(gusset) => Ok(vec![holder, gusset]),
        Err(e) => {
            holder.body.release(kb);
            Err(e)
        }
    }
}

/// Assemble, clean up, round if the plan asks for it, and validate.
#[instrument(skip_all, fields(part = %plan.part))]
pub fn run_plan(kb: &mut dyn KernelBundle, plan: BuildPlan) -> Result<PartBuild, BuildError> {
    let part = plan.part;
    let references = plan.fillet.clone();

    let Assembly { body, mut warnings } = assemble(kb, plan)?;
    let mut body = cleanup(kb, body, part)?;
    let mut diagnostics = Vec::new();
    let mut fillet = None;

    if let Some(refs) = references {
        let before = check(kb.as_introspect(), &body, part);
        debug!(volume = before.volume, faces = before.face_count, "before rounding");

        let edges = kb.as_introspect().list_edges(body.handle());
        let selection = select_fillet_edges(&edges, &refs);
        if selection.is_empty() {
            diagnostics.push(Diagnostic::FilletSelectionEmpty {
                part,
                candidates: edges.len(),
            });
        } else {
            info!(edges = selection.len(), radius = selection.radius, "rounding");
            let rounded =
                match execute_fillet(kb, body.handle(), &selection.edge_ids(), selection.radius) {
                    Ok(rounded) => rounded,
                    Err(source) => {
                        body.release(kb);
                        return Err(BuildError::Step { part, source });
                    }
                };
            warnings.extend(rounded.diagnostics.warnings);
            let replaced = body.replace(kb, rounded.handle);
            body = cleanup(kb, replaced, part)?;
            fillet = Some(selection);
        }
    }

    let validation = check(kb.as_introspect(), &body, part);
    diagnostics.extend(validation.diagnostic.clone());
    for d in &diagnostics {
        d.emit();
    }
    info!(
        volume = validation.volume,
        solids = validation.solid_count,
        faces = validation.face_count,
        "part built"
    );

    Ok(PartBuild {
        part,
        body,
        validation,
        fillet,
        diagnostics,
        warnings,
    })
}
