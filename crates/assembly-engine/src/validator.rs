use csg_kernel::KernelIntrospect;

use crate::body::Body;
use crate::diagnostics::Diagnostic;
use crate::plan::PartKind;

/// Measurements of a finished body.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub solid_count: usize,
    pub volume: f64,
    pub face_count: usize,
    pub diagnostic: Option<Diagnostic>,
}

/// Measure `body` and report a solid-count mismatch. Never fails.
pub fn check(ki: &dyn KernelIntrospect, body: &Body, part: PartKind) -> Validation {
    let solid_count = ki.solid_count(body.handle());
    let expected = part.expected_solids();
    let diagnostic = (solid_count != expected).then(|| Diagnostic::MultiSolidResult {
        part,
        expected,
        found: solid_count,
    });
    Validation {
        solid_count,
        volume: ki.volume(body.handle()),
        face_count: ki.list_faces(body.handle()).len(),
        diagnostic,
    }
}
