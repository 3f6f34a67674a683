use tracing::warn;

use crate::plan::PartKind;

/// A non-fatal anomaly. The part is still returned and exported.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The finished part is not a single connected solid.
    MultiSolidResult {
        part: PartKind,
        expected: usize,
        found: usize,
    },
    /// No edge matched the rounding references, so rounding was skipped.
    FilletSelectionEmpty { part: PartKind, candidates: usize },
}

impl Diagnostic {
    pub fn part(&self) -> PartKind {
        match self {
            Diagnostic::MultiSolidResult { part, .. } => *part,
            Diagnostic::FilletSelectionEmpty { part, .. } => *part,
        }
    }

    /// Log through `tracing` at warn level.
    pub fn emit(&self) {
        match self {
            Diagnostic::MultiSolidResult {
                part,
                expected,
                found,
            } => warn!(%part, expected, found, "result is not a single solid"),
            Diagnostic::FilletSelectionEmpty { part, candidates } => {
                warn!(%part, candidates, "no edges matched the fillet references; rounding skipped")
            }
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MultiSolidResult {
                part,
                expected,
                found,
            } => write!(f, "{part}: expected {expected} solid(s), found {found}"),
            Diagnostic::FilletSelectionEmpty { part, candidates } => write!(
                f,
                "{part}: none of {candidates} edges matched the fillet references"
            ),
        }
    }
}
