//! Turns a design parameter set into finished solids.
//!
//! A part is described by a [`BuildPlan`]: an ordered list of features plus
//! an optional rounding step. [`assemble`] folds the features into a
//! [`Body`] one boolean at a time; [`build`] runs the whole pipeline for a
//! product, including cleanup, edge selection and validation.

pub mod assembler;
pub mod body;
pub mod build;
pub mod diagnostics;
pub mod edge_classifier;
pub mod errors;
pub mod plan;
pub mod validator;

pub use assembler::{assemble, cleanup, Assembly};
pub use body::Body;
pub use build::{build, build_current_limit_box, build_spline_bracket, PartBuild};
pub use diagnostics::Diagnostic;
pub use edge_classifier::{select_fillet_edges, EdgeMatch, EdgeRole, FilletSelection};
pub use errors::BuildError;
pub use plan::{BuildPlan, PartKind};
pub use validator::{check, Validation};
