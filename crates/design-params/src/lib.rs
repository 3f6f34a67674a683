//! Design parameter sets for every generated product and the resolver that
//! turns them into concrete coordinates.

pub mod bracket;
pub mod enclosure;
pub mod errors;
pub mod set;

pub use bracket::{FilletReferences, SplineBracketGeometry, SplineBracketParams};
pub use enclosure::{ClipStyle, EnclosureGeometry, EnclosureParams};
pub use errors::ParamError;
pub use set::{DesignParameterSet, Product};
