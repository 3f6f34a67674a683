pub mod feature;
pub mod profile;
pub mod tolerance;

pub use feature::*;
pub use profile::*;
pub use tolerance::*;

pub use nalgebra::{Point3, Vector3};
