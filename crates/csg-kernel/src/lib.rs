//! Solid modeling kernel behind the `Kernel` / `KernelIntrospect` seam.
//!
//! `MeshKernel` is a polyhedral CSG kernel on `csgrs`: booleans and
//! primitives come from its BSP `CSG` type, curved surfaces are faceted to a
//! fixed [`Deflection`], and faces and edges are recovered from the polygon
//! set for rounding and introspection. `MockKernel` is a deterministic test
//! double that records every call.

pub mod fillet;
pub mod mesh_kernel;
pub mod mock_kernel;
pub mod polygon;
pub mod primitives;
pub mod tessellation;
pub mod topology;
pub mod traits;
pub mod types;

pub use mesh_kernel::MeshKernel;
pub use mock_kernel::MockKernel;
pub use traits::*;
pub use types::*;
