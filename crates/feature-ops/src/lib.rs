pub mod execute;
pub mod fillet;
pub mod kernel_ext;
pub mod profiles;
pub mod tool;
pub mod types;

pub use execute::{execute_base, execute_feature, execute_refine};
pub use fillet::execute_fillet;
pub use kernel_ext::KernelBundle;
pub use tool::build_tool;
pub use types::*;
