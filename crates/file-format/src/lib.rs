pub mod document;
pub mod errors;
pub mod load;
pub mod metadata;
pub mod migrate;
pub mod paths;
pub mod save;
pub mod stl;

pub use document::{AssemblyDocument, PartRecord};
pub use errors::{ExportError, LoadError};
pub use load::load_assembly;
pub use metadata::AssemblyMetadata;
pub use paths::OutputPaths;
pub use save::{save_assembly, FORMAT_ID, FORMAT_VERSION};
pub use stl::{export_ascii_stl, export_binary_stl, write_ascii_stl, write_binary_stl};
