use serde::Serialize;

use crate::document::{AssemblyDocument, PartRecord};
use crate::metadata::AssemblyMetadata;
use design_params::DesignParameterSet;

/// Format identifier written into every document.
pub const FORMAT_ID: &str = "partforge-assembly";

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// The top-level file structure.
#[derive(Debug, Clone, Serialize)]
struct AssemblyFile<'a> {
    format: &'static str,
    version: u32,
    metadata: &'a AssemblyMetadata,
    parameters: &'a DesignParameterSet,
    parts: &'a [PartRecord],
}

/// Serialize an assembly to a pretty-printed JSON string.
pub fn save_assembly(document: &AssemblyDocument) -> String {
    let file = AssemblyFile {
        format: FORMAT_ID,
        version: FORMAT_VERSION,
        metadata: &document.metadata,
        parameters: &document.parameters,
        parts: &document.parts,
    };
    serde_json::to_string_pretty(&file).expect("assembly serialization should never fail")
}
