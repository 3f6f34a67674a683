use design_params::DesignParameterSet;
use serde::Deserialize;

use crate::document::{AssemblyDocument, PartRecord};
use crate::errors::LoadError;
use crate::metadata::AssemblyMetadata;
use crate::save::{FORMAT_ID, FORMAT_VERSION};

/// Format and version only, so newer files are rejected before their body
/// is interpreted.
#[derive(Debug, Deserialize)]
struct Header {
    format: String,
    version: u32,
}

/// The top-level file structure for deserialization.
#[derive(Debug, Deserialize)]
struct AssemblyFileRaw {
    metadata: AssemblyMetadata,
    parameters: DesignParameterSet,
    parts: Vec<PartRecord>,
}

/// Deserialize an assembly from a JSON string.
///
/// Validates the format identifier and version, migrating older files.
pub fn load_assembly(json: &str) -> Result<AssemblyDocument, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;
    let header = Header::deserialize(&value).map_err(|e| LoadError::Parse(e.to_string()))?;

    if header.format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(header.format));
    }
    if header.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: header.version,
            supported_version: FORMAT_VERSION,
        });
    }

    let value = if header.version < FORMAT_VERSION {
        crate::migrate::migrate(value, header.version, FORMAT_VERSION)?
    } else {
        value
    };

    let raw: AssemblyFileRaw =
        serde_json::from_value(value).map_err(|e| LoadError::Parse(e.to_string()))?;
    Ok(AssemblyDocument {
        metadata: raw.metadata,
        parameters: raw.parameters,
        parts: raw.parts,
    })
}
