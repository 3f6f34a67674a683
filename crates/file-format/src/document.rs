use csg_kernel::RenderMesh;
use design_params::DesignParameterSet;
use serde::{Deserialize, Serialize};

use crate::metadata::AssemblyMetadata;

/// Everything needed to reproduce and inspect one generated assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyDocument {
    pub metadata: AssemblyMetadata,
    /// The exact parameters the parts were built from.
    pub parameters: DesignParameterSet,
    pub parts: Vec<PartRecord>,
}

/// Summary and mesh of one built part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub name: String,
    pub volume: f64,
    pub solid_count: usize,
    pub face_count: usize,
    /// Non-fatal diagnostics raised while building, as display strings.
    #[serde(default)]
    pub diagnostics: Vec<String>,
    pub mesh: RenderMesh,
}

impl AssemblyDocument {
    pub fn new(metadata: AssemblyMetadata, parameters: DesignParameterSet) -> Self {
        Self {
            metadata,
            parameters,
            parts: Vec::new(),
        }
    }

    pub fn part(&self, name: &str) -> Option<&PartRecord> {
        self.parts.iter().find(|p| p.name == name)
    }
}
