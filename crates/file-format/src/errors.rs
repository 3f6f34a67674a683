/// Errors during assembly document loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("not a readable assembly document: {0}")]
    Parse(String),

    #[error("unknown document format `{0}`")]
    UnknownFormat(String),

    #[error("document version {file_version} is newer than this build reads ({supported_version})")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("cannot migrate document from v{from} to v{to}: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
}

/// Errors during mesh export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("mesh has no triangles")]
    EmptyMesh,

    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("mesh has {0} triangles, more than STL can index")]
    TooManyTriangles(usize),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}
