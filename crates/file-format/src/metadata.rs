use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata stored alongside the parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Assembly name, also the file stem of its exports.
    pub name: String,
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl AssemblyMetadata {
    /// Fresh id, both timestamps set to now.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            id: Uuid::new_v4(),
            created: now,
            modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metadata_starts_unmodified() {
        let a = AssemblyMetadata::new("SplineBracket");
        let b = AssemblyMetadata::new("SplineBracket");
        assert_eq!(a.created, a.modified);
        assert_eq!(a.name, "SplineBracket");
        assert_ne!(a.id, b.id);
    }
}
