use serde_json::Value;

use crate::errors::LoadError;

/// Apply format migrations from `from_version` to `to_version`, one version
/// at a time, on the raw JSON.
///
/// Version 1 is the only version so far.
pub fn migrate(document: Value, from_version: u32, to_version: u32) -> Result<Value, LoadError> {
    if from_version != to_version {
        return Err(LoadError::MigrationFailed {
            from: from_version,
            to: to_version,
            reason: format!("no migration path from v{from_version} to v{to_version}"),
        });
    }
    Ok(document)
}
