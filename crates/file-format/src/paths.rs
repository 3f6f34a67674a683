use std::io;
use std::path::{Path, PathBuf};

/// Output layout under one root directory:
///
/// ```text
/// <root>/native/<Assembly>.json
/// <root>/printed_files/<Part>.stl
/// <root>/printed_files/<Part> (Meshed).stl
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    root: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn native_dir(&self) -> PathBuf {
        self.root.join("native")
    }

    pub fn printed_dir(&self) -> PathBuf {
        self.root.join("printed_files")
    }

    pub fn assembly_document(&self, assembly: &str) -> PathBuf {
        self.native_dir().join(format!("{assembly}.json"))
    }

    pub fn part_stl(&self, part: &str) -> PathBuf {
        self.printed_dir().join(format!("{part}.stl"))
    }

    /// The finer-tessellated variant of a part.
    pub fn meshed_stl(&self, part: &str) -> PathBuf {
        self.printed_dir().join(format!("{part} (Meshed).stl"))
    }

    pub fn create_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.native_dir())?;
        std::fs::create_dir_all(self.printed_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let paths = OutputPaths::new("out");
        assert_eq!(
            paths.assembly_document("CurrentLimitBox"),
            Path::new("out/native/CurrentLimitBox.json")
        );
        assert_eq!(
            paths.part_stl("SplineBracket-Holder"),
            Path::new("out/printed_files/SplineBracket-Holder.stl")
        );
        assert_eq!(
            paths.meshed_stl("CurrentLimitBox"),
            Path::new("out/printed_files/CurrentLimitBox (Meshed).stl")
        );
    }
}
