//! Per-run scratch directory

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::VidfixResult;

const SCRATCH_PREFIX: &str = "vfix_";

/// Owns the intermediate files of one repair run.
///
/// The directory is removed by `close`, or on drop if `close` is never
/// reached (panic, early return).
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Create a fresh directory under the system temp location
    pub fn create() -> VidfixResult<Self> {
        let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create the directory under `parent` instead
    pub fn create_in(parent: &Path) -> VidfixResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a named file inside the workspace
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory and everything in it; failures are only logged
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch directory {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_removes_contents() {
        let parent = tempfile::tempdir().unwrap();
        let workspace = ScratchWorkspace::create_in(parent.path()).unwrap();
        let root = workspace.path().to_path_buf();

        assert!(root
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SCRATCH_PREFIX));

        std::fs::write(workspace.file("s1.mp4"), b"data").unwrap();
        assert!(root.join("s1.mp4").exists());

        workspace.close();
        assert!(!root.exists());
    }

    #[test]
    fn test_drop_also_cleans_up() {
        let parent = tempfile::tempdir().unwrap();
        let root = {
            let workspace = ScratchWorkspace::create_in(parent.path()).unwrap();
            std::fs::write(workspace.file("audio.aac"), b"data").unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!root.exists());
    }
}
