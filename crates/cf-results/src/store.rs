//! Output directory layout and manifest storage.

use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = "history.dat";
pub const FIELD_FILE: &str = "cavity.dat";
pub const CHECKPOINT_FILE: &str = "restart.out";
pub const MANIFEST_FILE: &str = "run.json";

/// One run's output directory.
#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    /// Open `root_dir`, creating it when missing.
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Open an existing directory without creating anything.
    pub fn open(root_dir: &Path) -> ResultsResult<Self> {
        if !root_dir.is_dir() {
            return Err(ResultsError::RunNotFound {
                dir: root_dir.display().to_string(),
            });
        }
        Ok(Self {
            root_dir: root_dir.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn history_path(&self) -> PathBuf {
        self.root_dir.join(HISTORY_FILE)
    }

    pub fn field_path(&self) -> PathBuf {
        self.root_dir.join(FIELD_FILE)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root_dir.join(CHECKPOINT_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_dir.join(MANIFEST_FILE)
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest_path().exists()
    }

    pub fn save_manifest(&self, manifest: &RunManifest) -> ResultsResult<()> {
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(), manifest_json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<RunManifest> {
        let manifest_path = self.manifest_path();

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                dir: self.root_dir.display().to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }
}
