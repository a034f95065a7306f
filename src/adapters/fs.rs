use crate::domain::{AnalysisArtifact, CacheKey};
use crate::error::CacheError;
use crate::ports::cache::ArtifactStore;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Flat directory of `<key>.json` artifacts.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Open the store, creating `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn lookup(&self, key: &CacheKey) -> Option<AnalysisArtifact> {
        let path = self.entry_path(key);

        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                debug!(key = %key, error = %e, "Cache miss");
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(artifact) => {
                debug!(key = %key, "Cache hit");
                Some(artifact)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable cache entry, treating as miss");
                None
            }
        }
    }

    fn store(&self, key: &CacheKey, artifact: &AnalysisArtifact) -> Result<(), CacheError> {
        // Written next to the target so the final rename stays on one filesystem.
        let mut file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer(&mut writer, artifact)?;
            writer.flush()?;
        }
        file.as_file().sync_all()?;
        file.persist(self.entry_path(key))?;

        debug!(key = %key, "Artifact stored");
        Ok(())
    }
}
