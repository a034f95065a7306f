use crate::domain::{AnalysisArtifact, CacheKey};
use crate::error::CacheError;

#[cfg_attr(test, mockall::automock)]
pub trait ArtifactStore: Send + Sync {
    /// Previously stored artifact. Unreadable or corrupt entries are misses.
    fn lookup(&self, key: &CacheKey) -> Option<AnalysisArtifact>;

    /// Store `artifact` under `key`; readers never see a partial entry.
    fn store(&self, key: &CacheKey, artifact: &AnalysisArtifact) -> Result<(), CacheError>;
}
