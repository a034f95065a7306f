use crate::error::PipelineError;
use std::fmt;
use std::path::Path;

/// Artifact identity: `<file stem>_<language>`.
///
/// Two paths sharing a file name resolve to the same key whatever their
/// directory, so the same recording uploaded twice is analyzed once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(video_path: &Path, language: &str) -> Result<Self, PipelineError> {
        let stem = video_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| PipelineError::CacheKey(video_path.to_path_buf()))?;

        Ok(Self(format!("{}_{}", stem, language)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
