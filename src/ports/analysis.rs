use crate::domain::AnalysisArtifact;
use crate::error::PipelineError;
use std::path::Path;

/// Inbound port: run (or fetch) the analysis of one video.
#[cfg_attr(test, mockall::automock)]
pub trait AnalysisPort: Send + Sync {
    fn analyze(&self, video_path: &Path, language: &str) -> Result<AnalysisArtifact, PipelineError>;
}
