use crate::error::PipelineError;
use std::path::{Path, PathBuf};

/// A language tag usable in cache file names: ASCII letters, digits, `-` and `_`.
pub fn is_valid_language(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Identity of one pipeline invocation. Only constructible through validation.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoJob {
    video_path: PathBuf,
    language: String,
    target_fps: f64,
}

impl VideoJob {
    pub fn new(
        video_path: impl AsRef<Path>,
        language: &str,
        target_fps: f64,
    ) -> Result<Self, PipelineError> {
        let video_path = video_path.as_ref();

        if video_path.as_os_str().is_empty() {
            return Err(PipelineError::validation("video path is empty"));
        }
        if !video_path.is_file() {
            return Err(PipelineError::validation(format!(
                "video file {:?} does not exist",
                video_path
            )));
        }
        if language.trim().is_empty() {
            return Err(PipelineError::validation("language is empty"));
        }
        if !is_valid_language(language) {
            return Err(PipelineError::validation(format!(
                "language {:?} may only contain ASCII letters, digits, '-' and '_'",
                language
            )));
        }
        if !target_fps.is_finite() || target_fps <= 0.0 {
            return Err(PipelineError::validation(format!(
                "target fps must be a positive number, got {}",
                target_fps
            )));
        }

        Ok(Self {
            video_path: video_path.to_path_buf(),
            language: language.to_string(),
            target_fps,
        })
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_valid_job() {
        let video = NamedTempFile::new().unwrap();
        let job = VideoJob::new(video.path(), "en", 1.0).unwrap();
        assert_eq!(job.video_path(), video.path());
        assert_eq!(job.language(), "en");
        assert_eq!(job.target_fps(), 1.0);
    }

    #[test]
    fn test_empty_path() {
        let result = VideoJob::new("", "en", 1.0);
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = VideoJob::new("does/not/exist.mp4", "en", 1.0);
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = VideoJob::new(dir.path(), "en", 1.0);
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_empty_language() {
        let video = NamedTempFile::new().unwrap();
        let result = VideoJob::new(video.path(), "  ", 1.0);
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_language_with_path_characters() {
        let video = NamedTempFile::new().unwrap();
        for language in ["pt/BR", "..", "en\\us", "en us", "fr.ca"] {
            let result = VideoJob::new(video.path(), language, 1.0);
            assert!(
                matches!(result, Err(PipelineError::Validation(_))),
                "{}",
                language
            );
        }
    }

    #[test]
    fn test_language_tags() {
        assert!(is_valid_language("en"));
        assert!(is_valid_language("pt-BR"));
        assert!(is_valid_language("zh_Hant"));
        assert!(!is_valid_language(""));
        assert!(!is_valid_language("../en"));
    }

    #[test]
    fn test_non_positive_fps() {
        let video = NamedTempFile::new().unwrap();
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = VideoJob::new(video.path(), "en", fps);
            assert!(matches!(result, Err(PipelineError::Validation(_))), "{}", fps);
        }
    }
}
