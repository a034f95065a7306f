use crate::error::CapabilityError;
use crate::ports::capabilities::AudioExtractor;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Extracts the audio track with the ffmpeg command line tool.
pub struct FfmpegAudioExtractor {
    program: PathBuf,
}

impl FfmpegAudioExtractor {
    /// Resolve `program` on `PATH` (or as a path) once, up front.
    pub fn new(program: &str) -> Result<Self, CapabilityError> {
        let program = which::which(program)
            .map_err(|_| CapabilityError::Unavailable(program.to_string()))?;
        info!(program = ?program, "Audio extractor ready");
        Ok(Self { program })
    }
}

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract(&self, video: &Path, output: &Path) -> Result<(), CapabilityError> {
        let result = Command::new(&self.program)
            .arg("-y")
            .arg("-loglevel").arg("quiet")
            .arg("-i").arg(video)
            .arg("-map").arg("a")
            .arg("-q:a").arg("0")
            .arg(output)
            .output()
            .map_err(|source| CapabilityError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            return Err(CapabilityError::Failed {
                program: self.program.display().to_string(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
