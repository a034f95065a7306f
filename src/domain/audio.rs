use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Extracted waveform owned by one run. The file is removed when the track
/// is dropped, whichever way the run ends.
#[derive(Debug)]
pub struct AudioTrack {
    path: PathBuf,
}

impl AudioTrack {
    /// Reserve a fresh path in `dir` for the audio of `video_stem`.
    pub fn reserve(dir: &Path, video_stem: &str) -> Self {
        let name = format!("{}_{}.wav", video_stem, uuid::Uuid::new_v4());
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the extractor left a non-empty file behind.
    pub fn is_present(&self) -> bool {
        self.path
            .metadata()
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }
}

impl Drop for AudioTrack {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove audio file {:?}: {}", self.path, e),
        }
    }
}
