use crate::error::{FrameReadError, PipelineError};
use image::RgbImage;
use std::path::Path;

/// An opened video, read at increasing frame indices.
pub trait VideoSource {
    /// Native frame rate; 0.0 when the container does not report one.
    fn frame_rate(&self) -> f64;

    /// Decode the frame at `index`. `Ok(None)` past the end of the stream.
    fn read_at(&mut self, index: u64) -> Result<Option<RgbImage>, FrameReadError>;
}

pub trait VideoOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, PipelineError>;
}
