//! ffmpeg-backed audio extraction and frame decoding.

mod audio;
#[cfg(feature = "ffmpeg")]
mod video;

pub use audio::FfmpegAudioExtractor;
#[cfg(feature = "ffmpeg")]
pub use video::{FfmpegVideoOpener, FfmpegVideoSource};
