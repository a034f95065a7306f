//! Fixed-rate frame sampling.
//!
//! Samples are taken every `frame_skip` source frames and stamped with
//! `sample_index / target_fps`, never with the decoder-reported time.

use crate::ports::video::VideoSource;
use image::RgbImage;
use tracing::warn;

/// Source frames between two samples: `floor(source_fps / target_fps)`, at least 1.
pub fn frame_skip(source_fps: f64, target_fps: f64) -> u64 {
    let skip = (source_fps / target_fps).floor();
    if skip.is_finite() && skip >= 1.0 {
        skip as u64
    } else {
        1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledFrame {
    /// Frame number in the source video.
    pub index: u64,
    pub timestamp: f64,
}

pub struct Sample {
    pub frame: SampledFrame,
    pub image: RgbImage,
}

/// Lazy, finite, single-pass sequence of samples over an open source.
pub struct FrameSampler<'a> {
    source: &'a mut dyn VideoSource,
    target_fps: f64,
    frame_skip: u64,
    sample_index: u64,
    exhausted: bool,
}

impl<'a> FrameSampler<'a> {
    pub fn new(source: &'a mut dyn VideoSource, target_fps: f64) -> Self {
        let frame_skip = frame_skip(source.frame_rate(), target_fps);
        Self {
            source,
            target_fps,
            frame_skip,
            sample_index: 0,
            exhausted: false,
        }
    }

    pub fn frame_skip(&self) -> u64 {
        self.frame_skip
    }
}

impl Iterator for FrameSampler<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.exhausted {
            return None;
        }

        let index = self.sample_index * self.frame_skip;
        let image = match self.source.read_at(index) {
            Ok(Some(image)) => image,
            Ok(None) => {
                self.exhausted = true;
                return None;
            }
            Err(e) => {
                warn!("Stopping frame sampling: {}", e);
                self.exhausted = true;
                return None;
            }
        };

        let frame = SampledFrame {
            index,
            timestamp: self.sample_index as f64 / self.target_fps,
        };
        self.sample_index += 1;

        Some(Sample { frame, image })
    }
}
