//! Black-box analysis capabilities consumed by the pipeline.
//!
//! Every call blocks until the engine answers. Implementations are built once
//! by the caller and shared across runs.

use crate::domain::transcript::RawSegment;
use crate::error::CapabilityError;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(alias = "class")]
    pub class_label: String,
    pub confidence: f32,
}

/// Corner points of a recognized text region, in pixels.
pub type BoundingBox = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedText {
    #[serde(default)]
    pub bounding_box: BoundingBox,
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

/// Pulls the audio track of a video into a waveform file at `output`.
#[cfg_attr(test, mockall::automock)]
pub trait AudioExtractor: Send + Sync {
    fn extract(&self, video: &Path, output: &Path) -> Result<(), CapabilityError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Transcriber: Send + Sync {
    /// Ordered, chronological speech segments.
    fn transcribe(&self, audio: &Path, language: &str) -> Result<Vec<RawSegment>, CapabilityError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync {
    /// One entry per detected instance, in the detector's order.
    fn detect(&self, frame: &RgbImage) -> Result<Vec<Detection>, CapabilityError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait TextRecognizer: Send + Sync {
    fn recognize(
        &self,
        frame: &RgbImage,
        language: &str,
    ) -> Result<Vec<RecognizedText>, CapabilityError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait EmotionClassifier: Send + Sync {
    /// Top-scoring emotion, if a face was found.
    fn classify(&self, frame: &RgbImage) -> Result<Option<EmotionScore>, CapabilityError>;
}
