use crate::domain::sampler::SampledFrame;
use crate::domain::FrameRecord;
use crate::ports::capabilities::{EmotionClassifier, ObjectDetector, TextRecognizer};
use image::RgbImage;
use tracing::warn;

/// Runs the per-frame capabilities and merges their answers into one record.
///
/// Capabilities are independent: a failing one only empties its own field.
pub struct FrameAnalyzer {
    detector: Box<dyn ObjectDetector>,
    recognizer: Box<dyn TextRecognizer>,
    classifier: Box<dyn EmotionClassifier>,
}

impl FrameAnalyzer {
    pub fn new(
        detector: impl ObjectDetector + 'static,
        recognizer: impl TextRecognizer + 'static,
        classifier: impl EmotionClassifier + 'static,
    ) -> Self {
        Self {
            detector: Box::new(detector),
            recognizer: Box::new(recognizer),
            classifier: Box::new(classifier),
        }
    }

    pub fn analyze(
        &self,
        frame: &SampledFrame,
        image: &RgbImage,
        language: &str,
        is_scene_changed: bool,
    ) -> FrameRecord {
        let detections = match self.detector.detect(image) {
            Ok(detections) => detections.into_iter().map(|d| d.class_label).collect(),
            Err(e) => {
                warn!(frame = frame.index, "Object detection failed: {}", e);
                Vec::new()
            }
        };

        let texts = match self.recognizer.recognize(image, language) {
            Ok(texts) => texts.into_iter().map(|t| t.text).collect(),
            Err(e) => {
                warn!(frame = frame.index, "Text recognition failed: {}", e);
                Vec::new()
            }
        };

        let emotions = match self.classifier.classify(image) {
            Ok(top) => top.into_iter().map(|e| e.label).collect(),
            Err(e) => {
                warn!(frame = frame.index, "Emotion classification failed: {}", e);
                Vec::new()
            }
        };

        FrameRecord {
            timestamp: frame.timestamp,
            detections,
            texts,
            emotions,
            is_scene_changed,
        }
    }
}
