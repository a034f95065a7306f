use serde::{Deserialize, Serialize};

/// One transcript segment, aligned to whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: u64,
    pub end: u64,
    pub text: String,
}

/// Observations for one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub timestamp: f64,
    pub detections: Vec<String>,
    pub texts: Vec<String>,
    /// Dominant emotion, at most one entry.
    pub emotions: Vec<String>,
    pub is_scene_changed: bool,
}

/// Result of one completed run; the unit of caching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    pub frames: Vec<FrameRecord>,
    pub audio_transcription: Vec<TranscriptSegment>,
}
