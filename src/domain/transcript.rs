use super::artifact::TranscriptSegment;
use serde::{Deserialize, Serialize};

/// Segment as produced by a speech transcriber, offsets in fractional seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Truncate offsets to whole seconds, keeping order and text untouched.
pub fn align(segments: Vec<RawSegment>) -> Vec<TranscriptSegment> {
    segments
        .into_iter()
        .map(|segment| TranscriptSegment {
            start: whole_seconds(segment.start),
            end: whole_seconds(segment.end),
            text: segment.text,
        })
        .collect()
}

fn whole_seconds(offset: f64) -> u64 {
    // saturating cast: negatives and NaN land on 0
    offset.floor() as u64
}
