//! Transcript-driven view of an artifact.
//!
//! Collapses per-frame observations into one entry per spoken segment, plus
//! silent stretches before the first and after the last segment.

use super::artifact::{AnalysisArtifact, FrameRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    pub audio_transcription: String,
    pub on_screen_texts: Vec<String>,
    pub detections: Vec<String>,
}

impl TimelineEntry {
    fn collect<'a>(
        start: f64,
        end: f64,
        text: &str,
        frames: impl Iterator<Item = &'a FrameRecord>,
    ) -> Self {
        let mut entry = Self {
            start_timestamp: start,
            end_timestamp: end,
            audio_transcription: text.to_string(),
            on_screen_texts: Vec::new(),
            detections: Vec::new(),
        };
        for frame in frames {
            push_unique(&mut entry.on_screen_texts, &frame.texts);
            push_unique(&mut entry.detections, &frame.detections);
        }
        entry
    }
}

fn push_unique(target: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}

pub fn build_timeline(artifact: &AnalysisArtifact) -> Vec<TimelineEntry> {
    let frames = &artifact.frames;
    let segments = &artifact.audio_transcription;
    let last_frame = frames.last().map(|f| f.timestamp);

    let (first, last) = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return match last_frame {
                Some(end) => vec![TimelineEntry::collect(0.0, end, "", frames.iter())],
                None => Vec::new(),
            };
        }
    };

    let mut timeline = Vec::with_capacity(segments.len() + 2);

    if first.start > 0 {
        let end = first.start as f64;
        timeline.push(TimelineEntry::collect(
            0.0,
            end,
            "",
            frames.iter().filter(|f| f.timestamp < end),
        ));
    }

    for segment in segments {
        let (start, end) = (segment.start as f64, segment.end as f64);
        timeline.push(TimelineEntry::collect(
            start,
            end,
            &segment.text,
            frames
                .iter()
                .filter(|f| f.timestamp >= start && f.timestamp < end),
        ));
    }

    if let Some(last_frame) = last_frame {
        let end = last.end as f64;
        if end <= last_frame {
            timeline.push(TimelineEntry::collect(
                end,
                last_frame,
                "",
                frames.iter().filter(|f| f.timestamp >= end),
            ));
        }
    }

    timeline
}
