//! Vidscribe - Video Analysis Library
//!
//! Turns a video file into a time-indexed JSON description: transcript
//! segments plus, for frames sampled at a fixed rate, detected objects,
//! on-screen text, a dominant emotion and a scene-change flag.
//!
//! Hexagonal Architecture:
//! - domain/: Pure analysis logic (sampling, scene changes, transcripts, timeline)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations (ffmpeg, external programs, filesystem, HTTP)
//! - application/: Generic services
//! - config: Environment configuration
//!
//! # Features
//! - `ffmpeg`: Native frame decoding through libav (needed by both binaries)
//! - `server`: Authenticated HTTP boundary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod telemetry;

pub use config::AnalyzerConfig;
#[cfg(feature = "server")]
pub use config::ServerConfig;
pub use domain::timeline::{build_timeline, TimelineEntry};
pub use domain::AnalysisArtifact;
pub use error::PipelineError;

#[cfg(feature = "ffmpeg")]
pub use pipeline::{build_pipeline, Pipeline};

#[cfg(feature = "ffmpeg")]
mod pipeline {
    use crate::adapters::command::CommandCapability;
    use crate::adapters::ffmpeg::{FfmpegAudioExtractor, FfmpegVideoOpener};
    use crate::adapters::fs::FsArtifactStore;
    use crate::application::analyzer::FrameAnalyzer;
    use crate::application::orchestrator::{OrchestratorService, PipelineSettings};
    use crate::config::AnalyzerConfig;

    pub type Pipeline =
        OrchestratorService<FfmpegAudioExtractor, CommandCapability, FfmpegVideoOpener, FsArtifactStore>;

    /// Resolve every capability once and assemble the pipeline.
    pub fn build_pipeline(
        config: &AnalyzerConfig,
    ) -> Result<Pipeline, Box<dyn std::error::Error + Send + Sync>> {
        let analyzer = FrameAnalyzer::new(
            CommandCapability::new(&config.detector_cmd)?,
            CommandCapability::new(&config.ocr_cmd)?,
            CommandCapability::new(&config.emotion_cmd)?,
        );

        Ok(OrchestratorService::new(
            FfmpegAudioExtractor::new(&config.ffmpeg_bin)?,
            CommandCapability::new(&config.transcriber_cmd)?,
            FfmpegVideoOpener::new()?,
            FsArtifactStore::new(&config.json_data_dir)?,
            analyzer,
            PipelineSettings {
                audio_dir: config.audios_dir.clone(),
                target_fps: config.target_fps,
            },
        ))
    }
}
