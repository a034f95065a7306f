use crate::application::analyzer::FrameAnalyzer;
use crate::domain::audio::AudioTrack;
use crate::domain::sampler::FrameSampler;
use crate::domain::scene::SceneChangeDetector;
use crate::domain::transcript::align;
use crate::domain::{AnalysisArtifact, CacheKey, FrameRecord, TranscriptSegment, VideoJob};
use crate::error::PipelineError;
use crate::ports::analysis::AnalysisPort;
use crate::ports::cache::ArtifactStore;
use crate::ports::capabilities::{AudioExtractor, Transcriber};
use crate::ports::video::VideoOpener;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span};

/// Where one run currently is. `Failed` is reachable from every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    CacheCheck,
    ExtractingAudio,
    Transcribing,
    SamplingFrames,
    PersistingResult,
    Done,
    Failed,
}

struct Run {
    stage: Stage,
}

impl Run {
    fn advance(&mut self, next: Stage) {
        debug!(from = ?self.stage, to = ?next, "Stage transition");
        self.stage = next;
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Scratch directory for extracted audio.
    pub audio_dir: PathBuf,
    /// Analysis sampling rate.
    pub target_fps: f64,
}

pub struct OrchestratorService<A, T, V, S> {
    extractor: A,
    transcriber: T,
    opener: V,
    store: S,
    analyzer: FrameAnalyzer,
    settings: PipelineSettings,
}

impl<A, T, V, S> OrchestratorService<A, T, V, S>
where
    A: AudioExtractor,
    T: Transcriber,
    V: VideoOpener,
    S: ArtifactStore,
{
    pub fn new(
        extractor: A,
        transcriber: T,
        opener: V,
        store: S,
        analyzer: FrameAnalyzer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            transcriber,
            opener,
            store,
            analyzer,
            settings,
        }
    }

    /// Analyze `video_path`, or return the stored artifact for the same
    /// (video, language) pair without touching any capability.
    pub fn run(
        &self,
        video_path: &Path,
        language: &str,
    ) -> Result<AnalysisArtifact, PipelineError> {
        let span = info_span!("analysis", video = %video_path.display(), language);
        let _guard = span.enter();

        let mut run = Run {
            stage: Stage::Validating,
        };

        match self.execute(&mut run, video_path, language) {
            Ok(artifact) => {
                run.advance(Stage::Done);
                Ok(artifact)
            }
            Err(e) => {
                error!(stage = ?run.stage, "Processing failed: {}", e);
                run.advance(Stage::Failed);
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        run: &mut Run,
        video_path: &Path,
        language: &str,
    ) -> Result<AnalysisArtifact, PipelineError> {
        // 1. Validate before any side effect
        let job = VideoJob::new(video_path, language, self.settings.target_fps)?;

        // 2. Cache
        run.advance(Stage::CacheCheck);
        let key = CacheKey::derive(job.video_path(), job.language())?;
        if let Some(cached) = self.store.lookup(&key) {
            info!(key = %key, "Cache hit, skipping analysis");
            return Ok(cached);
        }
        info!(key = %key, "Processing started");

        // 3. Audio
        run.advance(Stage::ExtractingAudio);
        let audio = self.extract_audio(&job)?;

        run.advance(Stage::Transcribing);
        let audio_transcription = self.transcribe(&job, audio)?;

        // 4. Frames
        run.advance(Stage::SamplingFrames);
        let frames = self.analyze_frames(&job)?;

        // 5. Persist
        run.advance(Stage::PersistingResult);
        let artifact = AnalysisArtifact {
            frames,
            audio_transcription,
        };
        if let Err(e) = self.store.store(&key, &artifact) {
            error!(key = %key, "Failed to persist artifact: {}", e);
        }

        info!(
            frames = artifact.frames.len(),
            segments = artifact.audio_transcription.len(),
            "Processing successfully completed"
        );
        Ok(artifact)
    }

    fn extract_audio(&self, job: &VideoJob) -> Result<AudioTrack, PipelineError> {
        let extraction_error = |reason: String| PipelineError::Extraction {
            path: job.video_path().to_path_buf(),
            reason,
        };

        std::fs::create_dir_all(&self.settings.audio_dir).map_err(|e| {
            extraction_error(format!(
                "cannot create {:?}: {}",
                self.settings.audio_dir, e
            ))
        })?;

        let stem = job
            .video_path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("audio");
        let audio = AudioTrack::reserve(&self.settings.audio_dir, stem);

        self.extractor
            .extract(job.video_path(), audio.path())
            .map_err(|e| extraction_error(e.to_string()))?;

        if !audio.is_present() {
            return Err(extraction_error("no audio was produced".to_string()));
        }
        debug!(audio = ?audio.path(), "Audio extracted");
        Ok(audio)
    }

    /// Consumes the track: the audio file is gone once this returns.
    fn transcribe(
        &self,
        job: &VideoJob,
        audio: AudioTrack,
    ) -> Result<Vec<TranscriptSegment>, PipelineError> {
        let segments = self.transcriber.transcribe(audio.path(), job.language());
        drop(audio);

        let segments = segments.map_err(PipelineError::Transcription)?;
        Ok(align(segments))
    }

    fn analyze_frames(&self, job: &VideoJob) -> Result<Vec<FrameRecord>, PipelineError> {
        let mut source = self.opener.open(job.video_path())?;
        let mut scenes = SceneChangeDetector::new();

        let sampler = FrameSampler::new(source.as_mut(), job.target_fps());
        debug!(frame_skip = sampler.frame_skip(), "Sampling frames");

        let mut frames = Vec::new();
        for sample in sampler {
            let is_scene_changed = scenes.check_frame(&sample.image);
            frames.push(self.analyzer.analyze(
                &sample.frame,
                &sample.image,
                job.language(),
                is_scene_changed,
            ));
        }
        Ok(frames)
    }
}

impl<A, T, V, S> AnalysisPort for OrchestratorService<A, T, V, S>
where
    A: AudioExtractor,
    T: Transcriber,
    V: VideoOpener,
    S: ArtifactStore,
{
    fn analyze(&self, video_path: &Path, language: &str) -> Result<AnalysisArtifact, PipelineError> {
        self.run(video_path, language)
    }
}
