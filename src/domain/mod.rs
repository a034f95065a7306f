//! Domain layer - Pure analysis logic.

pub mod artifact;
pub mod audio;
pub mod cache_key;
pub mod job;
pub mod sampler;
pub mod scene;
pub mod timeline;
pub mod transcript;

pub use artifact::{AnalysisArtifact, FrameRecord, TranscriptSegment};
pub use cache_key::CacheKey;
pub use job::VideoJob;
