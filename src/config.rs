//! Configuration loaded from the environment (a `.env` file is honored).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),
}

/// Pipeline settings and the external programs behind each capability.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerConfig {
    /// Language used when a request does not name one
    pub language: String,
    /// Analysis sampling rate (frames per second of video)
    pub target_fps: f64,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Directory holding cached artifacts
    pub json_data_dir: PathBuf,
    /// Scratch directory for extracted audio
    pub audios_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub detector_cmd: String,
    pub ocr_cmd: String,
    pub emotion_cmd: String,
    pub transcriber_cmd: String,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            language: string("PROCESSING_LANGUAGE", "en"),
            target_fps: parse_or(&lookup, "PROCESSING_FPS", 1.0),
            log_level: string("PROCESSING_LOG_LEVEL", "warn"),
            json_data_dir: PathBuf::from(string("JSON_DATA_DIR", "data/json")),
            audios_dir: PathBuf::from(string("AUDIOS_DIR", "data/audios")),
            ffmpeg_bin: string("FFMPEG_BIN", "ffmpeg"),
            detector_cmd: string("DETECTOR_CMD", "detect-objects {input}"),
            ocr_cmd: string("OCR_CMD", "recognize-text {input} --language {language}"),
            emotion_cmd: string("EMOTION_CMD", "classify-emotion {input}"),
            transcriber_cmd: string("TRANSCRIBER_CMD", "transcribe {input} --language {language}"),
        }
    }
}

/// Configuration of the HTTP boundary.
#[cfg(feature = "server")]
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Directory receiving uploads
    pub upload_dir: PathBuf,
    /// Upload body limit in bytes
    pub max_upload_size: usize,
    /// Uploads older than this are removed by the retention sweep
    pub retention_days: u64,
    pub bearer_token: String,
    /// Disables upload, listing and deletion
    pub process_files_only: bool,
    pub allow_outside_upload_dir: bool,
    /// Pipeline runs allowed at once; further process requests wait
    pub max_concurrent_jobs: usize,
}

#[cfg(feature = "server")]
impl ServerConfig {
    /// Load configuration from environment variables.
    /// Fails if `BEARER_TOKEN` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bearer_token = lookup("BEARER_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing("BEARER_TOKEN"))?;

        Ok(Self {
            addr: lookup("ADDR").unwrap_or_else(|| String::from("127.0.0.1")),
            port: parse_or(&lookup, "PORT", 3330),
            upload_dir: PathBuf::from(lookup("FILE_UPLOAD_DIR").unwrap_or_else(|| String::from("uploads"))),
            max_upload_size: parse_or(&lookup, "FILE_MAX_UPLOAD_SIZE", 500 * 1024 * 1024),
            retention_days: parse_or(&lookup, "FILE_RETENTION_DAYS", 2),
            bearer_token,
            process_files_only: parse_or(&lookup, "PROCESS_FILES_ONLY", false),
            allow_outside_upload_dir: parse_or(&lookup, "ALLOW_PROCESS_FILES_OUTSIDE_UPLOAD_DIR", false),
            max_concurrent_jobs: parse_or(&lookup, "PROCESS_MAX_CONCURRENT_JOBS", 2usize).max(1),
        })
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}, using default", key, raw);
            default
        }),
    }
}
