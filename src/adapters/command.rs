//! Capabilities backed by external programs.
//!
//! A capability is configured as a command template such as
//! `recognize-text {input} --language {language}`. The template is split on
//! whitespace; `{input}` becomes the path of the media to analyze (frames are
//! written to a temporary PNG first) and `{language}` the requested language.
//! The program must print its result as JSON on stdout.

use crate::domain::transcript::RawSegment;
use crate::error::CapabilityError;
use crate::ports::capabilities::{
    Detection, EmotionClassifier, EmotionScore, ObjectDetector, RecognizedText, TextRecognizer,
    Transcriber,
};
use image::{ImageFormat, RgbImage};
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

const INPUT_PLACEHOLDER: &str = "{input}";
const LANGUAGE_PLACEHOLDER: &str = "{language}";

#[derive(Debug, Clone)]
pub struct CommandCapability {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCapability {
    pub fn new(template: &str) -> Result<Self, CapabilityError> {
        let mut parts = template.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| CapabilityError::Unavailable(template.to_string()))?;
        let program =
            which::which(name).map_err(|_| CapabilityError::Unavailable(name.to_string()))?;

        info!(program = ?program, "Capability ready");
        Ok(Self {
            program,
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn arguments(&self, input: &Path, language: &str) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| {
                if arg == INPUT_PLACEHOLDER {
                    input.as_os_str().to_os_string()
                } else {
                    OsString::from(arg.replace(LANGUAGE_PLACEHOLDER, language))
                }
            })
            .collect()
    }

    fn run<T: DeserializeOwned>(&self, input: &Path, language: &str) -> Result<T, CapabilityError> {
        let program = self.program.display().to_string();
        debug!(program = %program, input = ?input, "Running capability");

        let output = Command::new(&self.program)
            .args(self.arguments(input, language))
            .output()
            .map_err(|source| CapabilityError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CapabilityError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn run_on_frame<T: DeserializeOwned>(
        &self,
        frame: &RgbImage,
        language: &str,
    ) -> Result<T, CapabilityError> {
        // Removed when dropped, whatever the outcome.
        let file = tempfile::Builder::new()
            .prefix("frame_")
            .suffix(".png")
            .tempfile()?;
        frame.save_with_format(file.path(), ImageFormat::Png)?;
        self.run(file.path(), language)
    }
}

impl ObjectDetector for CommandCapability {
    fn detect(&self, frame: &RgbImage) -> Result<Vec<Detection>, CapabilityError> {
        self.run_on_frame(frame, "")
    }
}

impl TextRecognizer for CommandCapability {
    fn recognize(
        &self,
        frame: &RgbImage,
        language: &str,
    ) -> Result<Vec<RecognizedText>, CapabilityError> {
        self.run_on_frame(frame, language)
    }
}

impl EmotionClassifier for CommandCapability {
    fn classify(&self, frame: &RgbImage) -> Result<Option<EmotionScore>, CapabilityError> {
        self.run_on_frame(frame, "")
    }
}

impl Transcriber for CommandCapability {
    fn transcribe(&self, audio: &Path, language: &str) -> Result<Vec<RawSegment>, CapabilityError> {
        self.run(audio, language)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn frame() -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
    }

    #[test]
    fn test_empty_template_is_unavailable() {
        assert!(matches!(
            CommandCapability::new("   "),
            Err(CapabilityError::Unavailable(_))
        ));
    }

    #[test]
    fn test_unknown_program_is_unavailable() {
        let result = CommandCapability::new("no-such-detector {input}");
        assert!(matches!(result, Err(CapabilityError::Unavailable(name)) if name == "no-such-detector"));
    }

    #[test]
    fn test_placeholders_are_substituted() {
        let capability = CommandCapability::new("echo {input} --lang={language} {language}").unwrap();
        let args = capability.arguments(Path::new("/tmp/frame.png"), "fr");
        assert_eq!(args, ["/tmp/frame.png", "--lang=fr", "fr"]);
    }

    #[test]
    fn test_detector_parses_stdout() {
        let capability =
            CommandCapability::new(r#"echo [{"class":"person","confidence":0.9}]"#).unwrap();

        let detections = capability.detect(&frame()).unwrap();

        assert_eq!(
            detections,
            [Detection {
                class_label: "person".to_string(),
                confidence: 0.9
            }]
        );
    }

    #[test]
    fn test_classifier_accepts_null() {
        let capability = CommandCapability::new("echo null").unwrap();
        assert_eq!(capability.classify(&frame()).unwrap(), None);
    }

    #[test]
    fn test_transcriber_reads_input_and_language() {
        let temp_dir = tempdir().unwrap();
        let segments = temp_dir.path().join("segments.json");
        std::fs::write(&segments, r#"[{"start":0.4,"end":8.7,"text":"hello"}]"#).unwrap();

        let capability = CommandCapability::new("cat {input}").unwrap();
        let result = capability.transcribe(&segments, "en").unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "hello");

        let capability =
            CommandCapability::new(r#"echo [{"start":0,"end":1,"text":"{language}"}]"#).unwrap();
        let result = capability.transcribe(&segments, "de").unwrap();
        assert_eq!(result[0].text, "de");
    }

    #[test]
    fn test_recognizer_receives_existing_png() {
        // `test -s` succeeds only on a non-empty file and prints nothing.
        let capability = CommandCapability::new("test -s {input}").unwrap();
        let result = capability.recognize(&frame(), "en");
        assert!(matches!(result, Err(CapabilityError::Output(_))));
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let capability = CommandCapability::new("false").unwrap();
        assert!(matches!(
            capability.detect(&frame()),
            Err(CapabilityError::Failed { .. })
        ));
    }

    #[test]
    fn test_garbage_output_is_output_error() {
        let capability = CommandCapability::new("echo nope").unwrap();
        assert!(matches!(
            capability.detect(&frame()),
            Err(CapabilityError::Output(_))
        ));
    }
}
