use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use vidscribe::{build_pipeline, build_timeline, telemetry, AnalyzerConfig};

#[derive(Debug, Parser)]
#[command(version, about = "Describe a video as time-indexed JSON")]
pub struct Args {
    /// Video file to analyze.
    video_path: PathBuf,
    /// Spoken/written language of the video. Defaults to PROCESSING_LANGUAGE.
    #[arg(long, short)]
    language: Option<String>,
    /// Frames analyzed per second of video. Defaults to PROCESSING_FPS.
    #[arg(long)]
    fps: Option<f64>,
    /// Print the transcript-aligned timeline instead of the raw artifact.
    #[arg(long, action, default_value = "false")]
    timeline: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = AnalyzerConfig::from_env();
    telemetry::init(&config.log_level);

    if let Some(fps) = args.fps {
        config.target_fps = fps;
    }
    let language = args.language.unwrap_or_else(|| config.language.clone());

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let artifact = match pipeline.run(&args.video_path, &language) {
        Ok(artifact) => artifact,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = if args.timeline {
        serde_json::to_string_pretty(&build_timeline(&artifact))
    } else {
        serde_json::to_string_pretty(&artifact)
    };

    let written = rendered
        .map_err(std::io::Error::from)
        .and_then(|json| writeln!(std::io::stdout().lock(), "{}", json));
    if let Err(e) = written {
        eprintln!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
