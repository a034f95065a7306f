//! Server Binary - Authenticated HTTP boundary around the analysis pipeline
//!
//! It wires up:
//! - ffmpeg / external-program capabilities and the filesystem cache
//! - the HTTP routes (upload, files, delete, process)
//! - the hourly retention sweep

use std::sync::Arc;
use vidscribe::adapters::http::{self, retention, AppState};
use vidscribe::{build_pipeline, telemetry, AnalyzerConfig, ServerConfig};

#[tokio::main]
async fn main() {
    let analyzer_config = AnalyzerConfig::from_env();
    telemetry::init(&analyzer_config.log_level);

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 1. Pipeline (capabilities are resolved once, here)
    let pipeline = match build_pipeline(&analyzer_config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Failed to initialize the pipeline: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.upload_dir) {
        eprintln!("Cannot create upload dir {:?}: {}", config.upload_dir, e);
        std::process::exit(1);
    }

    // 2. Retention sweep
    retention::spawn(
        vec![
            config.upload_dir.clone(),
            analyzer_config.audios_dir.clone(),
            analyzer_config.json_data_dir.clone(),
        ],
        retention::days(config.retention_days),
    );

    // 3. HTTP Layer
    let addr = format!("{}:{}", config.addr, config.port);
    let app = http::router(AppState::new(
        config,
        Arc::new(pipeline),
        analyzer_config.language.clone(),
    ));

    // 4. Start Server
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening at {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
