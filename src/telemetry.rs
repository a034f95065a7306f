use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Everything goes to stderr: stdout is reserved for command output.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
