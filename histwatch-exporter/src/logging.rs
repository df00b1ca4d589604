//! Logging setup for the exporter binary.

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise `level` for histwatch crates
/// and `warn` for the HTTP stack.
pub fn env_filter(level: &str) -> EnvFilter {
    let default = format!(
        "{level},histwatch_exporter={level},histwatch_telemetry={level},reqwest=warn,hyper=warn"
    );
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global `fmt` subscriber. Safe to call once per process.
pub fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_level(true)
        .init();
}
