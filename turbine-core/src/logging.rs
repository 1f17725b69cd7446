use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Crates whose request-level chatter is capped at warn unless RUST_LOG says otherwise
const NOISY_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Install the global tracing subscriber.
///
/// `format = "json"` emits one JSON object per event, anything else the
/// multi-line pretty format. With `file_path` set, output is appended to that
/// file instead of stdout. Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let writer = match &config.file_path {
        Some(path) => BoxMakeWriter::new(Arc::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let layer = if config.format == "json" {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_line_number(true)
            .with_file(false)
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()?;
    Ok(())
}

fn default_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    let directives = NOISY_TARGETS
        .iter()
        .fold(level, |acc, target| format!("{acc},{target}=warn"));
    EnvFilter::new(directives)
}

fn open_log_file(path: &str) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow::anyhow!("Invalid log level: {level}")),
    }
}
