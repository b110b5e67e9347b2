//! Logging initialization: logs go only to a file (or are dropped), never to the terminal.
//!
//! stdout carries program output and prompts, so nothing else may write there.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const DEFAULT_FILTER: &str = "info,hyper_util=off,reqwest=warn";

/// Initializes tracing.
///
/// - **RUST_LOG**: filter, e.g. `debug` or `compila=debug`. Default: `info,hyper_util=off,reqwest=warn`.
/// - **LOG_FILE**: when set, logs are appended to this file as plain text; otherwise dropped.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    match std::env::var("LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(crate::log_format::TextWithSpanIds::new())
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(path = %path, "compila logging to file");
        }
        _ => {
            let sink_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(sink_layer).try_init()?;
        }
    }
    Ok(())
}
