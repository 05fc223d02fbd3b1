//! Structured logging initialisation.
//!
//! Output is either human-readable lines for development or
//! newline-delimited JSON for log aggregation, selected by [`LogFormat`].
//! `RUST_LOG` overrides the filter at runtime; without it the
//! caller-supplied level string applies (e.g. `"info"`,
//! `"debug,idgate_session=trace"`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Coloured, human-oriented lines for a developer terminal.
    Human,
    /// One JSON object per line, for shipping to an aggregator.
    Json,
}

impl LogFormat {
    /// Parse a config/CLI format name. Unknown names fall back to human.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}

/// Install the process-wide tracing subscriber.
///
/// # Panics
///
/// The global subscriber can only be set once, so a second call in the
/// same process panics.
pub fn init_logging(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true).with_thread_ids(true))
                .init();
        }
    }
}
