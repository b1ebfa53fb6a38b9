//! Structured logging setup
//!
//! Output is controlled entirely by environment variables:
//!
//! - `LOG_LEVEL`: level name understood by `tracing` (defaults to INFO)
//! - `LOG_FORMAT`: `json`, `pretty`, or `compact` (defaults to json)
//! - `LOG_SPANS`: emit span open/close events (defaults to false)
//! - `RUST_LOG`: full filter override in env_logger syntax; when set, it
//!   replaces the level and the built-in noise directives entirely
//!
//! ```bash
//! # Production JSON logging
//! LOG_FORMAT=json LOG_LEVEL=INFO ./recordgate run
//!
//! # Development with colors
//! LOG_FORMAT=pretty LOG_LEVEL=DEBUG ./recordgate run
//! ```

use std::env;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// JSON format for structured logging (machine-readable)
    Json,
    /// Pretty format with colors and indentation (human-readable)
    Pretty,
    /// Compact format with colors but minimal spacing (terminal-friendly)
    Compact,
}

impl LogFormat {
    /// Parse log format from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json, // Default to JSON for production
        }
    }
}

/// Filter for the requested level, with HTTP-stack noise held at warn.
///
/// A `RUST_LOG` value wins outright so operators can open up any target
/// without recompiling.
fn level_filter(level: Level) -> EnvFilter {
    if let Ok(directives) = env::var("RUST_LOG") {
        return EnvFilter::new(directives);
    }

    ["hyper=warn", "warp=warn", "tokio=warn"]
        .iter()
        .fold(EnvFilter::new(level.to_string()), |filter, directive| {
            filter.add_directive(directive.parse().expect("static directive parses"))
        })
}

fn span_events(include_spans: bool) -> FmtSpan {
    if include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Initialize logging with manual configuration
pub fn init_logging(level: Level, format: LogFormat, include_spans: bool) {
    let registry = tracing_subscriber::registry().with(level_filter(level));
    let events = span_events(include_spans);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_span_events(events))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_ansi(true).with_span_events(events))
            .init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(true)
                    .with_target(false)
                    .with_span_events(events),
            )
            .init(),
    }
}

/// Initialize logging from environment variables
pub fn init_default_logging() {
    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default());

    let include_spans = env::var("LOG_SPANS")
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    init_logging(level, format, include_spans);
}

/// Create a per-request span with contextual information
#[macro_export]
macro_rules! request_span {
    ($($field:tt)*) => {
        tracing::info_span!("http_request", $($field)*)
    };
}

// Re-export macro for convenience
pub use request_span;
