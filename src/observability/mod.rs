//! Observability for the record validation service
//!
//! Structured logging and a process-wide metrics collector; the metrics
//! snapshot is served over HTTP by the server module.

pub mod logging;
pub mod metrics;

// Re-export for convenience
pub use logging::{init_default_logging, init_logging, LogFormat};
pub use metrics::{metrics, MetricsCollector, MetricsSnapshot};

// Span macro for structured logging
pub use logging::request_span;
