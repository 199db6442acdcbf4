//! Prometheus metrics and structured logging for the arena field monitor.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus metrics for viewer sessions, notification buses and mode requests

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, resolve_filter, DEFAULT_LOG_FILTER};
pub use metrics::Metrics;
