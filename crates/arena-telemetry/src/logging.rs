//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,arena_field=debug,arena_dashboard=debug";

/// Pick the active filter: `RUST_LOG` wins over the configured directives.
///
/// An unset or empty `RUST_LOG` falls through to `configured`. Configured
/// directives are validated; a typo in the config file is an error rather
/// than silently logging nothing.
pub fn resolve_filter(rust_log: Option<&str>, configured: &str) -> TelemetryResult<EnvFilter> {
    if let Some(env) = rust_log.filter(|v| !v.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(env) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(configured)
        .map_err(|e| TelemetryError::InvalidFilter(format!("{configured:?}: {e}")))
}

/// Initialize structured logging.
///
/// JSON output when `RUST_ENV=production`, pretty output otherwise.
/// Fails if a global subscriber is already installed.
pub fn init_logging(configured_filter: &str) -> TelemetryResult<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = resolve_filter(rust_log.as_deref(), configured_filter)?;
    let active = env_filter.to_string();

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    debug!(filter = %active, production = is_production, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_used_without_env() {
        let filter = resolve_filter(None, "warn,arena_dashboard=trace").unwrap();
        let text = filter.to_string();
        assert!(text.contains("arena_dashboard=trace"));
        assert!(text.contains("warn"));
    }

    #[test]
    fn test_env_overrides_configured_filter() {
        let filter = resolve_filter(Some("arena_notify=trace"), DEFAULT_LOG_FILTER).unwrap();
        assert!(filter.to_string().contains("arena_notify=trace"));
        assert!(!filter.to_string().contains("arena_field"));
    }

    #[test]
    fn test_blank_env_falls_through() {
        let filter = resolve_filter(Some("  "), "error").unwrap();
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn test_invalid_configured_filter_rejected() {
        let err = resolve_filter(None, "arena_field=loud").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter(_)));
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(resolve_filter(None, DEFAULT_LOG_FILTER).is_ok());
    }
}
