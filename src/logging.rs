//! # Structured Logging Module
//!
//! Environment-aware structured logging for hydration. Binder compilation and
//! cache population log at `debug`, individual records at `trace`.

use crate::config::{ConfigManager, LoggingConfig};
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
///
/// `RUST_LOG` takes precedence over `config.level`. An already-installed global
/// subscriber is left in place.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .boxed()
        };

        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            level = %config.level,
            json = config.json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Current environment name
pub fn get_environment() -> String {
    ConfigManager::detect_environment()
}

/// Fallback log level for an environment
pub fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for hydration operations
pub fn log_hydration_operation(
    operation: &str,
    entity: &str,
    provider: Option<&str>,
    status: &str,
    count: Option<usize>,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        entity = %entity,
        provider = provider,
        status = %status,
        count = count,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "HYDRATION_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
