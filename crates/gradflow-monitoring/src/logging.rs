//! Structured logging module using tracing.
//!
//! Provides the subscriber setup shared by every gradflow deployment:
//! env-filtered, with JSON formatting for log aggregation when enabled.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::LoggingConfig;

/// Initialize structured logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    // RUST_LOG wins over the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.enable_json_logging {
        // JSON logs for production
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true);

        registry
            .with(json_layer)
            .try_init()
            .context("Failed to set global default subscriber")?;
    } else {
        // Pretty logs for development
        let fmt_layer = fmt::layer().pretty().with_target(true);

        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to set global default subscriber")?;
    }

    info!(
        service_name = %config.service_name,
        environment = %config.environment,
        "logging initialized"
    );

    Ok(())
}
