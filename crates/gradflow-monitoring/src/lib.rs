//! Logging bootstrap for the gradflow services.

#![forbid(unsafe_code)]

pub mod logging;
pub use logging::init_logging;

use serde::{Deserialize, Serialize};

/// Configuration for initializing logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Service name attached to startup log lines
    pub service_name: String,

    /// Log level filter (e.g., "info,gradflow=debug"), overridable via
    /// the standard RUST_LOG environment variable
    pub log_filter: String,

    /// Emit JSON-formatted logs for aggregation instead of
    /// human-readable output
    pub enable_json_logging: bool,

    /// Environment (dev, staging, prod)
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "gradflow".to_string(),
            log_filter: "info".to_string(),
            enable_json_logging: false,
            environment: "dev".to_string(),
        }
    }
}
