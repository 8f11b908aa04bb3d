// Logging module - Logging infrastructure
use crate::domain::error::{HelperError, HelperResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
pub fn default_filter(log_level: &str) -> String {
    format!("ansible_helper={}", log_level)
}

/// Initialize logging system
pub fn init_logging(log_level: &str) -> HelperResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(log_level)))
        .map_err(|e| HelperError::Config {
            message: format!("Invalid log level '{}': {}", log_level, e),
        })?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| HelperError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("Logging initialized");
    Ok(())
}
