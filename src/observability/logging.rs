//! # Structured Logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` taken from
//! `RUST_LOG` (falling back to the configured level) and a JSON or
//! human-readable `fmt` layer.

use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::core::config::{LogFormat, ObservabilityConfig};
use crate::core::error::{ProxyError, ProxyResult};

/// Build the filter: `RUST_LOG` wins over the configured default.
pub fn build_filter(default_directive: &str) -> ProxyResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| ProxyError::config(format!("Invalid log level '{}': {}", default_directive, e))),
    }
}

/// Initialize the tracing subscriber. A second call is a no-op.
pub fn init_tracing(config: &ObservabilityConfig) -> ProxyResult<()> {
    let env_filter = build_filter(&config.log_level)?;

    let installed = match config.log_format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Pretty => Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    if installed.is_err() {
        warn!("Tracing subscriber already initialized, skipping initialization");
        return Ok(());
    }

    info!(format = ?config.log_format, "Structured logging initialized");
    Ok(())
}
