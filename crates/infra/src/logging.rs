//! Tracing subscriber setup
//!
//! Logs go to stderr so criterion's report on stdout stays readable. The
//! `RUST_LOG` environment variable takes precedence over the configured
//! level.

use meterbench_domain::{LoggingConfig, MeterBenchError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// Calling this more than once is harmless: if a global subscriber is
/// already installed the call returns `Ok(())` and leaves it in place.
///
/// # Errors
/// Returns `MeterBenchError::Config` if `config.level` is not a valid filter
/// directive and `RUST_LOG` is unset.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            MeterBenchError::Config(format!("Invalid log level '{}': {e}", config.level))
        })?,
    };

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already installed");
    }
    Ok(())
}
