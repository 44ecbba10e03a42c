//! Logging setup for the input pipeline, built on `tracing`.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::InputError;

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Meant for tests and early start-up. An already installed global subscriber is left alone.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Installs the pipeline's subscriber at the configured level.
///
/// `RUST_LOG` takes precedence over `config.level`. An invalid level is an
/// error; an already installed global subscriber is not.
pub fn init_logging(config: &LoggingConfig) -> Result<(), InputError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            InputError::LoggingInit(format!("invalid log level '{}': {}", config.level, e))
        })?,
    };

    if fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging: global subscriber already installed, keeping it.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_initialization_is_harmless() {
        init_minimal_logging();
        init_minimal_logging();
        assert!(init_logging(&LoggingConfig::default()).is_ok());
    }
}
