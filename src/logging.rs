use std::io::IsTerminal as _;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::LogConfig;

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter, source_error={0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("cannot install global subscriber, source_error={0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over [`LogConfig::level`].
///
/// # Errors
///
/// Returns an error if:
/// - The configured level is not a valid filter directive ([`LoggingError::Filter`]).
/// - A global subscriber is already installed ([`LoggingError::Init`]).
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if config.json {
        registry.with(layer.json()).try_init()?;
    } else {
        registry
            .with(layer.with_ansi(std::io::stderr().is_terminal()))
            .try_init()?;
    }

    Ok(())
}
