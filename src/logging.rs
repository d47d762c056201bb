//! Subscriber setup for the command-line tool.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// ANSI colour in log output.
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            color: true,
        }
    }
}

/// Install a global `fmt` subscriber. `RUST_LOG` takes precedence over
/// `config.level`.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|err| LoggingError::Filter {
            directive: config.level.clone(),
            reason: err.to_string(),
        })?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(config.color).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}

/// Subscriber setup failures.
#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    /// Level directive did not parse
    #[error("invalid log level {directive:?}: {reason}")]
    Filter {
        /// Directive given
        directive: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber was already installed
    #[error("failed to initialise logging: {0}")]
    Init(String),
}
