//! Process-wide logging for the campus router.
//!
//! Every record goes to stderr. Thread names stay on so lines emitted by the
//! `campus-dispatch-N` pool workers can be told apart.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Subscriber, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use campus_config::{Config, LogFormat};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

/// Format of the subscriber that won installation.
static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format actually in effect.
    ///
    /// Only the first [`initialise`] call installs anything, so this can
    /// differ from the format a later caller asked for.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Someone else already owns the global subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// # Errors
///
/// Fails when the filter expression is invalid or another subscriber was
/// installed outside this function.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let format = INSTALLED.get_or_try_init(|| {
        let subscriber = subscriber_for(config)?;
        tracing::subscriber::set_global_default(subscriber)
            .map_err(TelemetryError::Subscriber)?;
        info!(
            target: TELEMETRY_TARGET,
            format = %config.log_format(),
            filter = config.log_filter(),
            "telemetry installed"
        );
        Ok(config.log_format())
    })?;
    Ok(TelemetryHandle { format: *format })
}

/// Builds, without installing, the subscriber `config` describes.
fn subscriber_for(config: &Config) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let stderr = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(stderr.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(stderr.compact().finish()),
    })
}
