//! Logging for the Blueprint compiler.
//!
//! Log lines go to stderr as JSON or pretty text. Compile stages emit named
//! events through the `log_*!` macros so collectors can key on `event`.
//!
//! ```ignore
//! use blueprint_telemetry::{LogFormat, TelemetryConfig};
//!
//! blueprint_telemetry::init(
//!     &TelemetryConfig::new()
//!         .with_log_level("info")
//!         .with_log_format(LogFormat::Pretty),
//! )?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::events;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or the filter is malformed.
    #[error("cannot install log subscriber: {0}")]
    LoggingInit(String),

    #[error("unknown log format '{0}' (expected json or pretty)")]
    UnknownLogFormat(String),
}

/// Install the global log subscriber. Call once, before compiling.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)
}
