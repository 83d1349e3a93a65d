//! Structured logging with JSON or pretty output.
//!
//! Logs go to stderr so compiled output on stdout stays machine-readable.

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the filter: `RUST_LOG` when set, otherwise the configured directives.
fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(config.filter_directives())
            .map_err(|e| TelemetryError::LoggingInit(e.to_string())),
    }
}

pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Standard log event names.
pub mod events {
    /// Compilation of a types module started.
    pub const COMPILE_STARTED: &str = "compile_started";

    /// Blueprint assembled and validated.
    pub const COMPILE_FINISHED: &str = "compile_finished";

    /// A schema or property was dropped instead of compiled.
    pub const SCHEMA_SKIPPED: &str = "schema_skipped";

    /// Tolerated structural oddity (e.g. unusual method count).
    pub const ADVISORY: &str = "advisory";

    /// Code and resource samples rendered.
    pub const SAMPLES_RENDERED: &str = "samples_rendered";

    /// Blueprint JSON written to disk.
    pub const OUTPUT_WRITTEN: &str = "output_written";
}

/// Helper macros for structured logging with standard fields.
///
/// Each macro tags the event with its name and forwards the remaining
/// fields and message to `tracing`.
#[macro_export]
macro_rules! log_compile_started {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::COMPILE_STARTED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_compile_finished {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::COMPILE_FINISHED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_schema_skipped {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::SCHEMA_SKIPPED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_advisory {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::ADVISORY,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_samples_rendered {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::SAMPLES_RENDERED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_output_written {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::OUTPUT_WRITTEN,
            $($field)*
        )
    };
}
