//! Logging configuration for the compiler and its CLI.

use std::fmt;
use std::str::FromStr;

use crate::TelemetryError;

/// Crates whose events follow the configured level. Everything else stays at `warn`.
const WORKSPACE_TARGETS: &[&str] = &[
    "blueprint",
    "blueprint_compiler",
    "blueprint_spec_parser",
    "blueprint_telemetry",
];

/// Where log lines are rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for CI and log collectors.
    #[default]
    Json,
    /// Multi-line human output.
    Pretty,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Json, LogFormat::Pretty]
            .into_iter()
            .find(|format| s.trim().eq_ignore_ascii_case(format.as_str()))
            .ok_or_else(|| TelemetryError::UnknownLogFormat(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level for workspace crates. `RUST_LOG` replaces the whole filter when set.
    pub log_level: String,
    pub log_format: LogFormat,
    /// Colorize pretty output.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::default(),
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// `EnvFilter` directives: dependencies at `warn`, workspace crates at `log_level`.
    ///
    /// A level that already contains directives (`=` or `,`) is used verbatim.
    pub fn filter_directives(&self) -> String {
        let level = self.log_level.trim();
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }
        let mut directives = vec!["warn".to_string()];
        directives.extend(
            WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level)),
        );
        directives.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn plain_level_scopes_to_workspace_crates() {
        let directives = TelemetryConfig::new().with_log_level("debug").filter_directives();
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("blueprint_compiler=debug"));
        assert!(directives.contains("blueprint=debug"));
    }

    #[test]
    fn explicit_directives_pass_through() {
        let config = TelemetryConfig::new().with_log_level("blueprint_compiler=trace");
        assert_eq!(config.filter_directives(), "blueprint_compiler=trace");
    }
}
