//! Structured logging for datadeps
//!
//! All logs go to stderr and use structured fields, so stdout stays free for
//! command output.
//!
//! # Log Format Conventions
//!
//! - `label`: A data label as written in the scripts (may hold the placeholder)
//! - `expanded`: The label after the run parameter was substituted
//! - `directory`: The data directory a label resolved to
//! - `file_count`: Number of files found under a directory
//! - `entry`: Archive entry name
//!
//! # Examples
//!
//! ```rust
//! use tracing::info;
//!
//! let expanded = "scores_0.50";
//! info!(expanded = %expanded, "No paths found; skipping");
//! ```

use std::{fmt as std_fmt, io};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Event formatter for terminal and CI output
///
/// Prints `<time> LEVEL(datadeps): <fields>`. Interactive runs get a short
/// wall-clock time and colored levels; CI runs get the full date and plain
/// text.
struct DatadepsFormatter {
    interactive: bool,
}

impl DatadepsFormatter {
    fn timestamp_format(&self) -> &'static str {
        if self.interactive {
            "%H:%M:%S%.3f"
        } else {
            "%Y-%m-%dT%H:%M:%S%.6f"
        }
    }
}

/// ANSI style for a level; warnings and errors are bold
fn level_style(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::ERROR => "\x1b[1;31m",
        tracing::Level::WARN => "\x1b[1;33m",
        tracing::Level::INFO => "\x1b[32m",
        tracing::Level::DEBUG => "\x1b[34m",
        tracing::Level::TRACE => "\x1b[2m",
    }
}

impl<S, N> FormatEvent<S, N> for DatadepsFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let level = *event.metadata().level();
        let now = chrono::Local::now().format(self.timestamp_format());

        if self.interactive {
            write!(
                writer,
                "\x1b[2m{}\x1b[0m {}{:5}(datadeps)\x1b[0m: ",
                now,
                level_style(level),
                level
            )?;
        } else {
            write!(writer, "{} {:5}(datadeps): ", now, level)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format (default for development)
    Pretty,
    /// Compact format (for CI)
    Compact,
    /// JSON format (for log aggregation systems)
    Json,
}

impl LogFormat {
    /// Parse from environment variable (DATADEPS_LOG_FORMAT)
    pub fn from_env() -> Self {
        Self::parse(
            &std::env::var("DATADEPS_LOG_FORMAT").unwrap_or_default(),
            std::env::var("CI").is_ok(),
        )
    }

    fn parse(value: &str, in_ci: bool) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ if in_ci => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "debug", "info", "warn")
/// - `DATADEPS_LOG_FORMAT`: Set format ("pretty", "compact", "json")
/// - `CI`: If set, defaults to compact format
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .event_format(DatadepsFormatter { interactive: true })
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .event_format(DatadepsFormatter { interactive: false })
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(false)
                        .with_writer(io::stderr)
                        .json(),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json", false), LogFormat::Json);
        assert_eq!(LogFormat::parse("COMPACT", false), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty", true), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("", true), LogFormat::Compact);
        assert_eq!(LogFormat::parse("unknown", false), LogFormat::Pretty);
    }

    #[test]
    fn test_formatter_timestamps() {
        let interactive = DatadepsFormatter { interactive: true };
        let plain = DatadepsFormatter { interactive: false };
        assert_eq!(interactive.timestamp_format(), "%H:%M:%S%.3f");
        assert!(plain.timestamp_format().starts_with("%Y-%m-%d"));
    }

    #[test]
    fn test_problems_are_bold() {
        assert!(level_style(tracing::Level::ERROR).starts_with("\x1b[1;"));
        assert!(level_style(tracing::Level::WARN).starts_with("\x1b[1;"));
        assert!(!level_style(tracing::Level::INFO).starts_with("\x1b[1;"));
    }
}
