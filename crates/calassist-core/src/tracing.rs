//! Logging setup for the command-line client.
//!
//! Log lines go to stderr so stdout only carries command output. Unless an
//! explicit filter is configured, `RUST_LOG` wins over the configured level,
//! which applies to every `calassist*` target.
//!
//! ```ignore
//! use calassist_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::cli_debug())?;
//! ```

use std::io;

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{prelude::*, EnvFilter, Layer};

/// Target prefix shared by every crate of the workspace.
const TARGET_PREFIX: &str = "calassist";

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] TryInitError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl TracingOutputFormat {
    /// Parses `pretty`, `compact` or `json`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// How log output is filtered and laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for `calassist*` targets when no filter applies.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Show file and line of each event.
    pub show_source_location: bool,
    /// Show the module path of each event.
    pub show_target: bool,
    pub show_timestamps: bool,
    /// Log span creation and close.
    pub log_spans: bool,
    /// Filter directive that replaces both `RUST_LOG` and `level`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    /// Warnings only, compact, no timestamps.
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            show_source_location: false,
            show_target: false,
            show_timestamps: false,
            log_spans: false,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Used by `--debug`: debug level with source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            show_source_location: true,
            show_target: true,
            ..Self::default()
        }
    }

    /// JSON lines with timestamps and span events, for scripted runs.
    #[must_use]
    pub fn structured() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Json,
            show_source_location: true,
            show_target: true,
            show_timestamps: true,
            log_spans: true,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    #[must_use]
    pub fn with_format(self, format: TracingOutputFormat) -> Self {
        Self { format, ..self }
    }

    #[must_use]
    pub fn with_filter(self, filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..self
        }
    }

    /// The directive used when neither `filter` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        format!("{}={}", TARGET_PREFIX, self.level)
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.filter {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let spans = if self.log_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.show_source_location)
            .with_line_number(self.show_source_location)
            .with_target(self.show_target)
            .with_span_events(spans);

        match (self.format, self.show_timestamps) {
            (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
            (TracingOutputFormat::Json, _) => layer.json().boxed(),
            (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
            (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
        }
    }
}

/// Installs the global subscriber.
///
/// Fails if a subscriber is already installed or `filter` does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(config.fmt_layer())
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_by_default() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, TracingOutputFormat::Compact);
        assert!(!config.show_timestamps);
        assert_eq!(config.default_directive(), "calassist=WARN");
    }

    #[test]
    fn debug_preset() {
        let config = TracingConfig::cli_debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.show_source_location);
        assert!(!config.log_spans);
        assert_eq!(config.default_directive(), "calassist=DEBUG");
    }

    #[test]
    fn structured_preset() {
        let config = TracingConfig::structured();
        assert_eq!(config.format, TracingOutputFormat::Json);
        assert!(config.log_spans);
        assert!(config.show_timestamps);
    }

    #[test]
    fn builders() {
        let config = TracingConfig::default()
            .with_level(Level::TRACE)
            .with_format(TracingOutputFormat::Pretty)
            .with_filter("calassist_core::reconcile=trace");

        assert_eq!(config.level, Level::TRACE);
        assert_eq!(config.format, TracingOutputFormat::Pretty);
        assert_eq!(config.filter.as_deref(), Some("calassist_core::reconcile=trace"));
    }

    #[test]
    fn bad_filter_is_rejected() {
        let config = TracingConfig::default().with_filter("calassist=loud");
        assert!(matches!(config.env_filter(), Err(TracingError::Filter(_))));
    }

    #[test]
    fn parse_format() {
        assert_eq!(TracingOutputFormat::parse("JSON"), Some(TracingOutputFormat::Json));
        assert_eq!(TracingOutputFormat::parse(" pretty "), Some(TracingOutputFormat::Pretty));
        assert_eq!(TracingOutputFormat::parse("xml"), None);
    }
}
