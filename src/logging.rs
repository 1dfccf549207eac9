//! Tracing subscriber setup.
//!
//! The client crates only emit `tracing` events. Applications that do not
//! install their own subscriber can call [`init`], configured through:
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `QUARRY_LOG_LEVEL` | `trace`, `debug`, `info`, `warn`, `error`, `off` | `info` |
//! | `QUARRY_LOG_FORMAT` | `pretty`, `compact`, `json` | `compact` |
//! | `QUARRY_LOG_COLOR` | `1`/`true` or `0`/`false` | on unless `NO_COLOR` is set |
//!
//! `RUST_LOG`, when set, takes precedence over `QUARRY_LOG_LEVEL`.

use std::env;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Level variable.
pub const LEVEL_ENV: &str = "QUARRY_LOG_LEVEL";
/// Format variable.
pub const FORMAT_ENV: &str = "QUARRY_LOG_FORMAT";
/// Color variable.
pub const COLOR_ENV: &str = "QUARRY_LOG_COLOR";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// Single line.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, such as `info` or `quarry_api=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// ANSI colors. Ignored for JSON.
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            color: true,
        }
    }
}

impl LogConfig {
    /// Read the configuration from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let level = lookup(LEVEL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "info".to_string());

        let format = lookup(FORMAT_ENV)
            .and_then(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        let color = match lookup(COLOR_ENV) {
            Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
            None => lookup("NO_COLOR").is_none(),
        };

        Self {
            level,
            format,
            color,
        }
    }

    /// Build a subscriber for this configuration.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let output: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
            LogFormat::Pretty => fmt::layer().pretty().with_ansi(self.color).boxed(),
            LogFormat::Compact => fmt::layer().compact().with_ansi(self.color).boxed(),
            LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
        };

        tracing_subscriber::registry().with(output).with(filter)
    }
}

/// Install the subscriber from [`LogConfig::from_env`] as the global default.
///
/// Fails if a global subscriber is already set.
pub fn init() -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(LogConfig::from_env().subscriber())
}
