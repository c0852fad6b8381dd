//! Tracing/logging initialization.
//!
//! Filtering follows `RUST_LOG` (default `info`). Output is JSON lines unless
//! `ATELIER_LOG_FORMAT=pretty` asks for human-readable output.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_ENV: &str = "ATELIER_LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown log format `{0}` (expected `json` or `pretty`)")]
pub struct LogFormatError(String);

impl FromStr for LogFormat {
    type Err = LogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(LogFormatError(other.to_string())),
        }
    }
}

/// Subscriber settings resolved before installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `info,atelier_infra=debug`.
    pub filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TracingConfig {
    /// Read `ATELIER_LOG_FORMAT` and `RUST_LOG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`; unknown formats fall back to JSON.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let format = lookup(LOG_FORMAT_ENV)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let filter = lookup(EnvFilter::DEFAULT_ENV)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        Self { format, filter }
    }

    /// Install the global subscriber. Returns `false` if one was already set.
    pub fn install(&self) -> bool {
        let filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(tracing_subscriber::fmt::time::SystemTime);

        match self.format {
            LogFormat::Json => builder.json().with_target(false).try_init().is_ok(),
            LogFormat::Pretty => builder.pretty().try_init().is_ok(),
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    TracingConfig::from_env().install();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_json_at_info() {
        assert_eq!(TracingConfig::from_lookup(lookup(&[])), TracingConfig::default());
    }

    #[test]
    fn reads_format_and_filter() {
        let config = TracingConfig::from_lookup(lookup(&[
            ("ATELIER_LOG_FORMAT", "Pretty"),
            ("RUST_LOG", "atelier_infra=debug"),
        ]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.filter, "atelier_infra=debug");
    }

    #[test]
    fn unknown_format_is_rejected_by_parse_but_tolerated_by_config() {
        assert_eq!(
            "xml".parse::<LogFormat>(),
            Err(LogFormatError("xml".to_string()))
        );
        let config = TracingConfig::from_lookup(lookup(&[("ATELIER_LOG_FORMAT", "xml")]));
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn init_is_idempotent() {
        init();
        assert!(!TracingConfig::default().install());
    }
}
