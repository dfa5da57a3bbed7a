//! Structured logging setup

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  Pretty,
  #[default]
  Compact,
  Json,
}

impl FromStr for LogFormat {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "pretty" => Ok(Self::Pretty),
      "compact" => Ok(Self::Compact),
      "json" => Ok(Self::Json),
      _ => Err(format!("Unknown log format: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
  /// Default filter when RUST_LOG is not set
  pub level: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      format: LogFormat::default(),
    }
  }
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init(config: &LoggingConfig) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
  let builder = tracing_subscriber::fmt().with_env_filter(filter);

  let installed = match config.format {
    LogFormat::Pretty => builder.pretty().try_init(),
    LogFormat::Compact => builder.compact().try_init(),
    LogFormat::Json => builder.json().try_init(),
  };

  if installed.is_ok() {
    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_log_format_parsing() {
    assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
    assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
    assert!("xml".parse::<LogFormat>().is_err());
  }

  #[test]
  fn test_init_twice_is_harmless() {
    let config = LoggingConfig::default();
    init(&config);
    init(&config);
  }
}
