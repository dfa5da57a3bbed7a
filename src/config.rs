use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::logging::{LogFormat, LoggingConfig};

/// ---------------------------------------------------------------------------
/// Configuration Defaults
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://regime.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_EXERCISES_PATH: &str = "db/exercises.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
  pub url: String,
  pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
  pub exercises_path: PathBuf,
  /// Falls back to the built-in muscle table when unset
  pub muscles_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  pub database: DatabaseConfig,
  pub catalog: CatalogConfig,
  pub logging: LoggingConfig,
}

fn var_or(key: &str, default: &str) -> String {
  env::var(key).unwrap_or_else(|_| default.to_string())
}

fn invalid(key: &str, value: &str) -> ConfigError {
  ConfigError::Invalid {
    key: key.to_string(),
    value: value.to_string(),
  }
}

impl AppConfig {
  /// Read configuration from REGIME_* environment variables
  pub fn from_env() -> Result<Self, ConfigError> {
    let max_connections = match env::var("REGIME_MAX_CONNECTIONS") {
      Ok(raw) => match raw.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return Err(invalid("REGIME_MAX_CONNECTIONS", &raw)),
      },
      Err(_) => DEFAULT_MAX_CONNECTIONS,
    };

    let format = match env::var("REGIME_LOG_FORMAT") {
      Ok(raw) => raw
        .parse::<LogFormat>()
        .map_err(|_| invalid("REGIME_LOG_FORMAT", &raw))?,
      Err(_) => LogFormat::default(),
    };

    Ok(Self {
      database: DatabaseConfig {
        url: var_or("REGIME_DATABASE_URL", DEFAULT_DATABASE_URL),
        max_connections,
      },
      catalog: CatalogConfig {
        exercises_path: PathBuf::from(var_or("REGIME_EXERCISES_PATH", DEFAULT_EXERCISES_PATH)),
        muscles_path: env::var("REGIME_MUSCLES_PATH").ok().map(PathBuf::from),
      },
      logging: LoggingConfig {
        level: var_or("REGIME_LOG_LEVEL", "info"),
        format,
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 6] = [
    "REGIME_DATABASE_URL",
    "REGIME_MAX_CONNECTIONS",
    "REGIME_EXERCISES_PATH",
    "REGIME_MUSCLES_PATH",
    "REGIME_LOG_LEVEL",
    "REGIME_LOG_FORMAT",
  ];

  fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
    VARS.iter().map(|k| (*k, None)).collect()
  }

  #[test]
  #[serial]
  fn test_defaults_when_unset() {
    temp_env::with_vars(unset_all(), || {
      let config = AppConfig::from_env().expect("defaults are valid");
      assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
      assert_eq!(config.database.max_connections, 5);
      assert_eq!(config.catalog.exercises_path, PathBuf::from("db/exercises.json"));
      assert_eq!(config.catalog.muscles_path, None);
      assert_eq!(config.logging, LoggingConfig::default());
    });
  }

  #[test]
  #[serial]
  fn test_values_read_from_env() {
    let mut vars = unset_all();
    vars.extend([
      ("REGIME_DATABASE_URL", Some("sqlite::memory:")),
      ("REGIME_MAX_CONNECTIONS", Some("2")),
      ("REGIME_MUSCLES_PATH", Some("/etc/regime/muscles.json")),
      ("REGIME_LOG_FORMAT", Some("json")),
      ("REGIME_LOG_LEVEL", Some("debug")),
    ]);

    temp_env::with_vars(vars, || {
      let config = AppConfig::from_env().expect("valid config");
      assert_eq!(config.database.url, "sqlite::memory:");
      assert_eq!(config.database.max_connections, 2);
      assert_eq!(
        config.catalog.muscles_path,
        Some(PathBuf::from("/etc/regime/muscles.json"))
      );
      assert_eq!(config.logging.format, LogFormat::Json);
      assert_eq!(config.logging.level, "debug");
    });
  }

  #[test]
  #[serial]
  fn test_invalid_pool_size_rejected() {
    temp_env::with_var("REGIME_MAX_CONNECTIONS", Some("zero"), || {
      let err = AppConfig::from_env().unwrap_err();
      assert_eq!(err, invalid("REGIME_MAX_CONNECTIONS", "zero"));
    });
    temp_env::with_var("REGIME_MAX_CONNECTIONS", Some("0"), || {
      assert!(AppConfig::from_env().is_err());
    });
  }

  #[test]
  #[serial]
  fn test_unknown_log_format_rejected() {
    temp_env::with_vars(
      [("REGIME_LOG_FORMAT", Some("xml")), ("REGIME_MAX_CONNECTIONS", None)],
      || {
        assert!(matches!(
          AppConfig::from_env(),
          Err(ConfigError::Invalid { ref key, .. }) if key == "REGIME_LOG_FORMAT"
        ));
      },
    );
  }
}
