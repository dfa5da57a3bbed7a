use serde::Serialize;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::models::ValidationError;
use crate::schedule::ScheduleError;

/// ---------------------------------------------------------------------------
/// Application Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Schedule(#[from] ScheduleError),

  #[error("Analysis of cycle '{cycle}' failed: {source}")]
  Analysis {
    cycle: String,
    #[source]
    source: AnalysisError,
  },

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Catalog(#[from] CatalogError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Malformed stored record: {0}")]
  Json(#[from] serde_json::Error),
}

impl AppError {
  pub fn analysis(cycle: &str, source: AnalysisError) -> Self {
    Self::Analysis {
      cycle: cycle.to_string(),
      source,
    }
  }

  /// Caller input or data problem, as opposed to an infrastructure failure
  pub fn is_client_error(&self) -> bool {
    !matches!(
      self,
      AppError::Database(_) | AppError::Migration(_) | AppError::Catalog(_) | AppError::Config(_)
    )
  }
}

impl Serialize for AppError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_errors_serialize_as_messages() {
    let err = AppError::from(ScheduleError::DutyNotFound {
      date: "2024-01-01".to_string(),
      duty: "Legs".to_string(),
    });
    let json = serde_json::to_string(&err).expect("serializes");
    assert_eq!(json, r#""Duty 'Legs' not found for 2024-01-01""#);
  }

  #[test]
  fn test_analysis_error_names_cycle() {
    let err = AppError::analysis("Split", AnalysisError::EmptyPlan);
    assert_eq!(err.to_string(), "Analysis of cycle 'Split' failed: Cycle data is empty");
    assert!(err.is_client_error());
  }
}
