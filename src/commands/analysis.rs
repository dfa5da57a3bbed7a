use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::analysis::{LoadReport, MuscleLoadAnalyzer, MuscleStatus, Recommendation};
use crate::catalog::{ExerciseCatalog, MuscleCatalog};
use crate::config::CatalogConfig;
use crate::db::AppState;
use crate::error::AppError;
use crate::models::Cycle;
use crate::store;

/// ---------------------------------------------------------------------------
/// Response Types
/// ---------------------------------------------------------------------------

/// Full analytics for one of the caller's own cycles
#[derive(Debug, Clone, Serialize)]
pub struct CycleAnalytics {
  pub cycle_name: String,
  #[serde(flatten)]
  pub report: LoadReport,
}

/// Analytics shown for someone else's published cycle
#[derive(Debug, Clone, Serialize)]
pub struct PublicLoadReport {
  pub cycle_name: String,
  pub days_count: usize,
  pub load_status: BTreeMap<String, MuscleStatus>,
  pub recommendations: Vec<Recommendation>,
}

impl PublicLoadReport {
  fn from_report(cycle_name: String, report: LoadReport) -> Self {
    Self {
      cycle_name,
      days_count: report.days_count,
      load_status: report.load_status,
      recommendations: report.recommendations,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Commands
/// ---------------------------------------------------------------------------

/// Load the exercise catalog and the configured (or built-in) muscle table
pub async fn load_catalogs(
  config: &CatalogConfig,
) -> Result<(ExerciseCatalog, MuscleCatalog), AppError> {
  let exercises = ExerciseCatalog::load(&config.exercises_path).await?;
  let muscles = match &config.muscles_path {
    Some(path) => MuscleCatalog::load(path).await?,
    None => MuscleCatalog::builtin(),
  };
  Ok((exercises, muscles))
}

async fn run_analysis(state: &AppState, cycle: &Cycle) -> Result<LoadReport, AppError> {
  let (exercises, muscles) = load_catalogs(&state.config.catalog).await?;
  let report = MuscleLoadAnalyzer::new(&exercises, &muscles)
    .analyze(&cycle.plan)
    .map_err(|e| AppError::analysis(&cycle.name, e))?;

  debug!(
    cycle = %cycle.name,
    days = report.days_count,
    skipped = report.skipped.len(),
    "Analyzed cycle"
  );
  Ok(report)
}

pub async fn analyze_cycle(state: &AppState, owner: &str, name: &str) -> Result<CycleAnalytics, AppError> {
  let cycle = store::load_cycle(&state.db, owner, name)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cycle '{}' not found.", name)))?;

  let report = run_analysis(state, &cycle).await?;
  Ok(CycleAnalytics {
    cycle_name: cycle.name,
    report,
  })
}

/// Reduced analytics for another user's published cycle
pub async fn analyze_public_cycle(
  state: &AppState,
  target_owner: &str,
  name: &str,
) -> Result<PublicLoadReport, AppError> {
  let cycle = store::load_public_cycle(&state.db, target_owner, name)
    .await?
    .ok_or_else(|| {
      AppError::NotFound(format!(
        "Public cycle '{}' not found for user '{}'.",
        name, target_owner
      ))
    })?;

  let report = run_analysis(state, &cycle).await?;
  Ok(PublicLoadReport::from_report(cycle.name, report))
}
