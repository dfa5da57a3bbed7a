//! Deterministic muscle-load analysis for training cycles
//!
//! This module turns a cycle's workout plan into per-muscle load figures,
//! compares them against weekly targets and ranks what to change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{ExerciseCatalog, ExerciseLookup, MuscleCatalog};
use crate::models::WorkoutPlan;

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

pub const DAYS_PER_WEEK: f64 = 7.0;
pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
  #[error("Cycle data is empty")]
  EmptyPlan,
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
  let factor = 10f64.powi(decimals);
  (value * factor).round() / factor
}

/// Load as a percentage of the weekly target (0 when the target is not positive)
pub fn percent_of_optimal(total_load: f64, optimal_weekly: f64) -> f64 {
  if optimal_weekly > 0.0 {
    round_to(total_load / optimal_weekly * 100.0, 1)
  } else {
    0.0
  }
}

/// ---------------------------------------------------------------------------
/// Classification
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
  Overloaded,
  Optimal,
  Moderate,
  Underloaded,
  Untrained,
}

/// Lower bounds (exclusive), highest first
const STATUS_BANDS: [(f64, LoadStatus); 5] = [
  (130.0, LoadStatus::Overloaded),
  (80.0, LoadStatus::Optimal),
  (40.0, LoadStatus::Moderate),
  (10.0, LoadStatus::Underloaded),
  (0.0, LoadStatus::Untrained),
];

impl LoadStatus {
  /// First band the percentage exceeds; `None` for 0% (and below)
  pub fn classify(percent: f64) -> Option<Self> {
    STATUS_BANDS
      .iter()
      .find(|(threshold, _)| percent > *threshold)
      .map(|(_, status)| *status)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      LoadStatus::Overloaded => "overloaded",
      LoadStatus::Optimal => "optimal",
      LoadStatus::Moderate => "moderate",
      LoadStatus::Underloaded => "underloaded",
      LoadStatus::Untrained => "untrained",
    }
  }

  pub fn color(&self) -> &'static str {
    match self {
      LoadStatus::Overloaded => "#ff4444",
      LoadStatus::Optimal => "#44ff44",
      LoadStatus::Moderate => "#ffa500",
      LoadStatus::Underloaded => "#ffff00",
      LoadStatus::Untrained => "#cccccc",
    }
  }

  pub fn priority(&self) -> Priority {
    match self {
      LoadStatus::Overloaded => Priority::High,
      LoadStatus::Optimal => Priority::Low,
      LoadStatus::Moderate => Priority::Medium,
      LoadStatus::Underloaded => Priority::High,
      LoadStatus::Untrained => Priority::High,
    }
  }

  pub fn message(&self, percent: f64) -> String {
    match self {
      LoadStatus::Overloaded => format!("Overloaded ({:.1}%). Reduce the load.", percent),
      LoadStatus::Optimal => format!("Optimal ({:.1}%).", percent),
      LoadStatus::Moderate => format!("Moderate load ({:.1}%). Can be increased.", percent),
      LoadStatus::Underloaded => format!("Underloaded ({:.1}%). Add exercises.", percent),
      LoadStatus::Untrained => format!("Not trained ({:.1}%).", percent),
    }
  }
}

/// Ordered so that sorting puts `High` first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
  High,
  Medium,
  Low,
}

/// ---------------------------------------------------------------------------
/// Report Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleStatus {
  pub status: LoadStatus,
  pub color: String,
  #[serde(rename = "pr")]
  pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
  pub message: String,
  pub priority: Priority,
  /// Display name of the muscle
  pub muscle: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  /// Entry carries no exercise id
  MissingId,
  UnknownExercise,
  EmptyCatalogSlot,
}

/// A plan entry left out of the totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
  pub day: String,
  pub exercise_id: Option<i64>,
  pub reason: SkipReason,
}

pub type MuscleLoads = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
  /// Day buckets present in the plan
  pub days_count: usize,
  pub daily_analytics: BTreeMap<String, MuscleLoads>,
  pub total_analytics: MuscleLoads,
  pub average_daily: MuscleLoads,
  pub optimal_percentages: MuscleLoads,
  /// Only muscles with a non-zero percentage appear here
  pub load_status: BTreeMap<String, MuscleStatus>,
  pub recommendations: Vec<Recommendation>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skipped: Vec<SkippedEntry>,
}

/// ---------------------------------------------------------------------------
/// Analyzer
/// ---------------------------------------------------------------------------

fn skip_entry(day: &str, exercise_id: Option<i64>, reason: SkipReason) -> SkippedEntry {
  debug!(day = %day, ?exercise_id, ?reason, "Skipping plan entry");
  SkippedEntry {
    day: day.to_string(),
    exercise_id,
    reason,
  }
}

pub struct MuscleLoadAnalyzer<'a> {
  exercises: &'a ExerciseCatalog,
  muscles: &'a MuscleCatalog,
}

impl<'a> MuscleLoadAnalyzer<'a> {
  pub fn new(exercises: &'a ExerciseCatalog, muscles: &'a MuscleCatalog) -> Self {
    Self { exercises, muscles }
  }

  fn zeroed(&self) -> MuscleLoads {
    self.muscles.ids().map(|id| (id.clone(), 0.0)).collect()
  }

  /// Analyze a full workout plan
  pub fn analyze(&self, plan: &WorkoutPlan) -> Result<LoadReport, AnalysisError> {
    if plan.is_empty() {
      return Err(AnalysisError::EmptyPlan);
    }

    // Normalize against the day buckets actually present, not the cycle length
    let days_count = plan.day_count();
    let weekly_scale = DAYS_PER_WEEK / days_count as f64;

    let mut daily_analytics = BTreeMap::new();
    let mut total_analytics = self.zeroed();
    let mut skipped = Vec::new();

    for (day, entries) in plan.days() {
      let mut day_load = self.zeroed();

      for entry in entries {
        let Some(id) = entry.id else {
          skipped.push(skip_entry(day, None, SkipReason::MissingId));
          continue;
        };

        let exercise = match self.exercises.lookup(id) {
          ExerciseLookup::Found(exercise) => exercise,
          ExerciseLookup::UnknownId => {
            skipped.push(skip_entry(day, entry.id, SkipReason::UnknownExercise));
            continue;
          }
          ExerciseLookup::EmptySlot => {
            skipped.push(skip_entry(day, entry.id, SkipReason::EmptyCatalogSlot));
            continue;
          }
        };

        for (muscle, coefficient) in &exercise.muscles {
          let load = round_to(f64::from(entry.sets) * coefficient * weekly_scale, 2);
          *day_load.entry(muscle.clone()).or_insert(0.0) += load;
          *total_analytics.entry(muscle.clone()).or_insert(0.0) += load;
        }
      }

      daily_analytics.insert(day.clone(), day_load);
    }

    // Daily sums are scaled by the weekly factor again (compounds the per-entry scale)
    let average_daily: MuscleLoads = total_analytics
      .keys()
      .map(|muscle| {
        let sum: f64 = daily_analytics
          .values()
          .map(|loads: &MuscleLoads| loads.get(muscle).copied().unwrap_or(0.0))
          .sum();
        (muscle.clone(), round_to(sum * weekly_scale, 2))
      })
      .collect();

    let optimal_percentages: MuscleLoads = total_analytics
      .iter()
      .map(|(muscle, load)| {
        let percent = percent_of_optimal(*load, self.muscles.optimal_weekly(muscle));
        (muscle.clone(), percent)
      })
      .collect();

    let load_status: BTreeMap<String, MuscleStatus> = optimal_percentages
      .iter()
      .filter_map(|(muscle, percent)| {
        LoadStatus::classify(*percent).map(|status| {
          let entry = MuscleStatus {
            status,
            color: status.color().to_string(),
            percent: *percent,
          };
          (muscle.clone(), entry)
        })
      })
      .collect();

    let recommendations = self.recommend(&load_status);

    Ok(LoadReport {
      days_count,
      daily_analytics,
      total_analytics,
      average_daily,
      optimal_percentages,
      load_status,
      recommendations,
      skipped,
    })
  }

  /// Catalog muscles in declaration order, then uncatalogued ones by id
  fn muscle_order<'m, V: 'm>(
    &'m self,
    measured: &'m BTreeMap<String, V>,
  ) -> impl Iterator<Item = &'m String> + 'm {
    let muscles: &'m MuscleCatalog = self.muscles;
    muscles
      .ids()
      .chain(measured.keys().filter(move |id| muscles.get(id).is_none()))
  }

  /// Highest-priority messages first, at most five
  fn recommend(&self, load_status: &BTreeMap<String, MuscleStatus>) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = self
      .muscle_order(load_status)
      .filter_map(|muscle| load_status.get(muscle).map(|entry| (muscle, entry)))
      .map(|(muscle, entry)| {
        let name = self.muscles.display_name(muscle);
        Recommendation {
          message: format!("{}: {}", name, entry.status.message(entry.percent)),
          priority: entry.status.priority(),
          muscle: name.to_string(),
        }
      })
      .collect();

    // sort_by_key is stable: ties keep catalog order
    recommendations.sort_by_key(|r| r.priority);
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
