//! Test utilities and helpers for unit and database-backed testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Application state wired to an in-memory pool
//! - Cycle and catalog fixtures
//! - Helper assertions

use std::path::PathBuf;

use sqlx::SqlitePool;

use crate::catalog::{ExerciseCatalog, ExerciseEntry, MuscleCatalog, MuscleGroup};
use crate::config::{AppConfig, CatalogConfig, DatabaseConfig};
use crate::db::AppState;
use crate::logging::LoggingConfig;
use crate::models::{Cycle, NewCycle, WorkoutPlan};
use crate::store;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Config pointing at the in-memory database and the bundled exercise catalog
pub fn test_config() -> AppConfig {
  AppConfig {
    database: DatabaseConfig {
      url: "sqlite::memory:".to_string(),
      max_connections: 1,
    },
    catalog: CatalogConfig {
      exercises_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("db/exercises.json"),
      muscles_path: None,
    },
    logging: LoggingConfig::default(),
  }
}

pub async fn setup_test_state() -> AppState {
  AppState::new(setup_test_db().await, test_config())
}

pub async fn seed_test_user(pool: &SqlitePool, username: &str) -> i64 {
  store::create_user(pool, username, "")
    .await
    .expect("Failed to seed user")
}

/// Insert a cycle starting 2024-01-01 with no pause
/// Returns the new cycle id
pub async fn seed_test_cycle(pool: &SqlitePool, owner: &str, name: &str, descriptions: &[&str]) -> i64 {
  store::insert_cycle(pool, &mock_new_cycle(owner, name, descriptions), None)
    .await
    .expect("Failed to seed cycle")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_new_cycle(owner: &str, name: &str, descriptions: &[&str]) -> NewCycle {
  NewCycle {
    name: name.to_string(),
    owner: owner.to_string(),
    days_count: descriptions.len() as i64,
    pause_count: 0,
    descriptions: descriptions.iter().map(|d| d.to_string()).collect(),
    plan: WorkoutPlan::new(),
    start_at: "2024-01-01".to_string(),
  }
}

/// Stored cycle owned by "tester"
pub fn mock_cycle(name: &str, days_count: i64, pause: i64, start_at: &str, descriptions: &[&str]) -> Cycle {
  Cycle {
    id: 1,
    name: name.to_string(),
    owner: "tester".to_string(),
    days_count,
    pause_count: pause,
    descriptions: descriptions.iter().map(|d| d.to_string()).collect(),
    plan: WorkoutPlan::new(),
    start_at: start_at.to_string(),
    is_public: false,
    original_author: None,
    created_at: None,
  }
}

fn exercise(name: &str, muscles: &[(&str, f64)]) -> Option<ExerciseEntry> {
  Some(ExerciseEntry {
    id: 0,
    name: name.to_string(),
    muscles: muscles.iter().map(|(m, c)| (m.to_string(), *c)).collect(),
  })
}

/// Five slots: 0 Bench, 1 Squat, 2 Neck Curl (uncatalogued muscle), 3 empty, 4 Row
pub fn mock_exercise_catalog() -> ExerciseCatalog {
  ExerciseCatalog::new(vec![
    exercise("Bench", &[("chest", 1.0)]),
    exercise("Squat", &[("quads", 1.0), ("glutes", 0.5)]),
    exercise("Neck Curl", &[("neck", 0.5)]),
    None,
    exercise("Row", &[("back", 1.0), ("biceps", 0.5)]),
  ])
}

pub fn mock_muscle_catalog() -> MuscleCatalog {
  MuscleCatalog::new([
    MuscleGroup::new("chest", "Chest", 10.0),
    MuscleGroup::new("quads", "Quads", 10.0),
    MuscleGroup::new("glutes", "Glutes", 10.0),
    MuscleGroup::new("back", "Back", 10.0),
    MuscleGroup::new("biceps", "Biceps", 10.0),
  ])
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::ExerciseLookup;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('users', 'cycles')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_cycle_is_loadable() {
    let pool = setup_test_db().await;

    let id = seed_test_cycle(&pool, "anna", "Split", &["Legs", "Push"]).await;
    let cycle = store::load_cycle_by_id(&pool, id)
      .await
      .expect("Should query")
      .expect("Seeded cycle exists");

    assert_eq!(cycle.days_count, 2);
    assert_eq!(cycle.owner, "anna");

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_catalogs_line_up() {
    let exercises = mock_exercise_catalog();
    assert_eq!(exercises.len(), 5);
    assert!(matches!(exercises.lookup(3), ExerciseLookup::EmptySlot));
    assert!(matches!(exercises.lookup(4), ExerciseLookup::Found(e) if e.name == "Row"));

    let muscles = mock_muscle_catalog();
    assert!(muscles.get("neck").is_none());
    assert_eq!(muscles.optimal_weekly("chest"), 10.0);
  }

  #[test]
  fn test_config_points_at_bundled_catalog() {
    assert!(test_config().catalog.exercises_path.exists());
  }
}
