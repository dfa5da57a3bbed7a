pub mod analysis;
pub mod cycles;
pub mod schedule;

use tracing::info;

use crate::catalog::ExerciseCatalog;
use crate::db::AppState;
use crate::error::AppError;
use crate::models::{Cycle, User};
use crate::store;

pub async fn create_user(state: &AppState, username: &str, bio: &str) -> Result<User, AppError> {
  if store::user_exists(&state.db, username).await? {
    return Err(AppError::Conflict(format!("User '{}' already exists", username)));
  }

  store::create_user(&state.db, username, bio).await?;
  info!(user = %username, "Created user");

  store::load_user(&state.db, username).await
}

pub async fn list_cycles(state: &AppState, owner: &str) -> Result<Vec<Cycle>, AppError> {
  store::load_cycles_for_owner(&state.db, owner).await
}

/// Exercise catalog as configured
pub async fn exercises(state: &AppState) -> Result<ExerciseCatalog, AppError> {
  Ok(ExerciseCatalog::load(&state.config.catalog.exercises_path).await?)
}
