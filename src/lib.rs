pub mod analysis;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod schedule;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use db::AppState;
pub use error::AppError;

use config::AppConfig;
use tracing::info;

/// Load `.env`, install logging and open the database
pub async fn init() -> Result<AppState, AppError> {
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  logging::init(&config.logging);

  let pool = db::initialize_db(&config.database).await?;
  info!(exercises = %config.catalog.exercises_path.display(), "Regime maker ready");

  Ok(AppState::new(pool, config))
}
