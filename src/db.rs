use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::info;

use crate::config::{AppConfig, DatabaseConfig};
use crate::error::AppError;

pub type DbPool = SqlitePool;

/// Per-user guards serializing duty-state read-modify-write cycles
#[derive(Debug, Default)]
pub struct UserLocks {
  locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
  /// Wait for exclusive access to `user`'s duty state
  pub async fn acquire(&self, user: &str) -> OwnedMutexGuard<()> {
    let lock = {
      let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
      // Only the map holds an idle entry; held or awaited ones have clones
      locks.retain(|_, lock| Arc::strong_count(lock) > 1);
      locks
        .entry(user.to_string())
        .or_insert_with(|| Arc::new(AsyncMutex::new(())))
        .clone()
    };
    lock.lock_owned().await
  }
}

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
  pub duty_locks: UserLocks,
}

impl AppState {
  pub fn new(db: DbPool, config: AppConfig) -> Self {
    Self {
      db,
      config,
      duty_locks: UserLocks::default(),
    }
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &DatabaseConfig) -> Result<DbPool, AppError> {
  info!(url = %config.url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
