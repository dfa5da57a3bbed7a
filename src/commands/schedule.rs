use tracing::{debug, info};

use crate::db::AppState;
use crate::error::AppError;
use crate::models::{DayDuties, DutyState};
use crate::schedule::{self, parse_date, MonthSummary};
use crate::store;

/// Resolve the owner's duties for `date`, merge with stored flags and persist
pub async fn day_duties(state: &AppState, owner: &str, date: &str) -> Result<DayDuties, AppError> {
  let day = parse_date(date)?;

  let _guard = state.duty_locks.acquire(owner).await;

  let cycles = store::load_cycles_for_owner(&state.db, owner).await?;
  let resolved = schedule::resolve_day(&cycles, day)?;
  debug!(owner = %owner, date = %date, labels = resolved.len(), "Resolved day duties");

  let mut duties = store::load_duty_state(&state.db, owner).await?;
  let merged = schedule::apply_merge(&mut duties, date, &resolved);
  store::save_duty_state(&state.db, owner, &duties).await?;

  Ok(merged)
}

/// Flip one stored duty and return the owner's full duty map
pub async fn toggle_duty(
  state: &AppState,
  owner: &str,
  date: &str,
  duty: &str,
) -> Result<DutyState, AppError> {
  let _guard = state.duty_locks.acquire(owner).await;

  let mut duties = store::load_duty_state(&state.db, owner).await?;
  schedule::toggle(&mut duties, date, duty)?;
  store::save_duty_state(&state.db, owner, &duties).await?;

  let done = duties.day(date).and_then(|d| d.get(duty)).copied().unwrap_or(false);
  info!(owner = %owner, date = %date, duty = %duty, done, "Toggled duty");

  Ok(duties)
}

pub async fn month_duties(
  state: &AppState,
  owner: &str,
  year: i32,
  month: u32,
) -> Result<MonthSummary, AppError> {
  let cycles = store::load_cycles_for_owner(&state.db, owner).await?;
  Ok(schedule::summarize_month(&cycles, year, month)?)
}
