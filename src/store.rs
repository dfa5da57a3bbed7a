//! SQLite-backed cycle and duty-state repositories

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::{Cycle, DutyState, NewCycle, User, WorkoutPlan};

const CYCLE_COLUMNS: &str = r#"
    id, name, owner, days_count, pause, descriptions, plan,
    start_at, is_public, original_author, created_at
"#;

/// SQLite's CURRENT_TIMESTAMP format, with RFC 3339 accepted too
fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    let value = value?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.and_utc())
                .ok()
        })
}

fn cycle_from_row(row: &SqliteRow) -> Result<Cycle, AppError> {
    let descriptions: String = row.get("descriptions");
    let plan: String = row.get("plan");
    let original_author: String = row.get("original_author");
    let is_public: i64 = row.get("is_public");

    Ok(Cycle {
        id: row.get("id"),
        name: row.get("name"),
        owner: row.get("owner"),
        days_count: row.get("days_count"),
        pause_count: row.get("pause"),
        descriptions: serde_json::from_str(&descriptions)?,
        plan: WorkoutPlan::from_json(&plan)?,
        start_at: row.get("start_at"),
        is_public: is_public != 0,
        original_author: Some(original_author).filter(|a| !a.is_empty()),
        created_at: parse_timestamp(row.get("created_at")),
    })
}

// ---------------------------------------------------------------------------
// Users & Duty State
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &SqlitePool, username: &str, bio: &str) -> Result<i64, AppError> {
    let result = sqlx::query("INSERT INTO users (username, days, bio) VALUES (?, '{}', ?)")
        .bind(username)
        .bind(bio)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn user_exists(pool: &SqlitePool, username: &str) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn load_user(pool: &SqlitePool, username: &str) -> Result<User, AppError> {
    let row = sqlx::query("SELECT id, username, bio, created_at FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", username)))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        bio: row.get("bio"),
        created_at: parse_timestamp(row.get("created_at")),
    })
}

/// Load a user's whole date -> duties map
pub async fn load_duty_state(pool: &SqlitePool, username: &str) -> Result<DutyState, AppError> {
    let days: Option<String> = sqlx::query_scalar("SELECT days FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    let days = days.ok_or_else(|| AppError::NotFound(format!("User not found: {}", username)))?;
    Ok(DutyState::from_json(&days)?)
}

/// Overwrite a user's duty map
pub async fn save_duty_state(
    pool: &SqlitePool,
    username: &str,
    state: &DutyState,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET days = ? WHERE username = ?")
        .bind(state.to_json()?)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User not found: {}", username)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Cycles
// ---------------------------------------------------------------------------

pub async fn insert_cycle(
    pool: &SqlitePool,
    cycle: &NewCycle,
    original_author: Option<&str>,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO cycles
            (name, owner, days_count, pause, descriptions, plan, start_at, is_public, original_author)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(&cycle.name)
    .bind(&cycle.owner)
    .bind(cycle.days_count)
    .bind(cycle.pause_count)
    .bind(serde_json::to_string(&cycle.descriptions)?)
    .bind(cycle.plan.to_json()?)
    .bind(&cycle.start_at)
    .bind(original_author.unwrap_or(""))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn load_cycles_for_owner(pool: &SqlitePool, owner: &str) -> Result<Vec<Cycle>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM cycles WHERE owner = ? ORDER BY id",
        CYCLE_COLUMNS
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?;

    rows.iter().map(cycle_from_row).collect()
}

pub async fn load_cycle(pool: &SqlitePool, owner: &str, name: &str) -> Result<Option<Cycle>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM cycles WHERE owner = ? AND name = ?",
        CYCLE_COLUMNS
    ))
    .bind(owner)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(cycle_from_row).transpose()
}

pub async fn load_cycle_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Cycle>, AppError> {
    let row = sqlx::query(&format!("SELECT {} FROM cycles WHERE id = ?", CYCLE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(cycle_from_row).transpose()
}

pub async fn load_public_cycle(
    pool: &SqlitePool,
    owner: &str,
    name: &str,
) -> Result<Option<Cycle>, AppError> {
    Ok(load_cycle(pool, owner, name).await?.filter(|c| c.is_public))
}

pub async fn cycle_names(pool: &SqlitePool, owner: &str) -> Result<Vec<String>, AppError> {
    let names = sqlx::query_scalar("SELECT name FROM cycles WHERE owner = ? ORDER BY id")
        .bind(owner)
        .fetch_all(pool)
        .await?;
    Ok(names)
}

pub async fn cycle_name_exists(pool: &SqlitePool, owner: &str, name: &str) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cycles WHERE owner = ? AND name = ?")
        .bind(owner)
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn delete_cycle(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM cycles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_public(pool: &SqlitePool, id: i64, is_public: bool) -> Result<(), AppError> {
    sqlx::query("UPDATE cycles SET is_public = ? WHERE id = ?")
        .bind(i64::from(is_public))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
