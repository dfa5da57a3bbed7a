use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::schedule::{parse_date, ScheduleError};

/// Sets assumed for a plan entry that doesn't specify them
pub const DEFAULT_SETS: u32 = 3;

fn default_sets() -> u32 {
  DEFAULT_SETS
}

/// ---------------------------------------------------------------------------
/// Workout Plan
/// ---------------------------------------------------------------------------

/// One exercise slot inside a plan day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
  /// Index into the exercise catalog; older clients sometimes left it out
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(default = "default_sets")]
  pub sets: u32,
  /// Display name clients attach for convenience; not used in analysis
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
}

impl PlanEntry {
  pub fn new(id: i64, sets: u32) -> Self {
    Self {
      id: Some(id),
      sets,
      name: None,
    }
  }
}

/// Mapping of day label -> ordered exercise list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutPlan(BTreeMap<String, Vec<PlanEntry>>);

impl WorkoutPlan {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse and shape-check a plan payload
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  pub fn with_day(mut self, day: impl Into<String>, entries: Vec<PlanEntry>) -> Self {
    self.0.insert(day.into(), entries);
    self
  }

  /// Number of distinct day buckets present in the payload
  pub fn day_count(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn days(&self) -> impl Iterator<Item = (&String, &Vec<PlanEntry>)> {
    self.0.iter()
  }
}

impl From<BTreeMap<String, Vec<PlanEntry>>> for WorkoutPlan {
  fn from(days: BTreeMap<String, Vec<PlanEntry>>) -> Self {
    Self(days)
  }
}

/// ---------------------------------------------------------------------------
/// Cycle Records
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
  pub id: i64,
  pub name: String,
  pub owner: String,
  pub days_count: i64,
  #[serde(rename = "pause")]
  pub pause_count: i64,
  pub descriptions: Vec<String>,
  pub plan: WorkoutPlan,
  pub start_at: String,
  pub is_public: bool,
  /// Set when the cycle was cloned from someone else's published cycle
  pub original_author: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

impl Cycle {
  /// Active days plus pause days
  pub fn period(&self) -> i64 {
    self.days_count + self.pause_count
  }

  pub fn start_date(&self) -> Result<NaiveDate, ScheduleError> {
    parse_date(&self.start_at)
  }

  pub fn is_clone(&self) -> bool {
    self.original_author.as_deref().is_some_and(|a| !a.is_empty())
  }

  /// Author credited for this plan, following clone provenance
  pub fn provenance(&self) -> &str {
    match self.original_author.as_deref() {
      Some(author) if !author.is_empty() => author,
      _ => &self.owner,
    }
  }
}

/// For inserting new cycles (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCycle {
  pub name: String,
  pub owner: String,
  pub days_count: i64,
  #[serde(rename = "pause", default)]
  pub pause_count: i64,
  pub descriptions: Vec<String>,
  #[serde(rename = "data_cycle")]
  pub plan: WorkoutPlan,
  pub start_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Cycle name must not be empty")]
  EmptyName,

  #[error("Days count must be positive, got {0}")]
  NonPositiveDays(i64),

  #[error("Pause must not be negative, got {0}")]
  NegativePause(i64),

  #[error("Invalid count elements in descriptions: expected {expected}, got {actual}")]
  DescriptionCount { expected: i64, actual: usize },

  #[error("Invalid start_at date '{0}'. Use YYYY-MM-DD.")]
  InvalidStartDate(String),
}

impl NewCycle {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::EmptyName);
    }
    if parse_date(&self.start_at).is_err() {
      return Err(ValidationError::InvalidStartDate(self.start_at.clone()));
    }
    if self.days_count <= 0 {
      return Err(ValidationError::NonPositiveDays(self.days_count));
    }
    if self.pause_count < 0 {
      return Err(ValidationError::NegativePause(self.pause_count));
    }
    if self.descriptions.len() as i64 != self.days_count {
      return Err(ValidationError::DescriptionCount {
        expected: self.days_count,
        actual: self.descriptions.len(),
      });
    }
    Ok(())
  }

  /// Copy of an existing cycle under a new owner, name and start date
  pub fn cloned_from(source: &Cycle, owner: &str, name: &str, start_at: &str) -> Self {
    Self {
      name: name.to_string(),
      owner: owner.to_string(),
      days_count: source.days_count,
      pause_count: source.pause_count,
      descriptions: source.descriptions.clone(),
      plan: source.plan.clone(),
      start_at: start_at.to_string(),
    }
  }
}
