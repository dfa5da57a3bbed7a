//! Training-Cycle Scheduler
//!
//! Every cycle repeats `days_count` active days followed by `pause` rest days,
//! anchored at its start date. This module maps calendar dates onto that
//! pattern and reconciles the resulting duties with a user's stored
//! completion flags.
//!
//! Key rules:
//! - Offsets before the start date wrap around (floored modulo)
//! - Pause days resolve to rest, never to an error
//! - A date's stored flags are rebuilt from the current resolution each time

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

use crate::models::{Cycle, DayDuties, DutyState};

/// Calendar date format used everywhere dates cross a boundary
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Label clients store for a plan day without exercises
pub const REST_SENTINEL: &str = "Нет упражнений";

// ---------------------------------------------------------------------------
/// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid date '{value}'. Use YYYY-MM-DD.")]
    InvalidDate { value: String },

    #[error("Cycle '{cycle}' has no schedulable period (days_count={days_count}, pause={pause_count})")]
    InvalidPeriod {
        cycle: String,
        days_count: i64,
        pause_count: i64,
    },

    #[error("Duty '{duty}' not found for {date}")]
    DutyNotFound { date: String, duty: String },

    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ScheduleError::InvalidDate {
        value: value.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Modulo whose result always lies in `[0, modulus)` for a positive modulus
pub fn floored_mod(value: i64, modulus: i64) -> i64 {
    debug_assert!(modulus > 0, "modulus must be positive");
    value.rem_euclid(modulus)
}

// ---------------------------------------------------------------------------
/// Cycle Schedule Resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Resolution {
    /// An active day carrying this label
    Duty(String),
    /// Pause window (or an index the descriptions don't cover)
    Rest,
}

impl Resolution {
    pub fn label(&self) -> Option<&str> {
        match self {
            Resolution::Duty(label) => Some(label),
            Resolution::Rest => None,
        }
    }

    /// Counts toward the monthly load: a real, non-sentinel label
    pub fn is_active(&self) -> bool {
        self.label()
            .is_some_and(|label| !label.is_empty() && label != REST_SENTINEL)
    }
}

/// Position of `date` inside the cycle's repeating period
pub fn cycle_index(cycle: &Cycle, start: NaiveDate, date: NaiveDate) -> Result<i64, ScheduleError> {
    let period = cycle.period();
    if period <= 0 {
        return Err(ScheduleError::InvalidPeriod {
            cycle: cycle.name.clone(),
            days_count: cycle.days_count,
            pause_count: cycle.pause_count,
        });
    }
    let offset = (date - start).num_days();
    Ok(floored_mod(offset, period))
}

/// Resolve the duty a cycle assigns to `date`
pub fn resolve(cycle: &Cycle, date: NaiveDate) -> Result<Resolution, ScheduleError> {
    let start = cycle.start_date()?;
    resolve_from(cycle, start, date)
}

/// Same as [`resolve`] with an already-parsed start date
pub fn resolve_from(
    cycle: &Cycle,
    start: NaiveDate,
    date: NaiveDate,
) -> Result<Resolution, ScheduleError> {
    let index = cycle_index(cycle, start, date)?;
    if index >= cycle.days_count {
        return Ok(Resolution::Rest);
    }

    // Index within days_count but past the stored labels: treat as rest
    Ok(usize::try_from(index)
        .ok()
        .and_then(|i| cycle.descriptions.get(i))
        .map(|label| Resolution::Duty(label.clone()))
        .unwrap_or(Resolution::Rest))
}

/// Collect the distinct duty labels all cycles assign to `date`
pub fn resolve_day(cycles: &[Cycle], date: NaiveDate) -> Result<BTreeSet<String>, ScheduleError> {
    let mut labels = BTreeSet::new();
    for cycle in cycles {
        if let Resolution::Duty(label) = resolve(cycle, date)? {
            labels.insert(label);
        }
    }
    Ok(labels)
}

// ---------------------------------------------------------------------------
/// Duty State Merge & Toggle
// ---------------------------------------------------------------------------

/// Rebuild a date's flags from the current resolution.
///
/// Labels start incomplete; labels also present in `stored` keep their flag;
/// stored labels no longer resolved are dropped.
pub fn merge(resolved: &BTreeSet<String>, stored: Option<&DayDuties>) -> DayDuties {
    resolved
        .iter()
        .map(|label| {
            let done = stored
                .and_then(|duties| duties.get(label))
                .copied()
                .unwrap_or(false);
            (label.clone(), done)
        })
        .collect()
}

/// Merge the resolution for `date` into `state`, overwriting that date's entry
pub fn apply_merge(state: &mut DutyState, date: &str, resolved: &BTreeSet<String>) -> DayDuties {
    let merged = merge(resolved, state.day(date));
    state.set_day(date, merged.clone());
    merged
}

/// Flip the completion flag of one stored duty
pub fn toggle<'a>(
    state: &'a mut DutyState,
    date: &str,
    duty: &str,
) -> Result<&'a DutyState, ScheduleError> {
    let flag = state
        .day_mut(date)
        .and_then(|duties| duties.get_mut(duty))
        .ok_or_else(|| ScheduleError::DutyNotFound {
            date: date.to_string(),
            duty: duty.to_string(),
        })?;
    *flag = !*flag;
    Ok(state)
}

// ---------------------------------------------------------------------------
/// Monthly Load Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// Date -> number of cycles with an active duty that day
    pub days: BTreeMap<String, u32>,
    /// Highest daily count in the month (0 when nothing is scheduled)
    pub max: u32,
}

/// Count active cycles for every day of a month
pub fn summarize_month(cycles: &[Cycle], year: i32, month: u32) -> Result<MonthSummary, ScheduleError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ScheduleError::InvalidMonth { year, month })?;

    let anchored: Vec<(&Cycle, NaiveDate)> = cycles
        .iter()
        .filter_map(|cycle| match cycle.start_date() {
            Ok(start) if cycle.period() > 0 => Some((cycle, start)),
            Ok(_) => {
                warn!(cycle = %cycle.name, period = cycle.period(), "Skipping cycle with empty period");
                None
            }
            Err(_) => {
                warn!(cycle = %cycle.name, start_at = %cycle.start_at, "Skipping cycle with unparseable start date");
                None
            }
        })
        .collect();

    let mut days = BTreeMap::new();
    for date in first.iter_days().take_while(|d| d.month() == month) {
        let count = anchored
            .iter()
            .filter(|(cycle, start)| {
                resolve_from(cycle, *start, date)
                    .map(|resolution| resolution.is_active())
                    .unwrap_or(false)
            })
            .count() as u32;
        days.insert(format_date(date), count);
    }

    let max = days.values().copied().max().unwrap_or(0);
    Ok(MonthSummary { days, max })
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
