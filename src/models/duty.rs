use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion flags for one date: duty label -> done
pub type DayDuties = BTreeMap<String, bool>;

/// Older clients stored flags as 0/1 integers
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum StoredFlag {
  Bool(bool),
  Int(i64),
}

impl From<StoredFlag> for bool {
  fn from(flag: StoredFlag) -> Self {
    match flag {
      StoredFlag::Bool(b) => b,
      StoredFlag::Int(i) => i != 0,
    }
  }
}

type RawDutyState = BTreeMap<String, BTreeMap<String, StoredFlag>>;

/// Per-user mapping of date string -> duty completion flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDutyState", into = "BTreeMap<String, DayDuties>")]
pub struct DutyState {
  days: BTreeMap<String, DayDuties>,
}

impl From<RawDutyState> for DutyState {
  fn from(raw: RawDutyState) -> Self {
    let days = raw
      .into_iter()
      .map(|(date, duties)| {
        let duties = duties
          .into_iter()
          .map(|(label, flag)| (label, bool::from(flag)))
          .collect();
        (date, duties)
      })
      .collect();
    Self { days }
  }
}

impl From<DutyState> for BTreeMap<String, DayDuties> {
  fn from(state: DutyState) -> Self {
    state.days
  }
}

impl DutyState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  pub fn day(&self, date: &str) -> Option<&DayDuties> {
    self.days.get(date)
  }

  pub fn day_mut(&mut self, date: &str) -> Option<&mut DayDuties> {
    self.days.get_mut(date)
  }

  /// Replace the whole entry for a date
  pub fn set_day(&mut self, date: impl Into<String>, duties: DayDuties) {
    self.days.insert(date.into(), duties);
  }

  pub fn dates(&self) -> impl Iterator<Item = &String> {
    self.days.keys()
  }

  pub fn len(&self) -> usize {
    self.days.len()
  }

  pub fn is_empty(&self) -> bool {
    self.days.is_empty()
  }
}
