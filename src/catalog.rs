//! Exercise and muscle reference data
//!
//! Both catalogs are read-only snapshots loaded per analytics call.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Weekly target used for muscles without an explicit one
pub const DEFAULT_OPTIMAL_WEEKLY: f64 = 10.0;

fn default_optimal_weekly() -> f64 {
  DEFAULT_OPTIMAL_WEEKLY
}

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Failed to read catalog {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse catalog: {0}")]
  Parse(#[from] serde_json::Error),
}

async fn read_catalog(path: &Path) -> Result<String, CatalogError> {
  tokio::fs::read_to_string(path)
    .await
    .map_err(|source| CatalogError::Io {
      path: path.to_path_buf(),
      source,
    })
}

/// ---------------------------------------------------------------------------
/// Exercises
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
  /// Position in the catalog; assigned on load
  #[serde(default)]
  pub id: usize,
  #[serde(default)]
  pub name: String,
  /// Muscle id -> load per set
  #[serde(default)]
  pub muscles: BTreeMap<String, f64>,
}

/// Outcome of looking up a plan entry's exercise id
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExerciseLookup<'a> {
  Found(&'a ExerciseEntry),
  /// Id is negative or past the end of the catalog
  UnknownId,
  /// Slot exists but holds no exercise
  EmptySlot,
}

/// Exercises indexed by position; a slot may be `null`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseCatalog {
  entries: Vec<Option<ExerciseEntry>>,
}

impl ExerciseCatalog {
  pub fn new(entries: Vec<Option<ExerciseEntry>>) -> Self {
    let mut catalog = Self { entries };
    catalog.assign_ids();
    catalog
  }

  pub fn from_json(json: &str) -> Result<Self, CatalogError> {
    let entries: Vec<Option<ExerciseEntry>> = serde_json::from_str(json)?;
    Ok(Self::new(entries))
  }

  pub async fn load(path: &Path) -> Result<Self, CatalogError> {
    Self::from_json(&read_catalog(path).await?)
  }

  fn assign_ids(&mut self) {
    for (index, entry) in self.entries.iter_mut().enumerate() {
      if let Some(entry) = entry {
        entry.id = index;
      }
    }
  }

  pub fn lookup(&self, id: i64) -> ExerciseLookup<'_> {
    let slot = usize::try_from(id).ok().and_then(|i| self.entries.get(i));
    match slot {
      Some(Some(entry)) => ExerciseLookup::Found(entry),
      Some(None) => ExerciseLookup::EmptySlot,
      None => ExerciseLookup::UnknownId,
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// ---------------------------------------------------------------------------
/// Muscles
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleGroup {
  /// Catalog key; assigned on load
  #[serde(default)]
  pub id: String,
  pub name: String,
  #[serde(default = "default_optimal_weekly")]
  pub optimal_weekly: f64,
}

impl MuscleGroup {
  pub fn new(id: &str, name: &str, optimal_weekly: f64) -> Self {
    Self {
      id: id.to_string(),
      name: name.to_string(),
      optimal_weekly,
    }
  }
}

/// Muscle groups in declaration order, indexed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuscleCatalog {
  groups: Vec<MuscleGroup>,
  index: BTreeMap<String, usize>,
}

impl MuscleCatalog {
  /// A repeated id replaces the earlier group in place
  pub fn new(groups: impl IntoIterator<Item = MuscleGroup>) -> Self {
    let mut catalog = Self::default();
    for group in groups {
      catalog.insert(group);
    }
    catalog
  }

  fn insert(&mut self, group: MuscleGroup) {
    match self.index.get(&group.id) {
      Some(&position) => self.groups[position] = group,
      None => {
        self.index.insert(group.id.clone(), self.groups.len());
        self.groups.push(group);
      }
    }
  }

  /// Default muscle table shipped with the service
  pub fn builtin() -> Self {
    Self::new([
      MuscleGroup::new("chest", "Chest", 10.0),
      MuscleGroup::new("back", "Back", 14.0),
      MuscleGroup::new("shoulders", "Shoulders", 10.0),
      MuscleGroup::new("biceps", "Biceps", 8.0),
      MuscleGroup::new("triceps", "Triceps", 8.0),
      MuscleGroup::new("forearms", "Forearms", 6.0),
      MuscleGroup::new("abs", "Abs", 10.0),
      MuscleGroup::new("quads", "Quadriceps", 12.0),
      MuscleGroup::new("hamstrings", "Hamstrings", 10.0),
      MuscleGroup::new("glutes", "Glutes", 10.0),
      MuscleGroup::new("calves", "Calves", 8.0),
    ])
  }

  /// Parse `{id: {name, optimal_weekly?}}`, keeping the file's key order
  pub fn from_json(json: &str) -> Result<Self, CatalogError> {
    Ok(serde_json::from_str(json)?)
  }

  pub async fn load(path: &Path) -> Result<Self, CatalogError> {
    Self::from_json(&read_catalog(path).await?)
  }

  pub fn get(&self, id: &str) -> Option<&MuscleGroup> {
    self.index.get(id).map(|&position| &self.groups[position])
  }

  /// Ids in declaration order
  pub fn ids(&self) -> impl Iterator<Item = &String> {
    self.groups.iter().map(|g| &g.id)
  }

  /// Weekly target, falling back to the default for unknown muscles
  pub fn optimal_weekly(&self, id: &str) -> f64 {
    self.get(id)
      .map(|g| g.optimal_weekly)
      .unwrap_or(DEFAULT_OPTIMAL_WEEKLY)
  }

  pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
    self.get(id).map(|g| g.name.as_str()).unwrap_or(id)
  }
}

struct MuscleCatalogVisitor;

impl<'de> Visitor<'de> for MuscleCatalogVisitor {
  type Value = MuscleCatalog;

  fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    formatter.write_str("a map of muscle id to muscle group")
  }

  fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
  where
    A: MapAccess<'de>,
  {
    let mut catalog = MuscleCatalog::default();
    while let Some((id, mut group)) = map.next_entry::<String, MuscleGroup>()? {
      group.id = id;
      catalog.insert(group);
    }
    Ok(catalog)
  }
}

impl<'de> Deserialize<'de> for MuscleCatalog {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_map(MuscleCatalogVisitor)
  }
}

impl Serialize for MuscleCatalog {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_map(self.groups.iter().map(|g| (&g.id, g)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exercise_lookup_outcomes() {
    let catalog = ExerciseCatalog::from_json(
      r#"[{"name": "Bench press", "muscles": {"chest": 1.0, "triceps": 0.5}}, null]"#,
    )
    .expect("valid catalog");

    match catalog.lookup(0) {
      ExerciseLookup::Found(entry) => {
        assert_eq!(entry.name, "Bench press");
        assert_eq!(entry.muscles.get("triceps"), Some(&0.5));
      }
      other => panic!("Expected exercise, got {:?}", other),
    }
    assert_eq!(catalog.lookup(1), ExerciseLookup::EmptySlot);
    assert_eq!(catalog.lookup(2), ExerciseLookup::UnknownId);
    assert_eq!(catalog.lookup(-1), ExerciseLookup::UnknownId);
  }

  #[test]
  fn test_exercise_ids_follow_position() {
    let catalog = ExerciseCatalog::from_json(r#"[null, {"id": 99, "name": "Squat"}]"#)
      .expect("valid catalog");
    match catalog.lookup(1) {
      ExerciseLookup::Found(entry) => assert_eq!(entry.id, 1),
      other => panic!("Expected exercise, got {:?}", other),
    }
  }

  #[test]
  fn test_muscle_catalog_defaults_optimal_weekly() {
    let catalog = MuscleCatalog::from_json(
      r#"{"chest": {"name": "Chest", "optimal_weekly": 12}, "abs": {"name": "Abs"}}"#,
    )
    .expect("valid catalog");

    assert_eq!(catalog.optimal_weekly("chest"), 12.0);
    assert_eq!(catalog.optimal_weekly("abs"), DEFAULT_OPTIMAL_WEEKLY);
    assert_eq!(catalog.optimal_weekly("neck"), DEFAULT_OPTIMAL_WEEKLY);
    assert_eq!(catalog.get("abs").map(|g| g.id.as_str()), Some("abs"));
  }

  #[test]
  fn test_display_name_falls_back_to_id() {
    let catalog = MuscleCatalog::builtin();
    assert_eq!(catalog.display_name("quads"), "Quadriceps");
    assert_eq!(catalog.display_name("neck"), "neck");
  }

  #[tokio::test]
  async fn test_load_missing_file_reports_path() {
    let err = ExerciseCatalog::load(Path::new("/nonexistent/exercises.json"))
      .await
      .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/exercises.json"));
  }

  #[tokio::test]
  async fn test_bundled_exercise_catalog_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("db/exercises.json");
    let catalog = ExerciseCatalog::load(&path).await.expect("bundled catalog loads");
    assert!(!catalog.is_empty());
  }

  #[test]
  fn test_muscle_catalog_keeps_declaration_order() {
    let builtin_catalog = MuscleCatalog::builtin();
    let builtin: Vec<&str> = builtin_catalog.ids().map(String::as_str).take(3).collect();
    assert_eq!(builtin, vec!["chest", "back", "shoulders"]);

    let parsed = MuscleCatalog::from_json(
      r#"{"quads": {"name": "Quads"}, "abs": {"name": "Abs"}, "calves": {"name": "Calves"}}"#,
    )
    .expect("valid catalog");
    let ids: Vec<&str> = parsed.ids().map(String::as_str).collect();
    assert_eq!(ids, vec!["quads", "abs", "calves"]);

    let json = serde_json::to_string(&parsed).expect("serializes");
    assert!(json.find("quads") < json.find("abs"));
  }

  #[test]
  fn test_repeated_muscle_id_replaces_in_place() {
    let catalog = MuscleCatalog::new([
      MuscleGroup::new("chest", "Chest", 10.0),
      MuscleGroup::new("back", "Back", 14.0),
      MuscleGroup::new("chest", "Pecs", 12.0),
    ]);
    let ids: Vec<&str> = catalog.ids().map(String::as_str).collect();
    assert_eq!(ids, vec!["chest", "back"]);
    assert_eq!(catalog.display_name("chest"), "Pecs");
  }
}
