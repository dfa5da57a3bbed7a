use tracing::info;

use crate::db::AppState;
use crate::error::AppError;
use crate::models::{Cycle, NewCycle, ValidationError};
use crate::schedule::parse_date;
use crate::store;

/// ---------------------------------------------------------------------------
/// Cycle Lifecycle
/// ---------------------------------------------------------------------------

/// Validate and persist a new private cycle
pub async fn create_cycle(state: &AppState, cycle: NewCycle) -> Result<Cycle, AppError> {
  cycle.validate()?;

  if store::cycle_name_exists(&state.db, &cycle.owner, &cycle.name).await? {
    return Err(AppError::Conflict(format!(
      "Cycle '{}' already exists for {}",
      cycle.name, cycle.owner
    )));
  }

  let id = store::insert_cycle(&state.db, &cycle, None).await?;
  info!(owner = %cycle.owner, cycle = %cycle.name, id, "Created cycle");

  store::load_cycle_by_id(&state.db, id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cycle #{} vanished after insert", id)))
}

/// Look up an owner's cycle, listing their cycle names when it's missing
async fn find_owned(state: &AppState, owner: &str, name: &str) -> Result<Cycle, AppError> {
  match store::load_cycle(&state.db, owner, name).await? {
    Some(cycle) => Ok(cycle),
    None => {
      let names = store::cycle_names(&state.db, owner).await?;
      Err(AppError::NotFound(format!(
        "Cycle '{}' not found. Your cycles: {:?}",
        name, names
      )))
    }
  }
}

pub async fn delete_cycle(state: &AppState, owner: &str, name: &str) -> Result<(), AppError> {
  let cycle = find_owned(state, owner, name).await?;
  store::delete_cycle(&state.db, cycle.id).await?;
  info!(owner = %owner, cycle = %name, "Deleted cycle");
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Sharing
/// ---------------------------------------------------------------------------

/// Make a cycle public; clones can't be republished
pub async fn publish_cycle(state: &AppState, owner: &str, name: &str) -> Result<(), AppError> {
  let cycle = find_owned(state, owner, name).await?;
  if cycle.is_clone() {
    return Err(AppError::Forbidden(format!(
      "Cycle '{}' is a clone of {}'s work and cannot be published",
      name,
      cycle.provenance()
    )));
  }

  store::set_public(&state.db, cycle.id, true).await?;
  info!(owner = %owner, cycle = %name, "Published cycle");
  Ok(())
}

pub async fn unpublish_cycle(state: &AppState, owner: &str, name: &str) -> Result<(), AppError> {
  let cycle = find_owned(state, owner, name).await?;
  store::set_public(&state.db, cycle.id, false).await?;
  info!(owner = %owner, cycle = %name, "Unpublished cycle");
  Ok(())
}

/// First free name among "name", "name (2)", "name (3)", ...
async fn unique_cycle_name(state: &AppState, owner: &str, base: &str) -> Result<String, AppError> {
  let mut candidate = base.to_string();
  let mut counter = 1;
  while store::cycle_name_exists(&state.db, owner, &candidate).await? {
    counter += 1;
    candidate = format!("{} ({})", base, counter);
  }
  Ok(candidate)
}

/// Copy a public cycle into `user`'s private list, crediting the original author
pub async fn clone_cycle(
  state: &AppState,
  user: &str,
  cycle_id: i64,
  start_at: &str,
) -> Result<Cycle, AppError> {
  if parse_date(start_at).is_err() {
    return Err(ValidationError::InvalidStartDate(start_at.to_string()).into());
  }

  let source = store::load_cycle_by_id(&state.db, cycle_id)
    .await?
    .filter(|c| c.is_public)
    .ok_or_else(|| AppError::NotFound(format!("Public cycle #{} not found", cycle_id)))?;

  let name = unique_cycle_name(state, user, &source.name).await?;
  let copy = NewCycle::cloned_from(&source, user, &name, start_at);
  let id = store::insert_cycle(&state.db, &copy, Some(source.provenance())).await?;

  info!(
    user = %user,
    source_id = cycle_id,
    source_owner = %source.owner,
    cycle = %name,
    "Cloned cycle"
  );

  store::load_cycle_by_id(&state.db, id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cycle #{} vanished after insert", id)))
}
