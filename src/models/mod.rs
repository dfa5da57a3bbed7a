pub mod cycle;
pub mod duty;
pub mod user;

pub use cycle::{Cycle, NewCycle, PlanEntry, ValidationError, WorkoutPlan};
pub use duty::{DayDuties, DutyState};
pub use user::User;
