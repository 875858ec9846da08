//! Per-user training records.
//!
//! Owners and administrators read and mutate these records; non-admin list
//! queries only ever see the caller's own rows.

mod user_exercise;
mod workout_session;

pub use user_exercise::UserExercise;
pub use workout_session::{MAX_DURATION_MINUTES, WorkoutSession};
