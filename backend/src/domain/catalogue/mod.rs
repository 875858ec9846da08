//! Shared catalogue entities managed by administrators.
//!
//! Every authenticated user reads the catalogue; only administrators create,
//! update, delete or link catalogue records. Names are unique across the
//! whole catalogue of a kind, ignoring case.

mod equipment;
mod equipment_group;
mod exercise_type;
mod muscle_group;

pub use equipment::Equipment;
pub use equipment_group::EquipmentGroup;
pub use exercise_type::ExerciseType;
pub use muscle_group::{BodyRegion, MuscleGroup};
