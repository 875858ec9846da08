//! Entity catalogue and the per-entity configuration consumed by the generic
//! command and query services.

use std::fmt;
use std::str::FromStr;

use pagination::SortSelectors;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{AccessPolicy, FieldErrors, Record, RecordId, RequiredRole};

/// Every entity type the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Named collection of equipment, such as a gym.
    EquipmentGroup,
    /// A piece of equipment.
    Equipment,
    /// Muscle group targeted by exercise types.
    MuscleGroup,
    /// Catalogue exercise definition.
    ExerciseType,
    /// A user's own exercise built on an exercise type.
    UserExercise,
    /// A logged workout.
    WorkoutSession,
}

impl EntityKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 6] = [
        Self::EquipmentGroup,
        Self::Equipment,
        Self::MuscleGroup,
        Self::ExerciseType,
        Self::UserExercise,
        Self::WorkoutSession,
    ];

    /// Entity name used in error payloads.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EquipmentGroup => "EquipmentGroup",
            Self::Equipment => "Equipment",
            Self::MuscleGroup => "MuscleGroup",
            Self::ExerciseType => "ExerciseType",
            Self::UserExercise => "UserExercise",
            Self::WorkoutSession => "WorkoutSession",
        }
    }

    /// URL path segment for the entity's collection.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::EquipmentGroup => "equipment-groups",
            Self::Equipment => "equipment",
            Self::MuscleGroup => "muscle-groups",
            Self::ExerciseType => "exercise-types",
            Self::UserExercise => "user-exercises",
            Self::WorkoutSession => "workout-sessions",
        }
    }

    /// Protection applied to records of this kind.
    #[must_use]
    pub const fn access(self) -> AccessPolicy {
        match self {
            Self::UserExercise | Self::WorkoutSession => AccessPolicy::OwnerScoped,
            Self::EquipmentGroup | Self::Equipment | Self::MuscleGroup | Self::ExerciseType => {
                AccessPolicy::AdminManaged
            }
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record a resource points at, checked for existence before writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Kind of the referenced record.
    pub kind: EntityKind,
    /// Identifier of the referenced record.
    pub id: RecordId,
}

impl Reference {
    /// Reference to the `kind` record with `id`.
    #[must_use]
    pub const fn new(kind: EntityKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

/// Per-entity configuration for the generic resource pipeline.
///
/// Implementors supply only what differs between entities: structural
/// validation, the uniqueness key, the search predicate, named sort keys and
/// outgoing references. Everything else (authorization, concurrency, paging)
/// is shared.
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind of entity this payload describes.
    const KIND: EntityKind;

    /// Structural validation.
    ///
    /// # Errors
    /// Returns the per-field messages when any field is invalid.
    fn validate(&self) -> Result<(), FieldErrors>;

    /// Normalised uniqueness key. Records sharing an ownership scope must not
    /// share a key.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Case-insensitive search predicate over the entity's searchable fields.
    fn matches_search(&self, term: &str) -> bool;

    /// Sort keys clients may name in `sortBy`.
    fn sort_selectors() -> SortSelectors<Record<Self>>;

    /// Records this payload points at.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// Parse errors for relation path segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationKindError {
    /// No relation is registered under this name.
    #[error("unknown relation: {value}")]
    Unknown {
        /// Rejected segment.
        value: String,
    },
}

/// Many-to-many links between two entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    /// Equipment group membership of equipment.
    EquipmentGroupMembership,
    /// Muscle groups worked by an exercise type.
    ExerciseTypeMuscleGroup,
    /// User exercises performed in a workout session.
    WorkoutSessionExercise,
}

impl RelationKind {
    /// All relations in declaration order.
    pub const ALL: [Self; 3] = [
        Self::EquipmentGroupMembership,
        Self::ExerciseTypeMuscleGroup,
        Self::WorkoutSessionExercise,
    ];

    /// Kind on the left of the link.
    #[must_use]
    pub const fn left(self) -> EntityKind {
        match self {
            Self::EquipmentGroupMembership => EntityKind::EquipmentGroup,
            Self::ExerciseTypeMuscleGroup => EntityKind::ExerciseType,
            Self::WorkoutSessionExercise => EntityKind::WorkoutSession,
        }
    }

    /// Kind on the right of the link.
    #[must_use]
    pub const fn right(self) -> EntityKind {
        match self {
            Self::EquipmentGroupMembership => EntityKind::Equipment,
            Self::ExerciseTypeMuscleGroup => EntityKind::MuscleGroup,
            Self::WorkoutSessionExercise => EntityKind::UserExercise,
        }
    }

    /// URL path segment naming the relation.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::EquipmentGroupMembership => "equipment-group-equipment",
            Self::ExerciseTypeMuscleGroup => "exercise-type-muscle-groups",
            Self::WorkoutSessionExercise => "workout-session-exercises",
        }
    }

    /// Role required to attach or detach links.
    ///
    /// Links between catalogue entities are admin-only; links touching an
    /// owner-scoped side are open to that side's owner.
    #[must_use]
    pub const fn mutation_role(self) -> RequiredRole {
        match (self.left().access(), self.right().access()) {
            (AccessPolicy::AdminManaged, AccessPolicy::AdminManaged) => RequiredRole::Admin,
            _ => RequiredRole::Authenticated,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for RelationKind {
    type Err = RelationKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|relation| relation.slug().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| RelationKindError::Unknown {
                value: value.to_owned(),
            })
    }
}
