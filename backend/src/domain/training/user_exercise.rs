//! A user's own exercise, built on a catalogue exercise type.

use pagination::{SortSelectors, contains_ignore_case};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{
    DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS, into_result, name_key, optional_text, require_text,
    sort_text, with_timestamps,
};
use crate::domain::{EntityKind, FieldErrors, Record, RecordId, Reference, Resource};

/// Exercise a user tracks, such as "Paused Squat".
///
/// Names are unique per owner; two users may each own an exercise with the
/// same name.
///
/// # Examples
/// ```
/// use backend::domain::{EntityKind, RecordId, Resource, UserExercise};
///
/// let exercise = UserExercise {
///     name: "Paused Squat".into(),
///     exercise_type_id: RecordId::new(1).expect("positive id"),
///     notes: Some("two second pause".into()),
/// };
/// assert!(exercise.matches_search("PAUSE"));
/// assert_eq!(exercise.references()[0].kind, EntityKind::ExerciseType);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExercise {
    /// Display name, unique per owner ignoring case.
    pub name: String,
    /// Catalogue exercise type this exercise is based on.
    pub exercise_type_id: RecordId,
    /// Optional free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource for UserExercise {
    const KIND: EntityKind = EntityKind::UserExercise;

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "name", &self.name, NAME_MAX_CHARS);
        optional_text(&mut errors, "notes", self.notes.as_deref(), DESCRIPTION_MAX_CHARS);
        into_result(errors)
    }

    fn unique_key(&self) -> Option<String> {
        Some(name_key(&self.name))
    }

    fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
            || self
                .notes
                .as_deref()
                .is_some_and(|notes| contains_ignore_case(notes, term))
    }

    fn sort_selectors() -> SortSelectors<Record<Self>> {
        with_timestamps(
            SortSelectors::new().with("name", |record: &Record<Self>| sort_text(&record.fields.name)),
        )
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(EntityKind::ExerciseType, self.exercise_type_id)]
    }
}
