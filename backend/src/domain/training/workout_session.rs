//! Logged workout sessions.

use chrono::{DateTime, Utc};
use pagination::{SortSelectors, contains_ignore_case};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{
    DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS, into_result, optional_range, optional_text,
    require_text, sort_text,
};
use crate::domain::{EntityKind, FieldErrors, Record, Resource};

/// Longest session accepted, one full day.
pub const MAX_DURATION_MINUTES: u32 = 1440;

/// A workout the owner performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    /// Short title, such as "Leg day".
    pub title: String,
    /// When the session took place.
    pub performed_at: DateTime<Utc>,
    /// Length of the session in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Optional free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource for WorkoutSession {
    const KIND: EntityKind = EntityKind::WorkoutSession;

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "title", &self.title, NAME_MAX_CHARS);
        optional_range(
            &mut errors,
            "durationMinutes",
            self.duration_minutes,
            1..=MAX_DURATION_MINUTES,
        );
        optional_text(&mut errors, "notes", self.notes.as_deref(), DESCRIPTION_MAX_CHARS);
        into_result(errors)
    }

    fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.title, term)
            || self
                .notes
                .as_deref()
                .is_some_and(|notes| contains_ignore_case(notes, term))
    }

    fn sort_selectors() -> SortSelectors<Record<Self>> {
        SortSelectors::new()
            .with("title", |record: &Record<Self>| sort_text(&record.fields.title))
            .with("performedAt", |record: &Record<Self>| record.fields.performed_at)
            .with("durationMinutes", |record: &Record<Self>| {
                record.fields.duration_minutes
            })
            .with("createdAt", |record: &Record<Self>| record.created_at)
    }
}
