//! Muscle group catalogue entity.

use pagination::{SortSelectors, contains_ignore_case};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{
    NAME_MAX_CHARS, into_result, name_key, require_text, sort_text,
};
use crate::domain::{EntityKind, FieldErrors, Record, Resource};

/// Coarse body region a muscle group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    /// Chest, back, shoulders and arms.
    Upper,
    /// Hips and legs.
    Lower,
    /// Trunk stabilisers.
    Core,
    /// Compound, whole-body work.
    FullBody,
}

/// Muscle group targeted by exercise types, such as "Quadriceps".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleGroup {
    /// Display name, unique ignoring case.
    pub name: String,
    /// Region used for grouping in clients.
    pub body_region: BodyRegion,
}

impl Resource for MuscleGroup {
    const KIND: EntityKind = EntityKind::MuscleGroup;

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "name", &self.name, NAME_MAX_CHARS);
        into_result(errors)
    }

    fn unique_key(&self) -> Option<String> {
        Some(name_key(&self.name))
    }

    fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
    }

    fn sort_selectors() -> SortSelectors<Record<Self>> {
        SortSelectors::new()
            .with("name", |record: &Record<Self>| sort_text(&record.fields.name))
            .with("bodyRegion", |record: &Record<Self>| record.fields.body_region)
            .with("createdAt", |record: &Record<Self>| record.created_at)
    }
}
