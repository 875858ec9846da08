//! Equipment group catalogue entity.

use pagination::{SortSelectors, contains_ignore_case};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{
    DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS, into_result, name_key, optional_text, require_text,
    sort_text, with_timestamps,
};
use crate::domain::{EntityKind, FieldErrors, Record, Resource};

/// Named collection of equipment, such as "Home Gym".
///
/// # Examples
/// ```
/// use backend::domain::{EquipmentGroup, Resource};
///
/// let group = EquipmentGroup::named("Home Gym");
/// assert!(group.validate().is_ok());
/// assert!(group.matches_search("gym"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentGroup {
    /// Display name, unique ignoring case.
    pub name: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EquipmentGroup {
    /// Group with a name and no description.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

impl Resource for EquipmentGroup {
    const KIND: EntityKind = EntityKind::EquipmentGroup;

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "name", &self.name, NAME_MAX_CHARS);
        optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX_CHARS,
        );
        into_result(errors)
    }

    fn unique_key(&self) -> Option<String> {
        Some(name_key(&self.name))
    }

    fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
    }

    fn sort_selectors() -> SortSelectors<Record<Self>> {
        with_timestamps(
            SortSelectors::new().with("name", |record: &Record<Self>| sort_text(&record.fields.name)),
        )
    }
}
