//! Field validation helpers shared by entity payloads.
//!
//! Helpers accumulate into a [`FieldErrors`] map so a single response lists
//! every invalid field rather than only the first.

use pagination::SortSelectors;

use crate::domain::{FieldErrors, Record};

/// Longest accepted name or title, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Longest accepted description or notes, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Require non-blank text of at most `max` characters once trimmed.
pub(crate) fn require_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{field} must not be empty"));
    } else {
        limit_length(errors, field, trimmed, max);
    }
}

/// Optional text may be absent but must respect `max` when present.
pub(crate) fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        limit_length(errors, field, value.trim(), max);
    }
}

/// Require `value` to lie within `range` when present.
pub(crate) fn optional_range(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<u32>,
    range: std::ops::RangeInclusive<u32>,
) {
    if let Some(value) = value {
        if !range.contains(&value) {
            errors.add(
                field,
                format!(
                    "{field} must be between {} and {}",
                    range.start(),
                    range.end()
                ),
            );
        }
    }
}

fn limit_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("{field} must be at most {max} characters"));
    }
}

/// Convert accumulated messages into a validation result.
pub(crate) fn into_result(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Uniqueness key for names: trimmed and case-folded.
pub(crate) fn name_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-folded text used as a sort key so ordering ignores case.
pub(crate) fn sort_text(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Selectors for timestamp columns every record carries.
pub(crate) fn with_timestamps<E: 'static>(
    selectors: SortSelectors<Record<E>>,
) -> SortSelectors<Record<E>> {
    selectors
        .with("createdAt", |record: &Record<E>| record.created_at)
        .with("updatedAt", |record: &Record<E>| record.updated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &["name must not be empty"])]
    #[case("   ", &["name must not be empty"])]
    #[case("Bench", &[])]
    fn required_text_rejects_blank_values(#[case] value: &str, #[case] expected: &[&str]) {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "name", value, NAME_MAX_CHARS);
        assert_eq!(errors.messages("name"), expected);
    }

    #[rstest]
    fn length_limits_count_characters_not_bytes() {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "name", &"é".repeat(NAME_MAX_CHARS), NAME_MAX_CHARS);
        assert!(errors.is_empty());

        require_text(&mut errors, "name", &"é".repeat(NAME_MAX_CHARS + 1), NAME_MAX_CHARS);
        assert_eq!(errors.messages("name"), ["name must be at most 100 characters"]);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(1), true)]
    #[case(Some(1440), true)]
    #[case(Some(0), false)]
    #[case(Some(1441), false)]
    fn ranges_apply_only_to_present_values(#[case] value: Option<u32>, #[case] valid: bool) {
        let mut errors = FieldErrors::default();
        optional_range(&mut errors, "durationMinutes", value, 1..=1440);
        assert_eq!(errors.is_empty(), valid);
    }

    #[rstest]
    fn name_keys_ignore_case_and_padding() {
        assert_eq!(name_key("  Home Gym "), name_key("home gym"));
    }
}
