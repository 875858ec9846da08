//! Tests for domain error construction, equality and trace capture.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn field_errors() -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.add("name", "name must not be empty");
    errors.add("name", "name must be at most 100 characters");
    errors.add("description", "description must be at most 500 characters");
    errors
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::BadRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::bad_request("bad").try_with_trace_id("  ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
#[case(Error::not_found("missing"), 404)]
#[case(Error::unauthorized("login required"), 401)]
#[case(Error::forbidden("admins only"), 403)]
#[case(Error::bad_request("bad"), 400)]
#[case(Error::validation_failed("Equipment", FieldErrors::default()), 400)]
#[case(Error::naming_conflict("Equipment"), 409)]
#[case(Error::duplicate_relationship("exercise-type-muscle-groups"), 409)]
#[case(Error::concurrency_conflict("Equipment"), 409)]
#[case(Error::storage_failure("insert failed"), 500)]
fn status_hints_follow_the_boundary_mapping(#[case] error: Error, #[case] expected: u16) {
    assert_eq!(error.status_hint(), expected);
}

#[rstest]
fn forbidden_keeps_the_unauthorized_code() {
    assert_eq!(Error::forbidden("nope").code(), ErrorCode::Unauthorized);
}

#[rstest]
fn equality_ignores_incidental_detail_text() {
    let canonical = Error::not_found_entity("MuscleGroup");
    let detailed = Error::not_found("muscle group 42 does not exist")
        .with_entity("MuscleGroup")
        .with_details(json!({ "id": 42 }));
    assert_eq!(canonical, detailed);
}

#[rstest]
fn equality_distinguishes_entities_and_codes() {
    assert_ne!(
        Error::not_found_entity("Equipment"),
        Error::not_found_entity("EquipmentGroup")
    );
    assert_ne!(
        Error::naming_conflict("Equipment"),
        Error::concurrency_conflict("Equipment")
    );
}

#[rstest]
fn validation_failed_carries_field_messages(field_errors: FieldErrors) {
    let error = Error::validation_failed("Equipment", field_errors);
    let errors = error.field_errors().expect("field errors attached");
    assert_eq!(errors.messages("name").len(), 2);
    assert_eq!(errors.fields().collect::<Vec<_>>(), ["description", "name"]);
    assert!(errors.messages("notes").is_empty());
}

#[rstest]
fn serialises_with_camel_case_fields(field_errors: FieldErrors) {
    let error = Error::validation_failed("Equipment", field_errors).with_trace_id(TRACE_ID);
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value["code"], json!("validation_failed"));
    assert_eq!(value["statusHint"], json!(400));
    assert_eq!(value["traceId"], json!(TRACE_ID));
    assert_eq!(
        value["fieldErrors"]["description"],
        json!(["description must be at most 500 characters"])
    );
    assert!(value.get("details").is_none());
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    assert!(Error::storage_failure("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("fixture is a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::storage_failure("boom") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn error_codes_render_in_snake_case() {
    assert_eq!(ErrorCode::DuplicateRelationship.to_string(), "duplicate_relationship");
    assert_eq!(
        serde_json::to_value(ErrorCode::ConcurrencyConflict).expect("serialise code"),
        json!("concurrency_conflict")
    );
}
