//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The addressed or a referenced record does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Login missing, or role or ownership insufficient.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Malformed request or failed precondition.
    #[schema(rename = "bad_request")]
    BadRequest,
    /// One or more fields failed validation.
    #[schema(rename = "validation_failed")]
    ValidationFailed,
    /// Another record already uses the name.
    #[schema(rename = "naming_conflict")]
    NamingConflict,
    /// The records are already linked.
    #[schema(rename = "duplicate_relationship")]
    DuplicateRelationship,
    /// The concurrency token is stale.
    #[schema(rename = "concurrency_conflict")]
    ConcurrencyConflict,
    /// Storage failed; details are withheld.
    #[schema(rename = "storage_failure")]
    StorageFailure,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Every failed request answers with this envelope.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "concurrency_conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "EquipmentGroup was modified by another request")]
    message: String,
    /// Entity the failure concerns.
    #[schema(example = "EquipmentGroup")]
    entity: Option<String>,
    /// Messages per invalid field.
    field_errors: Option<BTreeMap<String, Vec<String>>>,
    /// Supplementary details.
    details: Option<serde_json::Value>,
    /// HTTP status suggested by the handler.
    #[schema(example = 409)]
    status_hint: u16,
    /// Trace identifier of the failing request.
    #[schema(example = "5b8f3c7e-1a2d-4e6f-9b0c-7d8e9f0a1b2c")]
    trace_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Principal`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Principal)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PrincipalSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Whether the caller manages catalogue data.
    is_admin: bool,
}

/// OpenAPI schema for paged list responses.
#[derive(ToSchema)]
#[schema(as = pagination::Paged)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PagedSchema {
    /// Records on this page.
    data: Vec<serde_json::Value>,
    /// One-based page index.
    #[schema(example = 1)]
    page_number: u32,
    /// Page size applied after clamping.
    #[schema(example = 20)]
    page_size: u32,
    /// Pages available; zero when nothing matches.
    #[schema(example = 1)]
    total_pages: u64,
    /// Records matching the search.
    #[schema(example = 3)]
    total_items: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();

        for code in [
            "not_found",
            "unauthorized",
            "bad_request",
            "validation_failed",
            "naming_conflict",
            "duplicate_relationship",
            "concurrency_conflict",
            "storage_failure",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_wire_names() {
        let schema_json = schema_to_json::<ErrorSchema>();

        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        for field in ["fieldErrors", "statusHint", "traceId", "entity"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn principal_schema_has_expected_fields() {
        let schema_json = schema_to_json::<PrincipalSchema>();

        assert_eq!(PrincipalSchema::name(), "crate.domain.Principal");
        assert!(schema_json.contains("isAdmin"));
    }

    #[test]
    fn paged_schema_exposes_totals() {
        let schema_json = schema_to_json::<PagedSchema>();

        assert!(schema_json.contains("totalPages"));
        assert!(schema_json.contains("totalItems"));
    }
}
