//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: session and health endpoints from their `#[utoipa::path]`
//!   annotations, plus the generic entity and relation routes which
//!   [`ResourcePathsAddon`] adds once per [`EntityKind`]
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`PrincipalSchema`], [`PagedSchema`]) that keep utoipa out of the domain
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::path::{
    HttpMethod, Operation, OperationBuilder, ParameterBuilder, ParameterIn,
};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::{ContentBuilder, Ref, RefOr, Required, ResponseBuilder};
use utoipa::{Modify, OpenApi};

use crate::domain::{EntityKind, RelationKind};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, PagedSchema, PrincipalSchema};

const ERROR_SCHEMA: &str = "crate.domain.Error";
const PAGED_SCHEMA: &str = "pagination.Paged";
const JSON: &str = "application/json";

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// Add the CRUD routes for every entity and the relation routes.
///
/// The routes are generic over the entity type so they cannot carry
/// `#[utoipa::path]` annotations of their own.
struct ResourcePathsAddon;

impl Modify for ResourcePathsAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        for kind in EntityKind::ALL {
            let collection = format!("/api/v1/{}", kind.slug());
            let item = format!("{collection}/{{id}}");
            openapi
                .paths
                .add_path_operation(&collection, vec![HttpMethod::Get], list_operation(kind));
            openapi
                .paths
                .add_path_operation(&collection, vec![HttpMethod::Post], create_operation(kind));
            openapi
                .paths
                .add_path_operation(&item, vec![HttpMethod::Get], get_operation(kind));
            openapi
                .paths
                .add_path_operation(&item, vec![HttpMethod::Put], update_operation(kind));
            openapi
                .paths
                .add_path_operation(&item, vec![HttpMethod::Delete], delete_operation(kind));
        }
        for relation in RelationKind::ALL {
            let listing = format!("/api/v1/relations/{}/{{left}}", relation.slug());
            let pair = format!("{listing}/{{right}}");
            openapi
                .paths
                .add_path_operation(&listing, vec![HttpMethod::Get], links_operation(relation));
            openapi.paths.add_path_operation(
                &pair,
                vec![HttpMethod::Post],
                link_operation(relation, "attach", "attached"),
            );
            openapi.paths.add_path_operation(
                &pair,
                vec![HttpMethod::Delete],
                link_operation(relation, "detach", "detached"),
            );
        }
    }
}

fn object(description: &str) -> RefOr<Schema> {
    RefOr::T(Schema::Object(
        ObjectBuilder::new()
            .schema_type(Type::Object)
            .description(Some(description))
            .build(),
    ))
}

fn typed(schema_type: Type) -> RefOr<Schema> {
    RefOr::T(Schema::Object(
        ObjectBuilder::new().schema_type(schema_type).build(),
    ))
}

fn json_response(description: &str, schema: RefOr<Schema>) -> utoipa::openapi::Response {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
        .build()
}

fn error_response(description: &str) -> utoipa::openapi::Response {
    json_response(description, Ref::from_schema_name(ERROR_SCHEMA).into())
}

fn id_parameter(name: &str) -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(typed(Type::Integer)))
        .build()
}

fn query_parameter(name: &str, description: &str, schema_type: Type) -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(typed(schema_type)))
        .build()
}

fn json_body(description: &str) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content(JSON, ContentBuilder::new().schema(Some(object(description))).build())
        .required(Some(Required::True))
        .build()
}

fn base(kind: EntityKind, operation_id: String, summary: String) -> OperationBuilder {
    OperationBuilder::new()
        .tags(Some([kind.slug()]))
        .operation_id(Some(operation_id))
        .summary(Some(summary))
        .response("401", error_response("Login required, or role or ownership insufficient"))
        .response("500", error_response("Internal server error"))
}

fn list_operation(kind: EntityKind) -> Operation {
    base(kind, format!("list{}", kind.name()), format!("List {} records", kind.name()))
        .parameter(query_parameter("pageNumber", "One-based page index", Type::Integer))
        .parameter(query_parameter("pageSize", "Records per page, clamped to the maximum", Type::Integer))
        .parameter(query_parameter("searchTerm", "Case-insensitive search text", Type::String))
        .parameter(query_parameter("sortBy", "Named sort key; unknown keys sort by id", Type::String))
        .parameter(query_parameter("sortOrder", "`asc` or `desc`", Type::String))
        .response("200", json_response("Page of records", Ref::from_schema_name(PAGED_SCHEMA).into()))
        .response("400", error_response("Invalid paging parameters"))
        .build()
}

fn create_operation(kind: EntityKind) -> Operation {
    base(kind, format!("create{}", kind.name()), format!("Create a {} record", kind.name()))
        .request_body(Some(json_body("Entity fields, plus `ownerId` for owner-scoped entities")))
        .response("201", json_response("Identifier of the new record", object("`{\"id\": n}`")))
        .response("400", error_response("Validation failed"))
        .response("404", error_response("Referenced record missing"))
        .response("409", error_response("Name already used"))
        .build()
}

fn get_operation(kind: EntityKind) -> Operation {
    base(kind, format!("get{}", kind.name()), format!("Fetch one {} record", kind.name()))
        .parameter(id_parameter("id"))
        .response("200", json_response("The record", object("Record header and entity fields")))
        .response("404", error_response("Record missing"))
        .build()
}

fn update_operation(kind: EntityKind) -> Operation {
    base(kind, format!("update{}", kind.name()), format!("Replace a {} record", kind.name()))
        .parameter(id_parameter("id"))
        .request_body(Some(json_body("Entity fields plus the `concurrencyToken` last read")))
        .response("200", json_response("Updated", object("`{\"updated\": true}`")))
        .response("400", error_response("Validation failed or token missing"))
        .response("404", error_response("Record missing"))
        .response("409", error_response("Stale token or name already used"))
        .build()
}

fn delete_operation(kind: EntityKind) -> Operation {
    base(kind, format!("delete{}", kind.name()), format!("Delete a {} record", kind.name()))
        .parameter(id_parameter("id"))
        .response("200", json_response("Deleted", object("`{\"deleted\": true}`")))
        .response("404", error_response("Record missing"))
        .build()
}

fn relation_base(relation: RelationKind, operation_id: String, summary: String) -> OperationBuilder {
    OperationBuilder::new()
        .tags(Some(["relations"]))
        .operation_id(Some(operation_id))
        .summary(Some(summary))
        .parameter(id_parameter("left"))
        .response("401", error_response("Login required, or role or ownership insufficient"))
        .response("404", error_response(&format!("{} missing", relation.left().name())))
        .response("500", error_response("Internal server error"))
}

fn links_operation(relation: RelationKind) -> Operation {
    relation_base(
        relation,
        format!("list-{}", relation.slug()),
        format!("List {} linked to a {}", relation.right().name(), relation.left().name()),
    )
    .response("200", json_response("Linked identifiers, ascending", typed(Type::Array)))
    .build()
}

fn link_operation(relation: RelationKind, verb: &str, field: &str) -> Operation {
    relation_base(
        relation,
        format!("{verb}-{}", relation.slug()),
        format!("{verb} a {} link", relation.slug()),
    )
    .parameter(id_parameter("right"))
    .response("200", json_response("Done", object(&format!("`{{\"{field}\": true}}`"))))
    .response("400", error_response("Link absent"))
    .response("409", error_response("Link already present"))
    .build()
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon, &ResourcePathsAddon),
    info(
        title = "Workout tracker API",
        description = "Exercise catalogue, equipment and workout history behind one \
                       command and query pipeline.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(PrincipalSchema, ErrorSchema, ErrorCodeSchema, PagedSchema)),
    tags(
        (name = "session", description = "Login and logout"),
        (name = "relations", description = "Many-to-many links between records"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA).expect("Error schema");

        for field in ["code", "message", "entity", "fieldErrors", "statusHint", "traceId"] {
            assert_object_schema_has_field(error_schema, field);
        }
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/logout")]
    #[case("/health/ready")]
    #[case("/api/v1/equipment-groups")]
    #[case("/api/v1/equipment/{id}")]
    #[case("/api/v1/workout-sessions/{id}")]
    #[case("/api/v1/relations/exercise-type-muscle-groups/{left}")]
    #[case("/api/v1/relations/workout-session-exercises/{left}/{right}")]
    fn document_lists_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn entity_collections_expose_list_and_create() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/api/v1/muscle-groups")
            .expect("muscle group collection");

        assert!(item.get.is_some());
        assert!(item.post.is_some());
        assert!(item.put.is_none());
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
