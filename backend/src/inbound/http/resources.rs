//! Generic CRUD endpoints mounted once per entity type.
//!
//! ```text
//! GET    /api/v1/{slug}?pageNumber=1&pageSize=20&searchTerm=&sortBy=name&sortOrder=asc
//! POST   /api/v1/{slug}        {"name":"Home Gym"}                 -> 201 {"id":1}
//! GET    /api/v1/{slug}/{id}
//! PUT    /api/v1/{slug}/{id}   {"concurrencyToken":"..","name":..} -> {"updated":true}
//! DELETE /api/v1/{slug}/{id}                                       -> {"deleted":true}
//! ```
//!
//! Handlers only translate between HTTP and request values; every rule runs
//! in the [`Handler`] implementations behind [`ResourceEndpoints`]. Bodies
//! are passed on as undecoded JSON so the caller is authorized before any
//! field is looked at.

use std::sync::Arc;

use actix_web::{HttpResponse, Scope, web};
use pagination::{PageLimits, PageParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{
    CreateResource, DeleteResource, GetResource, Handler, ListResources, RecordPage,
    UpdateResource,
};
use crate::domain::{
    Error, FieldErrors, Outcome, Payload, Record, RecordId, RequestContext, Resource, UserId,
    require_principal,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;

/// Handlers serving one entity type.
pub struct ResourceEndpoints<E> {
    /// `POST /`.
    pub create: Arc<dyn Handler<CreateResource<E>, Output = RecordId>>,
    /// `PUT /{id}`.
    pub update: Arc<dyn Handler<UpdateResource<E>, Output = bool>>,
    /// `DELETE /{id}`.
    pub delete: Arc<dyn Handler<DeleteResource, Output = bool>>,
    /// `GET /{id}`.
    pub get: Arc<dyn Handler<GetResource, Output = Record<E>>>,
    /// `GET /`.
    pub list: Arc<dyn Handler<ListResources, Output = RecordPage<E>>>,
}

impl<E> Clone for ResourceEndpoints<E> {
    fn clone(&self) -> Self {
        Self {
            create: Arc::clone(&self.create),
            update: Arc::clone(&self.update),
            delete: Arc::clone(&self.delete),
            get: Arc::clone(&self.get),
            list: Arc::clone(&self.list),
        }
    }
}

impl<E: Resource> ResourceEndpoints<E> {
    /// Route every operation to one service.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::{EquipmentGroup, ResourceService};
    /// use backend::inbound::http::resources::ResourceEndpoints;
    /// use backend::outbound::persistence::InMemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let service = ResourceService::<EquipmentGroup, _, _>::new(
    ///     Arc::clone(&store),
    ///     store,
    ///     Arc::new(DefaultClock),
    /// );
    /// let _endpoints = ResourceEndpoints::from_service(service);
    /// ```
    pub fn from_service<S>(service: S) -> Self
    where
        S: Handler<CreateResource<E>, Output = RecordId>
            + Handler<UpdateResource<E>, Output = bool>
            + Handler<DeleteResource, Output = bool>
            + Handler<GetResource, Output = Record<E>>
            + Handler<ListResources, Output = RecordPage<E>>
            + 'static,
    {
        let shared = Arc::new(service);
        Self {
            create: shared.clone(),
            update: shared.clone(),
            delete: shared.clone(),
            get: shared.clone(),
            list: shared,
        }
    }
}

const OWNER_ID_FIELD: &str = "ownerId";
const CONCURRENCY_TOKEN_FIELD: &str = "concurrencyToken";

/// Remove `key` from a JSON object body.
fn take_member(body: &mut Value, key: &str) -> Option<Value> {
    body.as_object_mut().and_then(|object| object.remove(key))
}

/// Owner named in a create body.
///
/// An unreadable `ownerId` is only reported once the caller has passed the
/// role check, so anonymous callers still see `401`.
fn requested_owner<E: Resource>(
    raw: Option<Value>,
    context: &RequestContext,
) -> Outcome<Option<UserId>> {
    let parsed = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) => UserId::new(raw).ok(),
        Some(_) => None,
    };
    if let Some(owner) = parsed {
        return Ok(Some(owner));
    }
    require_principal(context, E::KIND.access().mutation_role())?;
    let mut errors = FieldErrors::default();
    errors.add(OWNER_ID_FIELD, "ownerId must be a user identifier");
    Err(Error::validation_failed(E::KIND.name(), errors))
}

/// Token sent with an update. Absent means empty; non-strings are passed on
/// verbatim so the service rejects them as malformed.
fn supplied_token(raw: Option<Value>) -> String {
    match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(token)) => token,
        Some(other) => other.to_string(),
    }
}

/// `201` body for a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatedResponse {
    /// Identifier of the new record.
    #[schema(value_type = i64, example = 1)]
    pub id: RecordId,
}

/// Body for a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdatedResponse {
    /// Always `true`; failures use the error envelope.
    pub updated: bool,
}

/// Body for a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeletedResponse {
    /// Always `true`; failures use the error envelope.
    pub deleted: bool,
}

async fn list_records<E: Resource>(
    endpoints: web::Data<ResourceEndpoints<E>>,
    limits: web::Data<PageLimits>,
    session: SessionContext,
    query: web::Query<PageParams>,
) -> ApiResult<web::Json<RecordPage<E>>> {
    let page = query
        .into_inner()
        .into_request(&limits)
        .map_err(|error| Error::bad_request(error.to_string()))?;
    debug!(entity = E::KIND.name(), "list via http");
    let page = endpoints
        .list
        .handle(ListResources { page }, &session.request_context())
        .await?;
    Ok(web::Json(page))
}

async fn create_record<E: Resource>(
    endpoints: web::Data<ResourceEndpoints<E>>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let context = session.request_context();
    let mut body = payload.into_inner();
    let owner_id = requested_owner::<E>(take_member(&mut body, OWNER_ID_FIELD), &context)?;
    let request = CreateResource {
        owner_id,
        fields: Payload::Json(body),
    };
    let id = endpoints.create.handle(request, &context).await?;
    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}

async fn get_record<E: Resource>(
    endpoints: web::Data<ResourceEndpoints<E>>,
    session: SessionContext,
    path: web::Path<RecordId>,
) -> ApiResult<web::Json<Record<E>>> {
    let record = endpoints
        .get
        .handle(GetResource { id: path.into_inner() }, &session.request_context())
        .await?;
    Ok(web::Json(record))
}

async fn update_record<E: Resource>(
    endpoints: web::Data<ResourceEndpoints<E>>,
    session: SessionContext,
    path: web::Path<RecordId>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<UpdatedResponse>> {
    let mut body = payload.into_inner();
    let concurrency_token = supplied_token(take_member(&mut body, CONCURRENCY_TOKEN_FIELD));
    let request = UpdateResource {
        id: path.into_inner(),
        concurrency_token,
        fields: Payload::Json(body),
    };
    let updated = endpoints
        .update
        .handle(request, &session.request_context())
        .await?;
    Ok(web::Json(UpdatedResponse { updated }))
}

async fn delete_record<E: Resource>(
    endpoints: web::Data<ResourceEndpoints<E>>,
    session: SessionContext,
    path: web::Path<RecordId>,
) -> ApiResult<web::Json<DeletedResponse>> {
    let deleted = endpoints
        .delete
        .handle(DeleteResource { id: path.into_inner() }, &session.request_context())
        .await?;
    Ok(web::Json(DeletedResponse { deleted }))
}

/// Scope at `/{slug}` serving every operation for `E`.
///
/// Expects [`PageLimits`] in application data.
pub fn resource_scope<E: Resource>(endpoints: ResourceEndpoints<E>) -> Scope {
    web::scope(&format!("/{}", E::KIND.slug()))
        .app_data(web::Data::new(endpoints))
        .route("", web::get().to(list_records::<E>))
        .route("", web::post().to(create_record::<E>))
        .route("/{id}", web::get().to(get_record::<E>))
        .route("/{id}", web::put().to(update_record::<E>))
        .route("/{id}", web::delete().to(delete_record::<E>))
}
