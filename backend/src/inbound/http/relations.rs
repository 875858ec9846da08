//! Link endpoints for many-to-many relations.
//!
//! ```text
//! GET    /api/v1/relations/{relation}/{leftId}            -> [rightId, ..]
//! POST   /api/v1/relations/{relation}/{leftId}/{rightId}  -> {"attached":true}
//! DELETE /api/v1/relations/{relation}/{leftId}/{rightId}  -> {"detached":true}
//! ```
//!
//! `relation` is one of `equipment-group-equipment`,
//! `exercise-type-muscle-groups` or `workout-session-exercises`.

use std::sync::Arc;

use actix_web::{Scope, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AttachLink, DetachLink, Handler, Link, ListLinks};
use crate::domain::{Error, RecordId, RelationKind, RelationKindError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;

/// Handlers serving every relation kind.
#[derive(Clone)]
pub struct RelationEndpoints {
    /// `POST /{relation}/{leftId}/{rightId}`.
    pub attach: Arc<dyn Handler<AttachLink, Output = bool>>,
    /// `DELETE /{relation}/{leftId}/{rightId}`.
    pub detach: Arc<dyn Handler<DetachLink, Output = bool>>,
    /// `GET /{relation}/{leftId}`.
    pub list: Arc<dyn Handler<ListLinks, Output = Vec<RecordId>>>,
}

impl RelationEndpoints {
    /// Route every operation to one service.
    pub fn from_service<S>(service: S) -> Self
    where
        S: Handler<AttachLink, Output = bool>
            + Handler<DetachLink, Output = bool>
            + Handler<ListLinks, Output = Vec<RecordId>>
            + 'static,
    {
        let shared = Arc::new(service);
        Self {
            attach: shared.clone(),
            detach: shared.clone(),
            list: shared,
        }
    }
}

/// Body for a successful attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AttachedResponse {
    /// Always `true`; failures use the error envelope.
    pub attached: bool,
}

/// Body for a successful detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DetachedResponse {
    /// Always `true`; failures use the error envelope.
    pub detached: bool,
}

fn relation(raw: &str) -> Result<RelationKind, Error> {
    raw.parse()
        .map_err(|error: RelationKindError| Error::bad_request(error.to_string()))
}

fn link(path: (String, RecordId, RecordId)) -> Result<Link, Error> {
    let (raw, left, right) = path;
    Ok(Link {
        relation: relation(&raw)?,
        left,
        right,
    })
}

async fn list_links(
    endpoints: web::Data<RelationEndpoints>,
    session: SessionContext,
    path: web::Path<(String, RecordId)>,
) -> ApiResult<web::Json<Vec<RecordId>>> {
    let (raw, left) = path.into_inner();
    let request = ListLinks {
        relation: relation(&raw)?,
        left,
    };
    let linked = endpoints
        .list
        .handle(request, &session.request_context())
        .await?;
    Ok(web::Json(linked))
}

async fn attach_link(
    endpoints: web::Data<RelationEndpoints>,
    session: SessionContext,
    path: web::Path<(String, RecordId, RecordId)>,
) -> ApiResult<web::Json<AttachedResponse>> {
    let link = link(path.into_inner())?;
    let attached = endpoints
        .attach
        .handle(AttachLink { link }, &session.request_context())
        .await?;
    Ok(web::Json(AttachedResponse { attached }))
}

async fn detach_link(
    endpoints: web::Data<RelationEndpoints>,
    session: SessionContext,
    path: web::Path<(String, RecordId, RecordId)>,
) -> ApiResult<web::Json<DetachedResponse>> {
    let link = link(path.into_inner())?;
    let detached = endpoints
        .detach
        .handle(DetachLink { link }, &session.request_context())
        .await?;
    Ok(web::Json(DetachedResponse { detached }))
}

/// Scope at `/relations`.
pub fn relation_scope(endpoints: RelationEndpoints) -> Scope {
    web::scope("/relations")
        .app_data(web::Data::new(endpoints))
        .route("/{relation}/{left}", web::get().to(list_links))
        .route("/{relation}/{left}/{right}", web::post().to(attach_link))
        .route("/{relation}/{left}/{right}", web::delete().to(detach_link))
}
