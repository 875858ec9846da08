//! Driving port shared by every command and query.
//!
//! Each operation is a plain request value paired with a [`Handler`]
//! implementation. Inbound adapters hold `Arc<dyn Handler<Request, Output =
//! ..>>` per operation and never see the services behind them.

use async_trait::async_trait;
use pagination::{PageRequest, Paged};

use crate::domain::{Outcome, Payload, Record, RecordId, RelationKind, RequestContext, UserId};

use super::Link;

/// Executes one kind of request.
///
/// # Examples
/// ```
/// use async_trait::async_trait;
/// use backend::domain::ports::Handler;
/// use backend::domain::{Outcome, RequestContext};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Handler<String> for Echo {
///     type Output = String;
///
///     async fn handle(&self, request: String, _context: &RequestContext) -> Outcome<String> {
///         Ok(request)
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let reply = Echo.handle("ping".into(), &RequestContext::anonymous()).await;
/// assert_eq!(reply.ok().as_deref(), Some("ping"));
/// # });
/// ```
#[async_trait]
pub trait Handler<R>: Send + Sync
where
    R: Send + 'static,
{
    /// Success value.
    type Output: Send;

    /// Run `request` on behalf of the caller described by `context`.
    async fn handle(&self, request: R, context: &RequestContext) -> Outcome<Self::Output>;
}

/// Create a record. Answers the new identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateResource<E> {
    /// Owner to record for owner-scoped entities; defaults to the caller.
    /// Only administrators may name another user.
    pub owner_id: Option<UserId>,
    /// Entity fields, decoded and validated after authorization.
    pub fields: Payload<E>,
}

/// Replace a record's fields. Answers `true` on success.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResource<E> {
    /// Record to update.
    pub id: RecordId,
    /// Token the caller last read, as sent on the wire.
    pub concurrency_token: String,
    /// New entity fields, decoded and validated after authorization.
    pub fields: Payload<E>,
}

/// Delete a record and its links. Answers `true` on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResource {
    /// Record to delete.
    pub id: RecordId,
}

/// Fetch one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetResource {
    /// Record to fetch.
    pub id: RecordId,
}

/// Fetch a filtered, sorted page of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResources {
    /// Paging, search and sort parameters.
    pub page: PageRequest,
}

/// Link two existing records. Answers `true` on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachLink {
    /// Link to create.
    pub link: Link,
}

/// Unlink two records. Answers `true` on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachLink {
    /// Link to remove.
    pub link: Link,
}

/// Identifiers linked to a left-hand record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLinks {
    /// Relation to read.
    pub relation: RelationKind,
    /// Left-hand record.
    pub left: RecordId,
}

/// Record payload returned by get handlers.
pub type RecordView<E> = Record<E>;

/// Page payload returned by list handlers.
pub type RecordPage<E> = Paged<Record<E>>;
