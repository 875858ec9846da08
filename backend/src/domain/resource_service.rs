//! Generic command and query service for every entity type.
//!
//! One [`ResourceService`] per entity implements the create, update, delete,
//! get and list handlers. Each invocation runs the same linear pipeline and
//! stops at the first failure:
//!
//! 1. caller and role check;
//! 2. existence lookup and owner check (by-id operations);
//! 3. structural validation, including the concurrency token;
//! 4. business rules: token match, references;
//! 5. cancellation check, then a single write that also enforces the unique
//!    key, so concurrent writers cannot both claim a name.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{SortSelectors, paginate};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CreateResource, DeleteResource, GetResource, Handler, ListResources, NewRecord, RecordPage,
    ReferenceLookup, ResourceRepository, ResourceRepositoryError, UpdateResource,
};
use crate::domain::{
    ConcurrencyToken, Error, Outcome, Principal, Record, RecordId, RequestContext, RequiredRole,
    Resource, UserId, authorize, require_principal,
};

/// Handlers for records of entity `E`.
pub struct ResourceService<E, R, L> {
    repository: Arc<R>,
    references: Arc<L>,
    clock: Arc<dyn Clock>,
    sorts: Arc<SortSelectors<Record<E>>>,
}

impl<E, R, L> Clone for ResourceService<E, R, L> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            references: Arc::clone(&self.references),
            clock: Arc::clone(&self.clock),
            sorts: Arc::clone(&self.sorts),
        }
    }
}

impl<E, R, L> ResourceService<E, R, L>
where
    E: Resource,
    R: ResourceRepository<E>,
    L: ReferenceLookup,
{
    /// Create a service over `repository`, resolving references through
    /// `references` and stamping times from `clock`.
    pub fn new(repository: Arc<R>, references: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            references,
            clock,
            sorts: Arc::new(E::sort_selectors()),
        }
    }

    async fn load(&self, id: RecordId) -> Outcome<Record<E>> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found_entity(E::KIND.name()))
    }

    async fn check_references(&self, fields: &E, owner: Option<&UserId>) -> Outcome<()> {
        for reference in fields.references() {
            let summary = self
                .references
                .find(reference.kind, reference.id)
                .await?
                .ok_or_else(|| Error::not_found_entity(reference.kind.name()))?;
            if summary.owner_id.is_some() && summary.owner_id.as_ref() != owner {
                warn!(
                    entity = E::KIND.name(),
                    referenced = reference.kind.name(),
                    id = %reference.id,
                    "reference to a record in another ownership scope"
                );
                return Err(Error::forbidden(format!(
                    "{} belongs to another user",
                    reference.kind
                )));
            }
        }
        Ok(())
    }

    /// Map a failed write, turning a unique key clash into `NamingConflict`.
    fn write_failure(error: ResourceRepositoryError) -> Error {
        match error {
            ResourceRepositoryError::DuplicateKey { key } => {
                warn!(entity = E::KIND.name(), %key, "unique name already taken");
                Error::naming_conflict(E::KIND.name())
            }
            other => other.into(),
        }
    }

    /// Resolve the owner a new record is created for.
    fn creation_owner(
        principal: &Principal,
        requested: Option<UserId>,
    ) -> Outcome<Option<UserId>> {
        if !E::KIND.access().is_owner_scoped() {
            return match requested {
                Some(_) => Err(Error::bad_request(format!(
                    "ownerId is not accepted for {}",
                    E::KIND
                ))),
                None => Ok(None),
            };
        }
        let owner = requested.unwrap_or_else(|| principal.id.clone());
        authorize(Some(principal), RequiredRole::Authenticated, Some(&owner))?;
        Ok(Some(owner))
    }

    /// Work out why a compare-and-swap wrote nothing.
    async fn diagnose_lost_write(
        &self,
        id: RecordId,
        expected: &ConcurrencyToken,
        operation: &str,
    ) -> Error {
        match self.repository.find_by_id(id).await {
            Ok(None) => Error::not_found_entity(E::KIND.name()),
            Ok(Some(stored)) if &stored.concurrency_token != expected => {
                warn!(entity = E::KIND.name(), id = %id, "lost update race");
                Error::concurrency_conflict(E::KIND.name())
            }
            Ok(Some(_)) => Error::storage_failure(format!(
                "{operation} {} affected no rows",
                E::KIND
            )),
            Err(error) => error.into(),
        }
    }
}

fn authorize_owner<E: Resource>(principal: &Principal, record: &Record<E>) -> Outcome<()> {
    if E::KIND.access().is_owner_scoped() {
        authorize(
            Some(principal),
            RequiredRole::Authenticated,
            record.owner_id.as_ref(),
        )?;
    }
    Ok(())
}

#[async_trait]
impl<E, R, L> Handler<CreateResource<E>> for ResourceService<E, R, L>
where
    E: Resource,
    R: ResourceRepository<E>,
    L: ReferenceLookup,
{
    type Output = RecordId;

    async fn handle(
        &self,
        request: CreateResource<E>,
        context: &RequestContext,
    ) -> Outcome<RecordId> {
        debug!(entity = E::KIND.name(), "create requested");
        let principal = require_principal(context, E::KIND.access().mutation_role())?;
        let owner = Self::creation_owner(principal, request.owner_id)?;

        let fields = request
            .fields
            .into_valid()
            .map_err(|errors| Error::validation_failed(E::KIND.name(), errors))?;
        self.check_references(&fields, owner.as_ref()).await?;

        context.ensure_active(&format!("insert {}", E::KIND))?;
        let id = self
            .repository
            .insert(NewRecord {
                concurrency_token: ConcurrencyToken::generate(),
                created_at: self.clock.utc(),
                owner_id: owner,
                fields,
            })
            .await
            .map_err(Self::write_failure)?;
        info!(entity = E::KIND.name(), id = %id, "record created");
        Ok(id)
    }
}

#[async_trait]
impl<E, R, L> Handler<UpdateResource<E>> for ResourceService<E, R, L>
where
    E: Resource,
    R: ResourceRepository<E>,
    L: ReferenceLookup,
{
    type Output = bool;

    async fn handle(&self, request: UpdateResource<E>, context: &RequestContext) -> Outcome<bool> {
        debug!(entity = E::KIND.name(), id = %request.id, "update requested");
        let principal = require_principal(context, E::KIND.access().mutation_role())?;
        let current = self.load(request.id).await?;
        authorize_owner(principal, &current)?;

        let supplied = ConcurrencyToken::parse(&request.concurrency_token)
            .map_err(|error| Error::bad_request(error.to_string()).with_entity(E::KIND.name()))?;
        let fields = request
            .fields
            .into_valid()
            .map_err(|errors| Error::validation_failed(E::KIND.name(), errors))?;
        if current.concurrency_token != supplied {
            warn!(entity = E::KIND.name(), id = %request.id, "stale concurrency token");
            return Err(Error::concurrency_conflict(E::KIND.name()));
        }
        let owner = current.owner_id.clone();
        self.check_references(&fields, owner.as_ref()).await?;

        let next = Record {
            concurrency_token: ConcurrencyToken::generate(),
            updated_at: self.clock.utc(),
            fields,
            ..current
        };
        context.ensure_active(&format!("update {}", E::KIND))?;
        let rows = self
            .repository
            .replace(&next, &supplied)
            .await
            .map_err(Self::write_failure)?;
        if rows == 0 {
            return Err(self.diagnose_lost_write(next.id, &supplied, "update").await);
        }
        info!(entity = E::KIND.name(), id = %next.id, "record updated");
        Ok(true)
    }
}

#[async_trait]
impl<E, R, L> Handler<DeleteResource> for ResourceService<E, R, L>
where
    E: Resource,
    R: ResourceRepository<E>,
    L: ReferenceLookup,
{
    type Output = bool;

    async fn handle(&self, request: DeleteResource, context: &RequestContext) -> Outcome<bool> {
        debug!(entity = E::KIND.name(), id = %request.id, "delete requested");
        let principal = require_principal(context, E::KIND.access().mutation_role())?;
        let current = self.load(request.id).await?;
        authorize_owner(principal, &current)?;

        context.ensure_active(&format!("delete {}", E::KIND))?;
        let rows = self.repository.delete(current.id).await?;
        if rows == 0 {
            return Err(self
                .diagnose_lost_write(current.id, &current.concurrency_token, "delete")
                .await);
        }
        info!(entity = E::KIND.name(), id = %current.id, "record deleted");
        Ok(true)
    }
}

#[async_trait]
impl<E, R, L> Handler<GetResource> for ResourceService<E, R, L>
where
    E: Resource,
    R: ResourceRepository<E>,
    L: ReferenceLookup,
{
    type Output = Record<E>;

    async fn handle(&self, request: GetResource, context: &RequestContext) -> Outcome<Record<E>> {
        debug!(entity = E::KIND.name(), id = %request.id, "get requested");
        let principal = require_principal(context, RequiredRole::Authenticated)?;
        let record = self.load(request.id).await?;
        authorize_owner(principal, &record)?;
        Ok(record)
    }
}

#[async_trait]
impl<E, R, L> Handler<ListResources> for ResourceService<E, R, L>
where
    E: Resource,
    R: ResourceRepository<E>,
    L: ReferenceLookup,
{
    type Output = RecordPage<E>;

    async fn handle(&self, request: ListResources, context: &RequestContext) -> Outcome<RecordPage<E>> {
        let principal = require_principal(context, RequiredRole::Authenticated)?;
        let mut records = self.repository.find_all().await?;
        if E::KIND.access().is_owner_scoped() && !principal.is_admin {
            records.retain(|record| record.owner_id.as_ref() == Some(&principal.id));
        }
        debug!(
            entity = E::KIND.name(),
            visible = records.len(),
            page = request.page.page_number(),
            "list requested"
        );
        Ok(paginate(
            records,
            &request.page,
            |record, term| record.fields.matches_search(term),
            &self.sorts,
        ))
    }
}

#[cfg(test)]
#[path = "resource_service_tests.rs"]
mod tests;
