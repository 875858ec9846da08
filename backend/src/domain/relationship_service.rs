//! Attach, detach and list handlers for many-to-many relations.
//!
//! Both sides of a link must exist before it is written. Owner-scoped sides
//! must belong to the caller unless the caller is an administrator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AttachLink, DetachLink, Handler, Link, LinkRepository, ListLinks, RecordSummary,
    ReferenceLookup,
};
use crate::domain::{
    EntityKind, Error, Outcome, Principal, RecordId, RelationKind, RequestContext, RequiredRole,
    authorize, require_principal,
};

/// Link handlers over a reference lookup and a link store.
pub struct RelationshipService<K, L> {
    lookup: Arc<K>,
    links: Arc<L>,
}

impl<K, L> Clone for RelationshipService<K, L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            links: Arc::clone(&self.links),
        }
    }
}

impl<K, L> RelationshipService<K, L>
where
    K: ReferenceLookup,
    L: LinkRepository,
{
    /// Create a service resolving records through `lookup` and storing
    /// edges in `links`.
    pub fn new(lookup: Arc<K>, links: Arc<L>) -> Self {
        Self { lookup, links }
    }

    async fn load_side(&self, kind: EntityKind, id: RecordId) -> Outcome<RecordSummary> {
        self.lookup
            .find(kind, id)
            .await?
            .ok_or_else(|| Error::not_found_entity(kind.name()))
    }

    /// Load both ends of `link` and check the caller may touch them.
    async fn check_sides(&self, principal: &Principal, link: &Link) -> Outcome<()> {
        let left = self.load_side(link.relation.left(), link.left).await?;
        let right = self.load_side(link.relation.right(), link.right).await?;
        for side in [&left, &right] {
            if side.owner_id.is_some() {
                authorize(
                    Some(principal),
                    RequiredRole::Authenticated,
                    side.owner_id.as_ref(),
                )?;
            }
        }
        if left.owner_id.is_some() && right.owner_id.is_some() && left.owner_id != right.owner_id
        {
            return Err(Error::forbidden(format!(
                "{} and {} belong to different users",
                left.kind, right.kind
            )));
        }
        Ok(())
    }
}

fn relation_entity(relation: RelationKind) -> &'static str {
    relation.slug()
}

#[async_trait]
impl<K, L> Handler<AttachLink> for RelationshipService<K, L>
where
    K: ReferenceLookup,
    L: LinkRepository,
{
    type Output = bool;

    async fn handle(&self, request: AttachLink, context: &RequestContext) -> Outcome<bool> {
        let link = request.link;
        debug!(relation = %link.relation, left = %link.left, right = %link.right, "attach requested");
        let principal = require_principal(context, link.relation.mutation_role())?;
        self.check_sides(principal, &link).await?;

        if self.links.exists(&link).await? {
            warn!(relation = %link.relation, left = %link.left, right = %link.right, "link already present");
            return Err(Error::duplicate_relationship(relation_entity(link.relation)));
        }
        context.ensure_active(&format!("attach {}", link.relation))?;
        if self.links.attach(&link).await? == 0 {
            warn!(relation = %link.relation, "concurrent attach won the race");
            return Err(Error::duplicate_relationship(relation_entity(link.relation)));
        }
        info!(relation = %link.relation, left = %link.left, right = %link.right, "link attached");
        Ok(true)
    }
}

#[async_trait]
impl<K, L> Handler<DetachLink> for RelationshipService<K, L>
where
    K: ReferenceLookup,
    L: LinkRepository,
{
    type Output = bool;

    async fn handle(&self, request: DetachLink, context: &RequestContext) -> Outcome<bool> {
        let link = request.link;
        debug!(relation = %link.relation, left = %link.left, right = %link.right, "detach requested");
        let principal = require_principal(context, link.relation.mutation_role())?;
        self.check_sides(principal, &link).await?;

        let not_attached = || {
            Error::bad_request(format!(
                "{} is not attached to {}",
                link.relation.right(),
                link.relation.left()
            ))
            .with_entity(relation_entity(link.relation))
        };
        if !self.links.exists(&link).await? {
            return Err(not_attached());
        }
        context.ensure_active(&format!("detach {}", link.relation))?;
        if self.links.detach(&link).await? == 0 {
            warn!(relation = %link.relation, "concurrent detach won the race");
            return Err(not_attached());
        }
        info!(relation = %link.relation, left = %link.left, right = %link.right, "link detached");
        Ok(true)
    }
}

#[async_trait]
impl<K, L> Handler<ListLinks> for RelationshipService<K, L>
where
    K: ReferenceLookup,
    L: LinkRepository,
{
    type Output = Vec<RecordId>;

    async fn handle(&self, request: ListLinks, context: &RequestContext) -> Outcome<Vec<RecordId>> {
        let principal = require_principal(context, RequiredRole::Authenticated)?;
        let left = self
            .load_side(request.relation.left(), request.left)
            .await?;
        if left.owner_id.is_some() {
            authorize(
                Some(principal),
                RequiredRole::Authenticated,
                left.owner_id.as_ref(),
            )?;
        }
        Ok(self.links.linked(request.relation, request.left).await?)
    }
}

#[cfg(test)]
#[path = "relationship_service_tests.rs"]
mod tests;
