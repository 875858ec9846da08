//! Storage port for many-to-many links.

use async_trait::async_trait;

use crate::domain::{RecordId, RelationKind};

use super::define_port_error;

define_port_error! {
    /// Errors raised by link repository adapters.
    pub enum LinkRepositoryError {
        /// Store could not be reached.
        Connection { message: String } =>
            "link repository connection failed: {message}",
        /// Read or write failed during execution.
        Query { message: String } =>
            "link repository query failed: {message}",
    }
}

/// Edge between a left and a right record of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link {
    /// Relation the edge belongs to.
    pub relation: RelationKind,
    /// Identifier of the record of kind `relation.left()`.
    pub left: RecordId,
    /// Identifier of the record of kind `relation.right()`.
    pub right: RecordId,
}

/// Link persistence.
///
/// `attach` and `detach` report rows written so callers can detect a lost
/// race with a concurrent request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Whether the link is stored.
    async fn exists(&self, link: &Link) -> Result<bool, LinkRepositoryError>;

    /// Store the link; 0 when it was already present.
    async fn attach(&self, link: &Link) -> Result<u64, LinkRepositoryError>;

    /// Remove the link; 0 when it was absent.
    async fn detach(&self, link: &Link) -> Result<u64, LinkRepositoryError>;

    /// Right-hand identifiers linked to `left`, ascending.
    async fn linked(
        &self,
        relation: RelationKind,
        left: RecordId,
    ) -> Result<Vec<RecordId>, LinkRepositoryError>;
}
