//! Kind-agnostic existence and ownership lookups.
//!
//! Reference checks and link operations need to know whether a record of an
//! arbitrary kind exists and who owns it, without decoding its payload.

use async_trait::async_trait;

use crate::domain::{EntityKind, RecordId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reference lookup adapters.
    pub enum ReferenceLookupError {
        /// Store could not be reached.
        Connection { message: String } =>
            "reference lookup connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "reference lookup query failed: {message}",
    }
}

/// Identity and ownership of a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    /// Record kind.
    pub kind: EntityKind,
    /// Record identifier.
    pub id: RecordId,
    /// Owner for owner-scoped kinds.
    pub owner_id: Option<UserId>,
}

/// Port answering "does this record exist, and whose is it?".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Summary of the `kind` record with `id`, or `None` when absent.
    async fn find(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<Option<RecordSummary>, ReferenceLookupError>;
}
