//! Storage port for entity records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ConcurrencyToken, Record, RecordId, Resource, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by resource repository adapters.
    pub enum ResourceRepositoryError {
        /// Store could not be reached.
        Connection { message: String } =>
            "resource repository connection failed: {message}",
        /// Read or write failed during execution.
        Query { message: String } =>
            "resource repository query failed: {message}",
        /// Stored document could not be encoded or decoded.
        Serialization { message: String } =>
            "resource repository serialization failed: {message}",
        /// Another record in the same owner scope already holds the key.
        DuplicateKey { key: String } =>
            "unique key already taken: {key}",
    }
}

/// Record awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord<E> {
    /// Token stamped at creation.
    pub concurrency_token: ConcurrencyToken,
    /// Creation time, also used as the first `updated_at`.
    pub created_at: DateTime<Utc>,
    /// Owning user for owner-scoped entities.
    pub owner_id: Option<UserId>,
    /// Entity payload.
    pub fields: E,
}

impl<E> NewRecord<E> {
    /// Attach the identifier the store assigned.
    #[must_use]
    pub fn with_id(self, id: RecordId) -> Record<E> {
        Record {
            id,
            concurrency_token: self.concurrency_token,
            created_at: self.created_at,
            updated_at: self.created_at,
            owner_id: self.owner_id,
            fields: self.fields,
        }
    }
}

/// The unique key of `fields` when one of `existing` in `owner`'s scope
/// already holds it. The record `except` is skipped so a rename can keep its
/// own name.
pub fn taken_unique_key<'a, E>(
    existing: impl IntoIterator<Item = &'a Record<E>>,
    fields: &E,
    owner: Option<&UserId>,
    except: Option<RecordId>,
) -> Option<String>
where
    E: Resource + 'a,
{
    let key = fields.unique_key()?;
    existing
        .into_iter()
        .any(|record| {
            Some(record.id) != except
                && record.shares_owner(owner)
                && record.fields.unique_key().as_deref() == Some(key.as_str())
        })
        .then_some(key)
}

/// Persistence operations for records of entity `E`.
///
/// `insert` and `replace` enforce [`Resource::unique_key`] in the same atomic
/// step as the write and fail with
/// [`ResourceRepositoryError::DuplicateKey`] when the key is taken.
/// `replace` is a compare-and-swap: it writes only when the stored token still
/// equals `expected`, returning the number of rows written (0 or 1). A token
/// mismatch wins over a duplicate key.
#[async_trait]
pub trait ResourceRepository<E: Resource>: Send + Sync {
    /// Load one record.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record<E>>, ResourceRepositoryError>;

    /// Load every record of this kind.
    async fn find_all(&self) -> Result<Vec<Record<E>>, ResourceRepositoryError>;

    /// Store a new record and return its identifier.
    async fn insert(&self, record: NewRecord<E>) -> Result<RecordId, ResourceRepositoryError>;

    /// Overwrite a record if its stored token still equals `expected`.
    async fn replace(
        &self,
        record: &Record<E>,
        expected: &ConcurrencyToken,
    ) -> Result<u64, ResourceRepositoryError>;

    /// Remove a record and every link that references it.
    async fn delete(&self, id: RecordId) -> Result<u64, ResourceRepositoryError>;
}
