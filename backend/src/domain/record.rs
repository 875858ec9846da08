//! Persisted record envelope shared by every entity type.

use std::fmt;

use chrono::{DateTime, Utc};
use pagination::Sequenced;
use serde::{Deserialize, Serialize};

use crate::domain::{ConcurrencyToken, UserId};

/// Validation errors for [`RecordId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordIdError {
    /// Identifiers are server-assigned and strictly positive.
    #[error("record id must be positive, got {value}")]
    NotPositive {
        /// Rejected value.
        value: i64,
    },
}

/// Server-assigned, strictly positive record identifier.
///
/// # Examples
/// ```
/// use backend::domain::RecordId;
///
/// assert_eq!(RecordId::new(7).map(RecordId::get), Ok(7));
/// assert!(RecordId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecordId(i64);

impl RecordId {
    /// Validate a raw identifier.
    ///
    /// # Errors
    /// Returns [`RecordIdError::NotPositive`] for zero or negative values.
    pub const fn new(value: i64) -> Result<Self, RecordIdError> {
        if value <= 0 {
            return Err(RecordIdError::NotPositive { value });
        }
        Ok(Self(value))
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for RecordId {
    type Error = RecordIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored entity with its concurrency and ownership metadata.
///
/// Serialises flat: the envelope fields sit next to the entity's own fields
/// in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<E> {
    /// Server-assigned identifier.
    pub id: RecordId,
    /// Token clients echo back on update.
    pub concurrency_token: ConcurrencyToken,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last successful write.
    pub updated_at: DateTime<Utc>,
    /// Owning user for owner-scoped entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
    /// Entity-specific payload.
    #[serde(flatten)]
    pub fields: E,
}

impl<E> Record<E> {
    /// Whether the record belongs to the same ownership scope as `owner`.
    #[must_use]
    pub fn shares_owner(&self, owner: Option<&UserId>) -> bool {
        self.owner_id.as_ref() == owner
    }
}

impl<E> Sequenced for Record<E> {
    fn sequence(&self) -> i64 {
        self.id.get()
    }
}
