//! Authorization gate shared by every command and query.
//!
//! The gate is a pure function over the caller's [`Principal`], the role an
//! operation requires and, for owner-scoped records, the record's owner. It
//! never touches storage; handlers decide when to call it relative to their
//! existence lookups.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Error, RequestContext, UserId};

/// Authenticated caller resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Caller identity.
    pub id: UserId,
    /// Whether the caller may manage catalogue data and any user's records.
    pub is_admin: bool,
}

impl Principal {
    /// Regular, non-admin caller.
    #[must_use]
    pub fn member(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    /// Administrator.
    #[must_use]
    pub fn admin(id: UserId) -> Self {
        Self { id, is_admin: true }
    }

    /// Whether the caller may act on a record owned by `owner`.
    #[must_use]
    pub fn can_act_for(&self, owner: &UserId) -> bool {
        self.is_admin || &self.id == owner
    }
}

/// Role an operation demands before it may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Any authenticated caller.
    Authenticated,
    /// Administrators only.
    Admin,
}

/// How an entity type is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Shared catalogue data: everyone authenticated reads, admins mutate.
    AdminManaged,
    /// Per-user data: owners and admins read and mutate.
    OwnerScoped,
}

impl AccessPolicy {
    /// Role required to create, update, delete or link records.
    #[must_use]
    pub const fn mutation_role(self) -> RequiredRole {
        match self {
            Self::AdminManaged => RequiredRole::Admin,
            Self::OwnerScoped => RequiredRole::Authenticated,
        }
    }

    /// Whether records carry an owner that must match the caller.
    #[must_use]
    pub const fn is_owner_scoped(self) -> bool {
        matches!(self, Self::OwnerScoped)
    }
}

/// Check `principal` against `required` and, when present, `owner`.
///
/// - No principal: `Unauthorized` (401).
/// - Admin required but caller is not an admin: `Unauthorized` (403).
/// - Owner present and caller is neither the owner nor an admin:
///   `Unauthorized` (403).
///
/// # Errors
/// Returns an [`Error`] with [`crate::domain::ErrorCode::Unauthorized`] when
/// any check fails.
///
/// # Examples
/// ```
/// use backend::domain::{authorize, Principal, RequiredRole, UserId};
///
/// let owner = UserId::random();
/// let caller = Principal::member(owner.clone());
/// assert!(authorize(Some(&caller), RequiredRole::Authenticated, Some(&owner)).is_ok());
/// assert!(authorize(Some(&caller), RequiredRole::Admin, None).is_err());
/// assert!(authorize(None, RequiredRole::Authenticated, None).is_err());
/// ```
pub fn authorize(
    principal: Option<&Principal>,
    required: RequiredRole,
    owner: Option<&UserId>,
) -> Result<(), Error> {
    let Some(principal) = principal else {
        return Err(Error::unauthorized("login required"));
    };

    if required == RequiredRole::Admin && !principal.is_admin {
        warn!(user_id = %principal.id, "admin-only operation denied");
        return Err(Error::forbidden("administrator role required"));
    }

    if let Some(owner) = owner {
        if !principal.can_act_for(owner) {
            warn!(user_id = %principal.id, owner_id = %owner, "foreign record access denied");
            return Err(Error::forbidden("record belongs to another user"));
        }
    }

    Ok(())
}

/// Authorize the caller in `context` for `required` and return it.
///
/// # Errors
/// Same failures as [`authorize`] without an owner.
pub fn require_principal(
    context: &RequestContext,
    required: RequiredRole,
) -> Result<&Principal, Error> {
    authorize(context.principal(), required, None)?;
    context
        .principal()
        .ok_or_else(|| Error::unauthorized("login required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> UserId {
        UserId::random()
    }

    #[rstest]
    #[case(RequiredRole::Authenticated)]
    #[case(RequiredRole::Admin)]
    fn missing_principal_is_unauthenticated(#[case] required: RequiredRole) {
        let error = authorize(None, required, None).expect_err("no principal");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.status_hint(), 401);
    }

    #[rstest]
    fn members_cannot_run_admin_operations(owner: UserId) {
        let caller = Principal::member(owner.clone());
        let error = authorize(Some(&caller), RequiredRole::Admin, Some(&owner))
            .expect_err("admin required");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.status_hint(), 403);
    }

    #[rstest]
    fn owners_act_on_their_records(owner: UserId) {
        let caller = Principal::member(owner.clone());
        assert!(authorize(Some(&caller), RequiredRole::Authenticated, Some(&owner)).is_ok());
    }

    #[rstest]
    fn members_cannot_act_on_foreign_records(owner: UserId) {
        let caller = Principal::member(UserId::random());
        let error = authorize(Some(&caller), RequiredRole::Authenticated, Some(&owner))
            .expect_err("foreign record");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn admins_act_on_any_record(owner: UserId) {
        let caller = Principal::admin(UserId::random());
        assert!(authorize(Some(&caller), RequiredRole::Admin, Some(&owner)).is_ok());
    }

    #[rstest]
    #[case(AccessPolicy::AdminManaged, RequiredRole::Admin, false)]
    #[case(AccessPolicy::OwnerScoped, RequiredRole::Authenticated, true)]
    fn policies_map_to_roles(
        #[case] policy: AccessPolicy,
        #[case] role: RequiredRole,
        #[case] owner_scoped: bool,
    ) {
        assert_eq!(policy.mutation_role(), role);
        assert_eq!(policy.is_owner_scoped(), owner_scoped);
    }
}
