//! Driving port for authentication.
//!
//! Inbound adapters call this port to turn credentials into a [`Principal`]
//! without knowing where accounts live.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Principal, UserId};

/// Fixed identifier of the fixture administrator.
pub const FIXTURE_ADMIN_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
/// Fixed identifier of the fixture athlete.
pub const FIXTURE_ATHLETE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Authentication use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated principal.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error>;
}

/// Fixed-account authenticator used until an account store exists.
///
/// `admin` / `password` signs in as an administrator and
/// `athlete` / `password` as a regular member.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let (raw_id, is_admin) = match (credentials.username(), credentials.password()) {
            ("admin", "password") => (FIXTURE_ADMIN_ID, true),
            ("athlete", "password") => (FIXTURE_ATHLETE_ID, false),
            _ => return Err(Error::unauthorized("invalid credentials")),
        };
        let id = UserId::new(raw_id)
            .map_err(|err| Error::storage_failure(format!("invalid fixture user id: {err}")))?;
        Ok(Principal { id, is_admin })
    }
}
