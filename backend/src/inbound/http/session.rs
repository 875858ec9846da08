//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting the caller's [`Principal`] at login
//! and turning the cookie back into a [`RequestContext`] per request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Principal, RequestContext};

pub(crate) const PRINCIPAL_KEY: &str = "principal";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated principal in the session cookie.
    pub fn persist_principal(&self, principal: &Principal) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(PRINCIPAL_KEY, principal)
            .map_err(|error| Error::storage_failure(format!("failed to persist session: {error}")))
    }

    /// Drop every value held by the session.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Fetch the current principal from the session, if present.
    ///
    /// A cookie that no longer decodes is treated as anonymous.
    #[must_use]
    pub fn principal(&self) -> Option<Principal> {
        self.0
            .get::<Principal>(PRINCIPAL_KEY)
            .unwrap_or_else(|error| {
                warn!(%error, "invalid principal in session cookie");
                None
            })
    }

    /// Context handed to command and query handlers.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        self.principal()
            .map_or_else(RequestContext::anonymous, RequestContext::authenticated)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
