//! Per-invocation context threaded into every handler.
//!
//! The context carries the resolved [`Principal`] and a cancellation handle.
//! Handlers never reach for ambient request state; inbound adapters build a
//! [`RequestContext`] and pass it explicitly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{Error, Principal};

/// Cooperative cancellation flag shared between a caller and a handler.
///
/// Clones observe the same flag. Handlers check it immediately before each
/// write so a cancelled invocation never applies a mutation.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Fresh, uncancelled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this handle.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Caller identity and cancellation signal for one handler invocation.
///
/// # Examples
/// ```
/// use backend::domain::{Principal, RequestContext, UserId};
///
/// let context = RequestContext::authenticated(Principal::member(UserId::random()));
/// assert!(context.principal().is_some());
/// assert!(context.ensure_active("insert").is_ok());
///
/// context.cancellation().cancel();
/// assert!(context.ensure_active("insert").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    principal: Option<Principal>,
    cancellation: Cancellation,
}

impl RequestContext {
    /// Context for an unauthenticated caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated caller.
    #[must_use]
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            cancellation: Cancellation::new(),
        }
    }

    /// Replace the cancellation handle, typically with one the caller keeps.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Resolved caller, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Cancellation handle for this invocation.
    #[must_use]
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Fail with `StorageFailure` when the invocation has been cancelled.
    ///
    /// # Errors
    /// Returns [`Error::storage_failure`] naming `operation` once
    /// cancellation has been requested.
    pub fn ensure_active(&self, operation: &str) -> Result<(), Error> {
        if self.cancellation.is_cancelled() {
            return Err(Error::storage_failure(format!("{operation} cancelled")));
        }
        Ok(())
    }
}
