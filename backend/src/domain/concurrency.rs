//! Optimistic concurrency tokens.
//!
//! Every mutable record carries a [`ConcurrencyToken`]. Creates and updates
//! stamp a fresh token; updates must echo the token they last read, and a
//! mismatch is reported as a conflict before anything is written.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_LEN: usize = 32;

/// Reasons a client-supplied token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConcurrencyTokenError {
    /// The token was missing or blank.
    #[error("concurrencyToken must not be empty")]
    Empty,
    /// The token was not 32 lowercase hexadecimal characters.
    #[error("concurrencyToken is malformed")]
    Malformed,
}

/// Opaque per-record stamp compared by exact equality.
///
/// Rendered as the 32-character lowercase hex form of a random UUID.
///
/// # Examples
/// ```
/// use backend::domain::ConcurrencyToken;
///
/// let token = ConcurrencyToken::generate();
/// assert_eq!(token.as_str().len(), 32);
/// assert_eq!(ConcurrencyToken::parse(token.as_str()), Ok(token.clone()));
/// assert_ne!(ConcurrencyToken::generate(), token);
/// assert!(ConcurrencyToken::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConcurrencyToken(String);

impl ConcurrencyToken {
    /// Stamp a fresh, unguessable token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validate a token echoed back by a client.
    ///
    /// # Errors
    /// [`ConcurrencyTokenError::Empty`] for blank input and
    /// [`ConcurrencyTokenError::Malformed`] for anything that is not exactly
    /// 32 lowercase hex characters.
    pub fn parse(raw: &str) -> Result<Self, ConcurrencyTokenError> {
        if raw.trim().is_empty() {
            return Err(ConcurrencyTokenError::Empty);
        }
        let well_formed = raw.len() == TOKEN_LEN
            && raw
                .bytes()
                .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte));
        if !well_formed {
            return Err(ConcurrencyTokenError::Malformed);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Token text as stored and exposed to clients.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConcurrencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ConcurrencyToken> for String {
    fn from(value: ConcurrencyToken) -> Self {
        value.0
    }
}

impl TryFrom<String> for ConcurrencyToken {
    type Error = ConcurrencyTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
