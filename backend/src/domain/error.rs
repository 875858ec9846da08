//! Domain-level error types.
//!
//! These errors are transport agnostic. Every handler failure maps to exactly
//! one [`ErrorCode`]; inbound adapters translate the code (and the status
//! hint) into HTTP responses.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TraceId;

/// Stable machine-readable error code describing the failure category.
///
/// The taxonomy is closed: adapters can match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The addressed record or a referenced record does not exist.
    NotFound,
    /// The caller is unauthenticated or lacks the role or ownership required.
    Unauthorized,
    /// The request is malformed in a way that is not a field validation issue.
    BadRequest,
    /// One or more fields failed structural validation.
    ValidationFailed,
    /// A record with the same unique name already exists.
    NamingConflict,
    /// The two records are already linked.
    DuplicateRelationship,
    /// The supplied concurrency token is stale.
    ConcurrencyConflict,
    /// Storage failed or a single-row write affected no rows.
    StorageFailure,
}

impl ErrorCode {
    /// Status code suggested to transports when no explicit hint is set.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Unauthorized => 401,
            Self::BadRequest | Self::ValidationFailed => 400,
            Self::NamingConflict | Self::DuplicateRelationship | Self::ConcurrencyConflict => 409,
            Self::StorageFailure => 500,
        }
    }

    /// Snake-case identifier matching the serialised form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::BadRequest => "bad_request",
            Self::ValidationFailed => "validation_failed",
            Self::NamingConflict => "naming_conflict",
            Self::DuplicateRelationship => "duplicate_relationship",
            Self::ConcurrencyConflict => "concurrency_conflict",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages keyed by the camelCase field name.
///
/// # Examples
/// ```
/// use backend::domain::FieldErrors;
///
/// let mut errors = FieldErrors::default();
/// errors.add("name", "name must not be empty");
/// assert_eq!(errors.messages("name"), ["name must not be empty"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record a message against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Whether no field has been flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, empty when the field is valid.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Names of the fields that failed validation.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank once trimmed.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The trace identifier was blank once trimmed.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
/// - Equality compares `code` and `entity` only, so handlers can be asserted
///   against canonical constants regardless of incidental detail text.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found_entity("EquipmentGroup");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err, Error::not_found_entity("EquipmentGroup").with_details(serde_json::json!({"id": 3})));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    status_hint: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// Captures the current trace identifier if one is in scope so the error
    /// payload is correlated automatically.
    ///
    /// # Panics
    /// Panics when `message` is blank; use [`Error::try_new`] for untrusted
    /// input.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    ///
    /// # Errors
    /// Returns [`ErrorValidationError::EmptyMessage`] for blank messages.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            entity: None,
            field_errors: None,
            details: None,
            status_hint: code.default_status(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        })
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Entity type the error is about, when known.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Per-field validation messages for [`ErrorCode::ValidationFailed`].
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Supplementary error details for adapters.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Status code transports should use for this error.
    #[must_use]
    pub fn status_hint(&self) -> u16 {
        self.status_hint
    }

    /// Correlation identifier captured when the error was created.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Name the entity type the error refers to.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Attach a trace identifier, panicking if it is blank.
    ///
    /// # Panics
    /// Panics when `trace_id` is blank.
    #[must_use]
    pub fn with_trace_id(self, trace_id: impl Into<String>) -> Self {
        match self.try_with_trace_id(trace_id) {
            Ok(value) => value,
            Err(err) => panic!("trace identifiers must satisfy validation: {err}"),
        }
    }

    /// Attach a trace identifier.
    ///
    /// # Errors
    /// Returns [`ErrorValidationError::EmptyTraceId`] for blank identifiers.
    pub fn try_with_trace_id(
        mut self,
        trace_id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(trace_id);
        Ok(self)
    }

    fn with_status_hint(mut self, status_hint: u16) -> Self {
        self.status_hint = status_hint;
        self
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Canonical not-found error naming the missing entity type.
    pub fn not_found_entity(entity: &str) -> Self {
        Self::not_found(format!("{entity} not found")).with_entity(entity)
    }

    /// No authenticated principal; transports answer `401`.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Authenticated but not permitted; transports answer `403`.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message).with_status_hint(403)
    }

    /// Convenience constructor for [`ErrorCode::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Field validation failure for `entity`.
    pub fn validation_failed(entity: &str, field_errors: FieldErrors) -> Self {
        let mut error = Self::new(
            ErrorCode::ValidationFailed,
            format!("{entity} validation failed"),
        )
        .with_entity(entity);
        error.field_errors = Some(field_errors);
        error
    }

    /// Unique name already taken by another `entity` record.
    pub fn naming_conflict(entity: &str) -> Self {
        Self::new(
            ErrorCode::NamingConflict,
            format!("{entity} with the same name already exists"),
        )
        .with_entity(entity)
    }

    /// Link already present for `relation`.
    pub fn duplicate_relationship(relation: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateRelationship,
            format!("{relation} link already exists"),
        )
        .with_entity(relation)
    }

    /// Stale concurrency token for an `entity` record.
    pub fn concurrency_conflict(entity: &str) -> Self {
        Self::new(
            ErrorCode::ConcurrencyConflict,
            format!("{entity} was modified by another request; refresh and retry"),
        )
        .with_entity(entity)
    }

    /// Storage fault or a single-row write that affected no rows.
    pub fn storage_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageFailure, message)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.entity == other.entity
    }
}

impl Eq for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
