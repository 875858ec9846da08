//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn pipeline failures into consistent JSON responses and
//! status codes.

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Status for `error`, honouring the status hint set by the domain.
///
/// An authenticated caller without permission carries a `403` hint while
/// sharing the `Unauthorized` code with anonymous callers.
fn status_for(error: &Error) -> StatusCode {
    StatusCode::from_u16(error.status_hint()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn redact_if_storage_failure(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::StorageFailure) {
        let mut redacted = Error::storage_failure("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self)
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_storage_failure(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_client_error() {
            warn!(error = %err, "rejected malformed request");
            return Self::bad_request(format!("malformed request: {err}"));
        }
        error!(error = %err, "actix error promoted to domain error");
        Self::storage_failure("Internal server error")
    }
}

fn reject_malformed(detail: &dyn std::fmt::Display) -> actix_web::Error {
    warn!(error = %detail, "rejected malformed request");
    Error::bad_request(format!("malformed request: {detail}")).into()
}

/// Register extractor configs that answer malformed JSON bodies, path
/// segments and query strings with the `bad_request` envelope.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _: &HttpRequest| reject_malformed(&err)),
    )
    .app_data(
        web::PathConfig::default().error_handler(|err, _: &HttpRequest| reject_malformed(&err)),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _: &HttpRequest| reject_malformed(&err)),
    );
}
